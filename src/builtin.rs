use crate::command::{CommandFactory, ExecutableCommand, ParsedCommand};
use crate::session::Session;
use crate::shell::Factory;
use anyhow::{Context, Result, anyhow};
use argh::{EarlyExit, FromArgs};
use log::debug;
use std::env;
use std::io::Write;
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins taking arguments are parsed using the [`argh`] crate (`FromArgs`)
/// and executed directly in the shell process, never forked. Redirections and
/// `&` on a builtin line are ignored.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd".
    fn name() -> &'static str;

    fn execute(self, stdout: &mut dyn Write, session: &mut Session) -> Result<()>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, session: &mut Session, stdout: &mut dyn Write) -> Result<()> {
        T::execute(*self, stdout, session)
    }
}

/// What argh printed instead of producing a command (`--help` or bad usage).
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(self: Box<Self>, _session: &mut Session, stdout: &mut dyn Write) -> Result<()> {
        if self.is_error {
            return Err(anyhow!("{}", self.output.trim_end()));
        }
        writeln!(stdout, "{}", self.output.trim_end())?;
        Ok(())
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(&self, command: &ParsedCommand) -> Option<Box<dyn ExecutableCommand>> {
        let name = command.program();
        if name != T::name() {
            return None;
        }
        let args: Vec<&str> = command.arguments()[1..].iter().map(String::as_str).collect();
        Some(match T::from_args(&[name], &args) {
            Ok(cmd) => Box::new(cmd),
            Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                output,
                is_error: status.is_err(),
            }),
        })
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// If no target is provided, changes to the directory specified by the HOME environment variable.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory. Defaults to $HOME when omitted.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, _stdout: &mut dyn Write, _session: &mut Session) -> Result<()> {
        let target = match self.target {
            Some(t) => PathBuf::from(t),
            None => env::var_os("HOME")
                .map(PathBuf::from)
                .ok_or_else(|| anyhow!("cd: HOME not set"))?,
        };

        env::set_current_dir(&target).with_context(|| format!("cd: {}", target.display()))?;
        debug!("working directory is now {}", target.display());
        Ok(())
    }
}

/// Terminate every process in the shell's process group, then exit the shell.
///
/// Arguments are ignored.
pub struct Exit;

impl ExecutableCommand for Exit {
    fn execute(self: Box<Self>, session: &mut Session, _stdout: &mut dyn Write) -> Result<()> {
        session.request_exit();
        Ok(())
    }
}

impl CommandFactory for Factory<Exit> {
    fn try_create(&self, command: &ParsedCommand) -> Option<Box<dyn ExecutableCommand>> {
        (command.program() == "exit").then(|| Box::new(Exit) as Box<dyn ExecutableCommand>)
    }
}

/// Print the exit value or terminating signal of the last foreground command.
///
/// Arguments are ignored.
pub struct Status;

impl ExecutableCommand for Status {
    fn execute(self: Box<Self>, session: &mut Session, stdout: &mut dyn Write) -> Result<()> {
        writeln!(stdout, "{}", session.last_status())?;
        stdout.flush()?;
        Ok(())
    }
}

impl CommandFactory for Factory<Status> {
    fn try_create(&self, command: &ParsedCommand) -> Option<Box<dyn ExecutableCommand>> {
        (command.program() == "status").then(|| Box::new(Status) as Box<dyn ExecutableCommand>)
    }
}
