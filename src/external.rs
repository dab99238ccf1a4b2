use crate::command::{CommandFactory, ExecutableCommand, ParsedCommand};
use crate::session::Session;
use crate::shell::Factory;
use crate::signals;
use crate::status::TerminationStatus;
use anyhow::{Context, Result};
use log::debug;
use nix::errno::Errno;
use nix::sys::wait;
use nix::unistd::{self, ForkResult, Pid};
use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;

const NULL_DEVICE: &str = "/dev/null";

/// Where a child's standard stream comes from or goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
enum StreamTarget {
    Inherit,
    File(String),
    Null,
}

/// Command that is not a builtin: a program started with fork and exec.
pub struct ExternalCommand {
    argv: Vec<String>,
    input_path: Option<String>,
    output_path: Option<String>,
    is_background: bool,
}

impl ExternalCommand {
    pub fn new(command: &ParsedCommand) -> Self {
        Self {
            argv: command.arguments().to_vec(),
            input_path: command.input_path().map(str::to_string),
            output_path: command.output_path().map(str::to_string),
            is_background: command.is_background(),
        }
    }

    /// A background request only holds when the shell is not in
    /// foreground-only mode.
    fn runs_in_background(&self, session: &Session) -> bool {
        self.is_background && !session.foreground_only()
    }

    fn stream_target(&self, path: Option<&str>, session: &Session) -> StreamTarget {
        match path {
            Some(path) => StreamTarget::File(path.to_string()),
            None if self.runs_in_background(session) => StreamTarget::Null,
            None => StreamTarget::Inherit,
        }
    }

    /// Fork a child running this command and return its pid to the parent.
    fn spawn(&self, session: &Session) -> Result<Pid> {
        let argv = self
            .argv
            .iter()
            .map(|arg| CString::new(arg.as_bytes()))
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("{}: argument contains a NUL byte", self.argv[0]))?;
        let stdin = self.stream_target(self.input_path.as_deref(), session);
        let stdout = self.stream_target(self.output_path.as_deref(), session);

        // Anything still buffered would otherwise be written twice.
        io::stdout().flush()?;

        match unsafe { unistd::fork() }.context("fork failed")? {
            ForkResult::Parent { child } => Ok(child),
            ForkResult::Child => {
                if let Err(e) = signals::restore_child_defaults() {
                    eprintln!("smallsh: cannot reset signal handlers: {}", e);
                    std::process::exit(1);
                }
                if let Err(e) = redirect(&stdin, Redirect::Input)
                    .and_then(|()| redirect(&stdout, Redirect::Output))
                {
                    eprintln!("smallsh: {:#}", e);
                    std::process::exit(1);
                }
                if let Err(e) = unistd::execvp(&argv[0], &argv) {
                    eprintln!("{}: {}", self.argv[0], e.desc());
                }
                std::process::exit(1);
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Redirect {
    Input,
    Output,
}

/// Point the child's stdin or stdout at `target`. Runs only in the child.
fn redirect(target: &StreamTarget, which: Redirect) -> Result<()> {
    let path = match target {
        StreamTarget::Inherit => return Ok(()),
        StreamTarget::File(path) => path.as_str(),
        StreamTarget::Null => NULL_DEVICE,
    };
    let (file, fd, direction) = match which {
        Redirect::Input => (File::open(path), 0, "input"),
        Redirect::Output => (
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o644)
                .open(path),
            1,
            "output",
        ),
    };
    let file = file.with_context(|| format!("cannot open {} for {}", path, direction))?;
    unistd::dup2(file.as_raw_fd(), fd)
        .with_context(|| format!("cannot redirect {} to {}", direction, path))?;
    Ok(())
}

/// Block until `child` terminates, riding out interrupted waits.
pub fn wait_for(child: Pid) -> Result<TerminationStatus> {
    loop {
        match wait::waitpid(child, None) {
            Ok(status) => {
                if let Some(status) = TerminationStatus::from_wait(status) {
                    return Ok(status);
                }
            }
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e).with_context(|| format!("waiting for pid {} failed", child)),
        }
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(&self, command: &ParsedCommand) -> Option<Box<dyn ExecutableCommand>> {
        Some(Box::new(ExternalCommand::new(command)))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(self: Box<Self>, session: &mut Session, stdout: &mut dyn Write) -> Result<()> {
        stdout.flush()?;
        let child = self.spawn(session)?;

        if self.runs_in_background(session) {
            debug!("{} started in background as pid {}", self.argv[0], child);
            writeln!(stdout, "background pid is {}", child)?;
            stdout.flush()?;
            return Ok(());
        }

        debug!("waiting for foreground pid {}", child);
        let status = wait_for(child)?;
        debug!("foreground pid {} finished: {}", child, status);
        session.set_last_status(status);
        Ok(())
    }
}
