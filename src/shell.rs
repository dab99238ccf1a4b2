use crate::command::{CommandFactory, ParsedCommand};
use crate::input::LineReader;
use crate::session::Session;
use crate::{lexer, parser, reaper, signals};
use anyhow::{Result, anyhow};
use log::debug;
use std::io::{self, Write};

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate: the builtins and
/// ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// The prompt loop and the dispatch of parsed lines.
///
/// The shell owns the [`Session`] and an ordered list of [`CommandFactory`]
/// objects; the first factory that accepts a line runs it. See [`Default`]
/// for the set used by the `smallsh` binary.
///
/// Example
/// ```
/// use smallsh::Shell;
/// let mut sh = Shell::default();
/// let mut out = Vec::new();
/// sh.run_line("status", &mut out).unwrap();
/// assert_eq!(out, b"exit value 0\n");
/// ```
pub struct Shell {
    session: Session,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Shell {
    /// Create a shell with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            session: Session::new(),
            commands,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Expand, parse and run one input line.
    ///
    /// Blank and comment lines do nothing. Shell messages are written to `out`.
    pub fn run_line(&mut self, line: &str, out: &mut dyn Write) -> Result<()> {
        let expanded = lexer::expand_pid(line, self.session.pid().as_raw());
        let Some(command) = parser::parse_command(&expanded)? else {
            return Ok(());
        };
        debug!("parsed {:?}", command);
        self.execute(&command, out)
    }

    /// Dispatch a parsed command to the first factory that accepts it.
    pub fn execute(&mut self, command: &ParsedCommand, out: &mut dyn Write) -> Result<()> {
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(command) {
                return cmd.execute(&mut self.session, out);
            }
        }
        Err(anyhow!("command not found: {}", command.program()))
    }

    /// Run the interactive loop until `exit` or end of input.
    ///
    /// Each iteration reports finished background children, then reads and
    /// runs a line. An error only aborts its own line.
    pub fn repl(&mut self, input: &mut LineReader) -> Result<()> {
        let _suspend_handler = signals::install(&self.session)?;
        let mut stdout = io::stdout();

        loop {
            reaper::reap_background(&mut stdout)?;

            let Some(line) = input.read_line()? else {
                debug!("end of input");
                break;
            };

            if let Err(e) = self.run_line(&line, &mut stdout) {
                stdout.flush()?;
                eprintln!("smallsh: {:#}", e);
            }

            if self.session.should_exit() {
                signals::terminate_process_group()?;
                break;
            }
        }

        stdout.flush()?;
        Ok(())
    }
}

impl Default for Shell {
    /// Create a shell with the default set of commands, in dispatch order:
    /// - built-ins: `exit`, `cd`, `status`
    /// - external program launcher
    fn default() -> Self {
        use crate::builtin::*;
        use crate::external::ExternalCommand;
        Self::new(vec![
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<Status>::default()),
            Box::new(Factory::<ExternalCommand>::default()),
        ])
    }
}
