use crate::session::Session;
use anyhow::Result;
use std::io::Write;

/// Upper bound on the number of arguments a single command line may carry.
pub const MAX_ARGUMENTS: usize = 512;

/// A single command line after expansion and parsing.
///
/// Built fresh for every input line and dropped once the line has been
/// dispatched. `arguments` is never empty: blank and comment lines never reach
/// the parser, and a line that leaves no program name is a parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub(crate) arguments: Vec<String>,
    pub(crate) input_path: Option<String>,
    pub(crate) output_path: Option<String>,
    pub(crate) is_background: bool,
}

impl ParsedCommand {
    /// Program name, i.e. `arguments[0]`.
    pub fn program(&self) -> &str {
        &self.arguments[0]
    }

    /// Full argument vector, program name included.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// File requested with `<`, if any.
    pub fn input_path(&self) -> Option<&str> {
        self.input_path.as_deref()
    }

    /// File requested with `>`, if any.
    pub fn output_path(&self) -> Option<&str> {
        self.output_path.as_deref()
    }

    /// Whether the line ended with a standalone `&`.
    pub fn is_background(&self) -> bool {
        self.is_background
    }
}

/// Object-safe trait for anything the shell can run for a parsed line.
///
/// Implemented by the built-ins via a blanket impl and by external programs.
pub trait ExecutableCommand {
    /// Runs the command. Shell messages go to `stdout`; spawned programs write
    /// to the process's real standard streams.
    fn execute(self: Box<Self>, session: &mut Session, stdout: &mut dyn Write) -> Result<()>;
}

/// Factory that tries to create a command for a parsed line.
///
/// Returns `None` when the factory doesn't recognize the program name.
pub trait CommandFactory {
    fn try_create(&self, command: &ParsedCommand) -> Option<Box<dyn ExecutableCommand>>;
}
