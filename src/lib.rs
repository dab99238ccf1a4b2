//! A small interactive command shell.
//!
//! Each input line goes through the same pipeline: the `$$` marker is
//! expanded to the shell's pid, the line is split into words and parsed into a
//! [`ParsedCommand`] (arguments, optional `<`/`>` redirections, trailing `&`),
//! and the command is either run in-process as a built-in (`exit`, `cd`,
//! `status`) or forked and exec'd as an external program.
//!
//! Background children are collected without blocking before every prompt.
//! SIGINT never reaches the shell itself, and SIGTSTP toggles a
//! foreground-only mode in which `&` is ignored.
//!
//! The main entry point is [`Shell`]; [`Session`] holds the state shared by
//! the built-ins, the executor and the signal handler.

mod builtin;
pub mod command;
mod external;
pub mod input;
pub mod lexer;
pub mod logger;
pub mod parser;
mod reaper;
pub mod session;
mod shell;
mod signals;
pub mod status;

pub use command::ParsedCommand;
pub use session::Session;
pub use shell::Shell;
