use crate::command::{MAX_ARGUMENTS, ParsedCommand};
use crate::lexer;
use std::fmt;

/// Which stream a redirection operator targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    /// `<`: standard input is read from a file.
    Input,
    /// `>`: standard output is written to a file, truncating it.
    Output,
}

impl RedirectKind {
    fn operator(self) -> &'static str {
        match self {
            RedirectKind::Input => "<",
            RedirectKind::Output => ">",
        }
    }
}

/// Errors that can occur while turning a line into a [`ParsedCommand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    /// `<` or `>` was the last word on the line.
    MissingRedirectTarget(RedirectKind),
    /// Redirections and `&` consumed every word, leaving no program to run.
    EmptyCommand,
    /// More arguments than the shell accepts on one line.
    TooManyArguments(usize),
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsingError::MissingRedirectTarget(kind) => write!(
                f,
                "syntax error: expected a file name after '{}'",
                kind.operator()
            ),
            ParsingError::EmptyCommand => write!(f, "syntax error: missing command"),
            ParsingError::TooManyArguments(limit) => {
                write!(f, "too many arguments (at most {} allowed)", limit)
            }
        }
    }
}

impl std::error::Error for ParsingError {}

struct CommandBuilder<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
}

impl<'a> CommandBuilder<'a> {
    fn from(tokens: Vec<&'a str>) -> Self {
        CommandBuilder { tokens, pos: 0 }
    }

    fn consume(&mut self) -> Option<&'a str> {
        let token = self.tokens.get(self.pos).copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect_target(&mut self, kind: RedirectKind) -> Result<String, ParsingError> {
        self.consume()
            .map(str::to_string)
            .ok_or(ParsingError::MissingRedirectTarget(kind))
    }

    /// Scan: `<` and `>` take the next word as a path (a later one of the same
    /// kind replaces an earlier one), everything else is an argument.
    fn build_command(mut self) -> Result<ParsedCommand, ParsingError> {
        let mut arguments = Vec::new();
        let mut input_path = None;
        let mut output_path = None;

        while let Some(token) = self.consume() {
            match token {
                "<" => input_path = Some(self.expect_target(RedirectKind::Input)?),
                ">" => output_path = Some(self.expect_target(RedirectKind::Output)?),
                word => arguments.push(word.to_string()),
            }
        }

        let is_background = arguments.last().is_some_and(|last| last == "&");
        if is_background {
            arguments.pop();
        }

        if arguments.is_empty() {
            return Err(ParsingError::EmptyCommand);
        }
        if arguments.len() > MAX_ARGUMENTS {
            return Err(ParsingError::TooManyArguments(MAX_ARGUMENTS));
        }

        Ok(ParsedCommand {
            arguments,
            input_path,
            output_path,
            is_background,
        })
    }
}

/// Parse an already expanded line.
///
/// Returns `Ok(None)` for blank and comment lines, which produce no command.
pub fn parse_command(line: &str) -> Result<Option<ParsedCommand>, ParsingError> {
    if lexer::is_noop_line(line) {
        return Ok(None);
    }
    CommandBuilder::from(lexer::split_into_tokens(line))
        .build_command()
        .map(Some)
}
