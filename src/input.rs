use anyhow::Result;
use log::warn;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, BufRead, Write};

/// The fixed prompt printed before every read.
pub const PROMPT: &str = ": ";

/// Source of command lines for the prompt loop.
pub enum LineReader {
    /// Interactive terminal: line editing and history through rustyline.
    Editor(DefaultEditor),
    /// Anything else: the prompt is written to stdout and a line is read
    /// straight from stdin.
    Plain(Box<dyn BufRead>),
}

impl LineReader {
    pub fn editor() -> Result<Self> {
        Ok(LineReader::Editor(DefaultEditor::new()?))
    }

    pub fn plain() -> Self {
        LineReader::Plain(Box::new(io::stdin().lock()))
    }

    /// Prompt and read one line, without its trailing newline.
    ///
    /// Returns `None` at end of input. An interrupt at the editor yields an
    /// empty line so the shell keeps running, and bytes that are not UTF-8
    /// never end the session: plain input is decoded lossily, an undecodable
    /// editor line is reported and skipped.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        match self {
            LineReader::Editor(rl) => match rl.readline(PROMPT) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.as_str())?;
                    }
                    Ok(Some(line))
                }
                Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
                Err(ReadlineError::Eof) => Ok(None),
                Err(ReadlineError::Io(e)) if e.kind() == io::ErrorKind::InvalidData => {
                    warn!("skipping unreadable line: {}", e);
                    Ok(Some(String::new()))
                }
                Err(err) => Err(err.into()),
            },
            LineReader::Plain(reader) => {
                let mut stdout = io::stdout();
                stdout.write_all(PROMPT.as_bytes())?;
                stdout.flush()?;
                read_plain_line(reader.as_mut())
            }
        }
    }
}

fn read_plain_line(reader: &mut dyn BufRead) -> Result<Option<String>> {
    let mut raw = Vec::new();
    if reader.read_until(b'\n', &mut raw)? == 0 {
        return Ok(None);
    }
    if raw.ends_with(b"\n") {
        raw.pop();
        if raw.ends_with(b"\r") {
            raw.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
}
