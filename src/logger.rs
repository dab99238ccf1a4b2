//! Diagnostics for `-v`: `log` records written to stderr as
//! `smallsh: <level>: <message>`.

use log::{LevelFilter, Log, Metadata, Record};
use std::io::{self, Write};
use std::sync::Mutex;

const PREFIX: &str = "smallsh";

/// Backend for the `log` facade used by the shell.
pub struct ShellLogger {
    level: LevelFilter,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl ShellLogger {
    /// Debug records when `verbose`, otherwise warnings and errors only.
    pub fn new(verbose: bool) -> Self {
        let level = if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        };
        Self::with_sink(level, Box::new(io::stderr()))
    }

    fn with_sink(level: LevelFilter, sink: Box<dyn Write + Send>) -> Self {
        Self {
            level,
            sink: Mutex::new(sink),
        }
    }

    /// Install as the global logger. Fails if one is already set.
    pub fn install(self) -> Result<(), log::SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for ShellLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = record.level().as_str().to_ascii_lowercase();
        if let Ok(mut sink) = self.sink.lock() {
            let _ = writeln!(sink, "{}: {}: {}", PREFIX, level, record.args());
        }
    }

    fn flush(&self) {
        if let Ok(mut sink) = self.sink.lock() {
            let _ = sink.flush();
        }
    }
}
