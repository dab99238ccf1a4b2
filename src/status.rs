use nix::sys::wait::WaitStatus;
use std::fmt;

/// How a child process ended.
///
/// Displayed the way `status` and the background reports print it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationStatus {
    /// Normal exit with the given code.
    Exited(i32),
    /// Killed by the given signal number.
    Signaled(i32),
}

impl Default for TerminationStatus {
    /// Before any foreground command has run, `status` reports a clean exit.
    fn default() -> Self {
        TerminationStatus::Exited(0)
    }
}

impl TerminationStatus {
    /// Decode a wait result. Returns `None` for states that are not a
    /// termination (stopped, continued, still alive).
    pub fn from_wait(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, code) => Some(TerminationStatus::Exited(code)),
            WaitStatus::Signaled(_, signal, _) => Some(TerminationStatus::Signaled(signal as i32)),
            _ => None,
        }
    }
}

impl fmt::Display for TerminationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationStatus::Exited(code) => write!(f, "exit value {}", code),
            TerminationStatus::Signaled(signal) => write!(f, "terminated by signal {}", signal),
        }
    }
}
