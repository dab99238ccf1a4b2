use crate::status::TerminationStatus;
use nix::unistd::{self, Pid};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub const ENTER_FOREGROUND_ONLY: &str = "\nEntering foreground-only mode (& is now ignored)\n";
pub const EXIT_FOREGROUND_ONLY: &str = "\nExiting foreground-only mode\n";

/// Flip the mode flag and return the banner for the mode just entered.
///
/// Called from signal context: one atomic operation, a static string, no
/// allocation.
pub(crate) fn toggle_mode(foreground_only: &AtomicBool) -> &'static str {
    if foreground_only.fetch_xor(true, Ordering::SeqCst) {
        EXIT_FOREGROUND_ONLY
    } else {
        ENTER_FOREGROUND_ONLY
    }
}

/// Process-wide state of one shell run.
///
/// Owned by the prompt loop and handed by reference to the built-ins, the
/// executor and the signal setup. The only piece touched from signal context
/// is the foreground-only flag, shared with the suspend handler.
#[derive(Debug)]
pub struct Session {
    pid: Pid,
    foreground_only: Arc<AtomicBool>,
    last_status: TerminationStatus,
    should_exit: bool,
}

impl Session {
    /// Fresh state for the current process: normal mode, clean status.
    pub fn new() -> Self {
        Self {
            pid: unistd::getpid(),
            foreground_only: Arc::new(AtomicBool::new(false)),
            last_status: TerminationStatus::default(),
            should_exit: false,
        }
    }

    /// The shell's own process id, used for `$$`.
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// When set, every command runs in the foreground regardless of `&`.
    pub fn foreground_only(&self) -> bool {
        self.foreground_only.load(Ordering::SeqCst)
    }

    /// Flag shared with the suspend signal handler.
    pub fn foreground_only_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.foreground_only)
    }

    /// Switch foreground-only mode, returning the banner for the new mode.
    pub fn toggle_foreground_only(&self) -> &'static str {
        toggle_mode(&self.foreground_only)
    }

    pub fn last_status(&self) -> TerminationStatus {
        self.last_status
    }

    /// Record the outcome of a foreground wait.
    pub fn set_last_status(&mut self, status: TerminationStatus) {
        self.last_status = status;
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    pub fn request_exit(&mut self) {
        self.should_exit = true;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
