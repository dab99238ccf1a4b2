//! Signal dispositions for the shell and its children.
//!
//! The shell ignores SIGINT so Ctrl-C only reaches foreground children, and
//! turns SIGTSTP into a foreground-only mode toggle. The handler flips an
//! atomic flag and writes a static banner straight to the stdout descriptor.

use crate::session::{Session, toggle_mode};
use anyhow::{Context, Result};
use log::debug;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::libc::STDOUT_FILENO;
use nix::unistd::{self, Pid};
use signal_hook::SigId;
use signal_hook::consts::SIGTSTP;
use std::os::fd::BorrowedFd;

fn set_disposition(signal: Signal, handler: SigHandler) -> nix::Result<()> {
    let action = SigAction::new(handler, SaFlags::empty(), SigSet::empty());
    unsafe { signal::sigaction(signal, &action) }.map(|_| ())
}

/// Install the shell's own signal handling. Call once, before the first
/// prompt.
pub fn install(session: &Session) -> Result<SigId> {
    set_disposition(Signal::SIGINT, SigHandler::SigIgn).context("cannot ignore SIGINT")?;

    let foreground_only = session.foreground_only_flag();
    // SAFETY: the action is a lock-free atomic xor plus one write(2) of a
    // static buffer, both async-signal-safe. The stdout descriptor stays open
    // for the life of the process.
    let id = unsafe {
        signal_hook::low_level::register(SIGTSTP, move || {
            let banner = toggle_mode(&foreground_only);
            let stdout = BorrowedFd::borrow_raw(STDOUT_FILENO);
            let _ = unistd::write(stdout, banner.as_bytes());
        })
    }
    .context("cannot install SIGTSTP handler")?;

    debug!("signal handlers installed");
    Ok(id)
}

/// Reset dispositions in a freshly forked child, before exec.
///
/// SIGINT goes back to its default so the terminal can interrupt the child.
/// SIGTSTP is ignored: the suspend key toggles the shell's mode and must not
/// stop the program the shell is waiting for.
pub fn restore_child_defaults() -> nix::Result<()> {
    set_disposition(Signal::SIGINT, SigHandler::SigDfl)?;
    set_disposition(Signal::SIGTSTP, SigHandler::SigIgn)
}

/// Send SIGTERM to every process in the shell's process group while the shell
/// itself ignores it.
pub fn terminate_process_group() -> Result<()> {
    set_disposition(Signal::SIGTERM, SigHandler::SigIgn).context("cannot ignore SIGTERM")?;
    debug!("sending SIGTERM to the process group");
    signal::kill(Pid::from_raw(0), Signal::SIGTERM).context("cannot signal the process group")?;
    Ok(())
}
