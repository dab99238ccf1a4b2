use crate::status::TerminationStatus;
use anyhow::{Context, Result};
use log::debug;
use nix::errno::Errno;
use nix::sys::wait::{self, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use std::io::Write;

/// Collect every background child that has already terminated.
///
/// Never blocks: stops as soon as no finished child is left (or the shell has
/// no children at all). Each collected child is reported as
/// `background pid N is done: <status>`. Returns how many were reaped.
pub fn reap_background(out: &mut dyn Write) -> Result<usize> {
    let mut reaped = 0;
    loop {
        let status = match wait::waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) | Err(Errno::ECHILD) => break,
            Ok(status) => status,
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e).context("waiting for background children failed"),
        };
        let (Some(pid), Some(outcome)) = (status.pid(), TerminationStatus::from_wait(status))
        else {
            continue;
        };
        debug!("reaped background pid {}: {}", pid, outcome);
        writeln!(out, "background pid {} is done: {}", pid, outcome)?;
        reaped += 1;
    }
    if reaped > 0 {
        out.flush()?;
    }
    Ok(reaped)
}
