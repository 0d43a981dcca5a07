//! Ctrl-C handling.
//!
//! While a child process runs, the first SIGINT only raises a flag. Children
//! in the foreground group receive the signal too and exit on their own; the
//! tool runner then notices the flag and stops the run. With no child
//! running (an upload, STL loading, G-code parsing) the first SIGINT exits
//! at once. A second SIGINT always exits immediately.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::{MakeError, Result};

/// Exit status for a run stopped by the user.
pub const INTERRUPT_EXIT_CODE: u8 = 130;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);
static RUNNING_CHILDREN: AtomicUsize = AtomicUsize::new(0);

/// Whether a SIGINT must end the process right away instead of waiting for
/// a child to exit.
fn exits_immediately(already_interrupted: bool, running_children: usize) -> bool {
    already_interrupted || running_children == 0
}

/// Install the SIGINT handler. Safe to call more than once.
#[cfg(unix)]
pub fn install_handler() {
    extern "C" fn on_sigint(_: libc::c_int) {
        let already = INTERRUPTED.swap(true, Ordering::SeqCst);
        if exits_immediately(already, RUNNING_CHILDREN.load(Ordering::SeqCst)) {
            // SAFETY: _exit is async-signal-safe.
            unsafe { libc::_exit(INTERRUPT_EXIT_CODE as libc::c_int) };
        }
    }

    // SAFETY: the handler only touches atomics and calls _exit.
    unsafe {
        libc::signal(libc::SIGINT, on_sigint as libc::sighandler_t);
    }
}

#[cfg(not(unix))]
pub fn install_handler() {}

/// Marks a child process as running until dropped.
#[must_use = "the child only counts as running while the guard is alive"]
#[derive(Debug)]
pub struct ChildGuard {
    _private: (),
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        RUNNING_CHILDREN.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Hold the returned guard for as long as a child process runs.
pub fn child_running() -> ChildGuard {
    RUNNING_CHILDREN.fetch_add(1, Ordering::SeqCst);
    ChildGuard { _private: () }
}

/// Number of child processes currently marked as running.
pub fn running_children() -> usize {
    RUNNING_CHILDREN.load(Ordering::SeqCst)
}

/// Whether the user has asked to stop.
pub fn is_interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// `Err(Interrupted)` once the user has asked to stop.
pub fn check() -> Result<()> {
    if is_interrupted() {
        Err(MakeError::Interrupted)
    } else {
        Ok(())
    }
}
