//! Ctrl-C handling.
//!
//! SIGINT only raises a process-wide flag; the driver polls it between
//! formulas and stops cleanly, keeping the records written so far. The
//! handler is installed without `SA_RESTART`, so a read blocked on an
//! unresponsive implementation returns `EINTR` and the driver gets to see the
//! flag.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::BenchResult;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_sigint(_signal: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Route SIGINT to the process-wide interrupt flag.
pub fn install_handler() -> BenchResult<()> {
    // SAFETY: `action` is fully initialised before use, and the handler only
    // performs an atomic store, which is async-signal-safe.
    let rc = unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = on_sigint as extern "C" fn(libc::c_int) as libc::sighandler_t;
        action.sa_flags = 0;
        libc::sigemptyset(&mut action.sa_mask);
        libc::sigaction(libc::SIGINT, &action, std::ptr::null_mut())
    };
    if rc != 0 {
        return Err(std::io::Error::last_os_error().into());
    }
    Ok(())
}

/// The flag set by the SIGINT handler.
pub fn interrupt_flag() -> &'static AtomicBool {
    &INTERRUPTED
}
