//! Asynchronous signal delivery.
//!
//! A [`SignalHandle`] is the only part of an interpreter that may be touched
//! from another context (an OS signal handler, another thread). Raising a
//! signal stores one bit into an atomic mask and nothing else: no
//! allocation, no locks, no calls into the object model. The evaluator polls
//! the mask before every command and turns a pending bit into
//! [`Flow::Signal`](crate::Flow::Signal).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Cloneable, `Send` handle for raising signals on one interpreter.
#[derive(Clone, Debug, Default)]
pub struct SignalHandle {
    pending: Arc<AtomicU64>,
}

impl SignalHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `signal` as delivered. Numbers outside `1..64` are ignored.
    #[inline]
    pub fn raise(&self, signal: u32) {
        if (1..64).contains(&signal) {
            self.pending.fetch_or(1 << signal, Ordering::SeqCst);
        }
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Relaxed) != 0
    }

    /// Remove and return the lowest pending signal.
    pub(crate) fn take(&self) -> Option<u32> {
        let bits = self.pending.load(Ordering::Relaxed);
        if bits == 0 {
            return None;
        }
        let signal = bits.trailing_zeros();
        self.pending.fetch_and(!(1 << signal), Ordering::SeqCst);
        Some(signal)
    }

    /// Drop everything pending.
    pub fn clear(&self) {
        self.pending.store(0, Ordering::SeqCst);
    }
}

/// Conventional name of a POSIX signal number.
pub fn signal_name(signal: u32) -> String {
    let name = match signal {
        1 => "SIGHUP",
        2 => "SIGINT",
        3 => "SIGQUIT",
        6 => "SIGABRT",
        9 => "SIGKILL",
        10 => "SIGUSR1",
        12 => "SIGUSR2",
        13 => "SIGPIPE",
        14 => "SIGALRM",
        15 => "SIGTERM",
        _ => return format!("SIG{signal}"),
    };
    name.to_string()
}
