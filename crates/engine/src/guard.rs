use std::sync::atomic::{AtomicBool, Ordering};

/// Per-engine reentrancy lock.
///
/// Held across the two operations that call external code. While held, every
/// other guarded entry point fails fast instead of executing.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    entered: AtomicBool,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for the duration of an external call. `None` if an
    /// external call is already in flight.
    pub fn try_enter(&self) -> Option<ReentrancyToken<'_>> {
        self.entered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ReentrancyToken { guard: self })
    }

    /// Whether an external call is currently in flight.
    pub fn is_entered(&self) -> bool {
        self.entered.load(Ordering::Acquire)
    }
}

pub struct ReentrancyToken<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for ReentrancyToken<'_> {
    fn drop(&mut self) {
        self.guard.entered.store(false, Ordering::Release);
    }
}
