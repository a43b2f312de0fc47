// ID Generator - per-store identifier sequence
// Each store instance owns its own sequence; nothing here is process-global.

use std::sync::atomic::{AtomicI64, Ordering};

/// Monotonic identifier sequence starting at 1
#[derive(Debug)]
pub struct IdSequence {
    next: AtomicI64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Sequence whose first issued id is `first`
    pub fn starting_at(first: i64) -> Self {
        Self {
            next: AtomicI64::new(first),
        }
    }

    /// Issue the next identifier. Concurrent callers never see the same value.
    pub fn next_id(&self) -> i64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}
