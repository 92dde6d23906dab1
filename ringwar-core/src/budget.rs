//! Wall-clock search budgets with cooperative cancellation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared flag that expires any budget holding it
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Deadline checked at every recursion or iteration boundary
#[derive(Clone, Debug)]
pub struct Budget {
    started: Instant,
    deadline: Option<Instant>,
    cancel: Option<CancelToken>,
}

impl Budget {
    pub fn new(limit: Duration, cancel: Option<CancelToken>) -> Self {
        let started = Instant::now();
        Self {
            started,
            deadline: started.checked_add(limit),
            cancel,
        }
    }

    pub fn expired(&self) -> bool {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return true;
        }
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
