//! Caller-owned cancellation for store operations

use crate::types::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cancellation token passed to every store operation
///
/// Clones share the same cancellation flag, so a caller can hand one clone to
/// the store and cancel through another. The store never cancels on its own;
/// deadlines are set by the caller.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled unless [`cancel`](Self::cancel) is called
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context that additionally expires at `deadline`
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        };
        Self {
            cancelled: Arc::clone(&self.cancelled),
            deadline: Some(deadline),
        }
    }

    /// Derive a context that expires after `timeout`
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Cancel this context and every clone of it
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether the context was cancelled or its deadline passed
    pub fn is_cancelled(&self) -> bool {
        self.err().is_some()
    }

    /// The cancellation error, if any
    pub fn err(&self) -> Option<Error> {
        if self.cancelled.load(Ordering::Acquire) {
            return Some(Error::cancelled("context cancelled"));
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Error::cancelled("context deadline exceeded")),
            _ => None,
        }
    }

    /// Fail with the cancellation error if cancelled
    pub fn check(&self) -> Result<()> {
        match self.err() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
