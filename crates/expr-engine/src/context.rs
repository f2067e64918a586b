//! Cancellation context handed to every evaluation.

use crate::error::EvalError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cancellation signal and optional deadline for an evaluation.
///
/// Cloning is cheap and clones share the cancellation flag, so a clone kept by
/// another thread can abort evaluations running with the original.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled unless [`cancel`](Self::cancel) is called.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derives a context sharing this one's flag, expiring at `deadline`.
    ///
    /// An earlier existing deadline is kept.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(d) if d < deadline => d,
            _ => deadline,
        };
        Context {
            cancelled: Arc::clone(&self.cancelled),
            deadline: Some(deadline),
        }
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the cancellation error if the context is done.
    pub fn check(&self) -> Result<(), EvalError> {
        if self.is_cancelled() {
            return Err(EvalError::Cancelled);
        }
        match self.deadline {
            Some(d) if Instant::now() >= d => Err(EvalError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_is_live() {
        assert_eq!(Context::background().check(), Ok(()));
    }

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let ctx = Context::background();
        let other = ctx.clone();
        other.cancel();
        assert!(ctx.is_cancelled());
        assert_eq!(ctx.check(), Err(EvalError::Cancelled));
    }

    #[test]
    fn test_expired_deadline() {
        let ctx = Context::background().with_deadline(Instant::now() - Duration::from_millis(1));
        assert_eq!(ctx.check(), Err(EvalError::DeadlineExceeded));
    }

    #[test]
    fn test_derived_context_keeps_earlier_deadline() {
        let soon = Instant::now() + Duration::from_secs(1);
        let ctx = Context::background().with_deadline(soon);
        let later = ctx.with_timeout(Duration::from_secs(60));
        assert_eq!(later.deadline(), Some(soon));
        ctx.cancel();
        assert_eq!(later.check(), Err(EvalError::Cancelled));
    }
}
