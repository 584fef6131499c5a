//! Cancellation and deadlines for blocking operations.
//!
//! Every unit of work, lock acquisition and consumer delivery takes a
//! [`Context`]. A context is cheap to clone and forms a tree: cancelling a
//! parent cancels all of its children, and a child's effective deadline is the
//! earliest deadline on its path to the root.
//!
//! ```
//! use std::time::Duration;
//! use transactional_outbox::Context;
//!
//! let root = Context::background();
//! let request = root.with_timeout(Duration::from_secs(5));
//! assert!(request.check().is_ok());
//!
//! root.cancel();
//! assert!(request.is_cancelled());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

/// Why a context stopped admitting work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("context cancelled")]
    Cancelled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug)]
struct Inner {
    cancelled: AtomicBool,
    deadline: Option<Instant>,
    parent: Option<Context>,
}

/// A cancellable scope with an optional deadline.
#[derive(Debug, Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

impl Context {
    /// A root context: never cancelled unless [`cancel`](Self::cancel) is called,
    /// no deadline.
    pub fn background() -> Self {
        Self::build(None, None)
    }

    /// A child context whose deadline is `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// A child context with an absolute deadline.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        Self::build(Some(deadline), Some(self.clone()))
    }

    /// A child context that can be cancelled independently of its parent.
    pub fn child(&self) -> Self {
        Self::build(None, Some(self.clone()))
    }

    fn build(deadline: Option<Instant>, parent: Option<Context>) -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                deadline,
                parent,
            }),
        }
    }

    /// Cancel this context and every context derived from it.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        let mut current = Some(self);
        while let Some(ctx) = current {
            if ctx.inner.cancelled.load(Ordering::SeqCst) {
                return true;
            }
            current = ctx.inner.parent.as_ref();
        }
        false
    }

    /// The earliest deadline on the path to the root.
    pub fn deadline(&self) -> Option<Instant> {
        let mut earliest: Option<Instant> = None;
        let mut current = Some(self);
        while let Some(ctx) = current {
            if let Some(deadline) = ctx.inner.deadline {
                earliest = Some(earliest.map_or(deadline, |e| e.min(deadline)));
            }
            current = ctx.inner.parent.as_ref();
        }
        earliest
    }

    /// Time left until the deadline. `None` means unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// The reason this context is done, if it is.
    pub fn err(&self) -> Option<ContextError> {
        if self.is_cancelled() {
            return Some(ContextError::Cancelled);
        }
        match self.deadline() {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Fail fast if the context is cancelled or past its deadline.
    pub fn check(&self) -> Result<(), ContextError> {
        match self.err() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_is_never_done() {
        let ctx = Context::background();
        assert!(!ctx.is_done());
        assert_eq!(ctx.deadline(), None);
        assert_eq!(ctx.remaining(), None);
        assert!(ctx.check().is_ok());
    }

    #[test]
    fn cancelling_parent_cancels_children() {
        let root = Context::background();
        let child = root.child();
        let grandchild = child.with_timeout(Duration::from_secs(60));

        root.cancel();

        assert_eq!(child.err(), Some(ContextError::Cancelled));
        assert_eq!(grandchild.check(), Err(ContextError::Cancelled));
    }

    #[test]
    fn cancelling_child_leaves_parent_alone() {
        let root = Context::background();
        let child = root.child();
        child.cancel();

        assert!(child.is_cancelled());
        assert!(!root.is_cancelled());
    }

    #[test]
    fn expired_deadline_is_reported() {
        let ctx = Context::background().with_timeout(Duration::ZERO);
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn child_inherits_earliest_deadline() {
        let root = Context::background().with_timeout(Duration::from_millis(50));
        let child = root.with_timeout(Duration::from_secs(60));
        assert_eq!(child.deadline(), root.deadline());
    }

    #[test]
    fn cancellation_wins_over_deadline() {
        let ctx = Context::background().with_timeout(Duration::ZERO);
        ctx.cancel();
        assert_eq!(ctx.err(), Some(ContextError::Cancelled));
    }
}
