//! Cancellation and deadline signal shared between a caller and its downloads.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

/// A cloneable cancellation/deadline signal.
///
/// Clones observe the same signal. The signal fires when [`Context::cancel`]
/// is called on any clone or when the optional deadline passes, and it never
/// resets afterwards.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use resumable_transport::Context;
///
/// let ctx = Context::with_timeout(Duration::from_secs(30));
/// assert!(!ctx.is_done());
///
/// ctx.clone().cancel();
/// assert!(ctx.is_done());
/// ```
#[derive(Clone, Default)]
pub struct Context {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    deadline:  Option<Instant>,
    cancelled: AtomicBool,
    notify:    Notify,
}

impl Context {
    /// A context that only fires when cancelled explicitly.
    pub fn background() -> Self { Self::default() }

    /// A context that fires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A context that fires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            inner: Arc::new(Inner {
                deadline: Some(deadline),
                ..Inner::default()
            }),
        }
    }

    pub fn deadline(&self) -> Option<Instant> { self.inner.deadline }

    /// Fire the signal for every clone of this context.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.notify.notify_waiters();
    }

    /// Returns `true` once the context was cancelled or its deadline passed.
    pub fn is_done(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
            || self
                .inner
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Wait until the signal fires.
    pub async fn done(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // Register interest before checking the flag so a concurrent cancel is not missed.
        notified.as_mut().enable();

        if self.inner.cancelled.load(Ordering::Acquire) {
            return;
        }

        match self.inner.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = notified => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => notified.await,
        }
    }

    /// Returns `true` if both handles observe the same signal.
    pub fn same(&self, other: &Context) -> bool { Arc::ptr_eq(&self.inner, &other.inner) }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("deadline", &self.inner.deadline)
            .field("done", &self.is_done())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_never_fires() {
        let ctx = Context::background();
        assert!(!ctx.is_done());
        assert!(ctx.deadline().is_none());
    }

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let ctx = Context::background();
        let clone = ctx.clone();
        assert!(ctx.same(&clone));
        assert!(!ctx.same(&Context::background()));

        clone.cancel();
        assert!(ctx.is_done());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_fires() {
        let ctx = Context::with_timeout(Duration::from_secs(5));
        assert!(!ctx.is_done());

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(ctx.is_done());
    }

    #[tokio::test(start_paused = true)]
    async fn test_done_waits_for_deadline() {
        let ctx = Context::with_timeout(Duration::from_millis(250));
        ctx.done().await;
        assert!(ctx.is_done());
    }

    #[tokio::test]
    async fn test_done_wakes_on_cancel() {
        let ctx = Context::background();
        let waiter = ctx.clone();
        let handle = tokio::spawn(async move { waiter.done().await });

        tokio::task::yield_now().await;
        ctx.cancel();
        handle.await.unwrap();
        assert!(ctx.is_done());
    }

    #[tokio::test]
    async fn test_done_returns_immediately_when_cancelled() {
        let ctx = Context::background();
        ctx.cancel();
        ctx.done().await;
    }
}
