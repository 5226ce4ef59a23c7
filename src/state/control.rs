//! Cooperative pause and cancel signals
//!
//! A [`CrawlControl`] is shared between the traversal and whoever drives it.
//! The traversal polls it only at its suspension points; flipping a flag never
//! interrupts a fetch or a cool-down that is already in progress.

use std::sync::Arc;
use tokio::sync::watch;

/// Outcome of waiting at the pause gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Continue with the next comment
    Proceed,
    /// Cancellation was requested; stop the traversal
    Cancelled,
}

#[derive(Debug)]
struct ControlInner {
    paused: watch::Sender<bool>,
    cancelled: watch::Sender<bool>,
}

/// Shared pause/cancel flags for one crawl session
#[derive(Debug, Clone)]
pub struct CrawlControl {
    inner: Arc<ControlInner>,
}

impl CrawlControl {
    pub fn new() -> Self {
        let (paused, _) = watch::channel(false);
        let (cancelled, _) = watch::channel(false);

        Self {
            inner: Arc::new(ControlInner { paused, cancelled }),
        }
    }

    /// Clears both flags before a new run
    pub fn reset(&self) {
        self.inner.paused.send_replace(false);
        self.inner.cancelled.send_replace(false);
    }

    pub fn pause(&self) {
        self.inner.paused.send_replace(true);
    }

    pub fn resume(&self) {
        self.inner.paused.send_replace(false);
    }

    pub fn is_paused(&self) -> bool {
        *self.inner.paused.borrow()
    }

    /// Requests cancellation; also releases a traversal parked at the pause gate
    pub fn cancel(&self) {
        self.inner.cancelled.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.borrow()
    }

    /// Blocks while paused
    ///
    /// Returns immediately when not paused. While paused, waits until either
    /// a resume or a cancel arrives.
    pub async fn wait_if_paused(&self) -> Gate {
        if self.is_cancelled() {
            return Gate::Cancelled;
        }
        if !self.is_paused() {
            return Gate::Proceed;
        }

        tracing::debug!("Traversal parked at pause gate");
        let mut paused = self.inner.paused.subscribe();
        let mut cancelled = self.inner.cancelled.subscribe();

        tokio::select! {
            _ = async { paused.wait_for(|p| !*p).await.map(|_| ()) } => {}
            _ = async { cancelled.wait_for(|c| *c).await.map(|_| ()) } => {}
        }

        if self.is_cancelled() {
            Gate::Cancelled
        } else {
            Gate::Proceed
        }
    }
}

impl Default for CrawlControl {
    fn default() -> Self {
        Self::new()
    }
}
