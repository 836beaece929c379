//! Set-once cancellation signal shared by the orchestrator and the watcher

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Idempotent cancellation flag. Once set it stays set for the session.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
	inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
	cancelled: AtomicBool,
	notify: Notify,
}

impl CancelSignal {
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the signal. Calling it again has no further effect.
	pub fn cancel(&self) {
		if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
			self.inner.notify.notify_waiters();
		}
	}

	pub fn is_cancelled(&self) -> bool {
		self.inner.cancelled.load(Ordering::SeqCst)
	}

	/// Wait until the signal is set. Returns immediately if it already is.
	pub async fn cancelled(&self) {
		loop {
			let notified = self.inner.notify.notified();
			tokio::pin!(notified);
			// Register before checking the flag so a concurrent cancel() cannot slip between
			notified.as_mut().enable();
			if self.is_cancelled() {
				return;
			}
			notified.await;
		}
	}
}


// vim: ts=4
