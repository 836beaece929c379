//! Change batcher: debounced coalescing of filesystem notifications
//!
//! Creations and modifications are collected into a pending set. Every new
//! path restarts the debounce timer, so a steady stream of writes keeps
//! deferring the flush until a quiet period occurs. When the timer fires
//! the set is drained at once:
//!
//! - one path: `SingleFileDetected`, then an immediate upload
//! - several paths: one `BatchDetected` carrying all of them; nothing is
//!   uploaded until the consumer confirms the batch
//!
//! Deletions skip the batch entirely and recycle their path right away. A
//! removal for a path whose recycle is still running is dropped, so one
//! deletion never moves the same file twice.
//!
//! Notifications, the timer task and the flush all touch the pending set
//! from different tasks; the set, the timer handle and the generation
//! counter are one critical section behind a single mutex.

pub mod fs_events;

pub use fs_events::{translate_event, FolderWatcher, FsNotification, NotificationKind};

use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::context::SyncContext;
use crate::events::SyncEvent;
use crate::logging::*;
use crate::paths::base_name;

/// Quiet period before a pending batch is flushed
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1500);

#[derive(Default)]
struct PendingChangeBatch {
	paths: BTreeSet<PathBuf>,
	timer: Option<JoinHandle<()>>,
	/// Bumped on every re-arm; a timer only flushes if it is still current
	generation: u64,
}

struct BatcherInner {
	ctx: SyncContext,
	debounce: Duration,
	pending: Mutex<PendingChangeBatch>,
	/// Repo paths with a recycle in flight
	recycling: Mutex<HashSet<String>>,
	stopped: AtomicBool,
}

/// Debouncing dispatcher for one watched root
#[derive(Clone)]
pub struct ChangeBatcher {
	inner: Arc<BatcherInner>,
}

impl ChangeBatcher {
	pub fn new(ctx: SyncContext, debounce: Duration) -> Self {
		ChangeBatcher {
			inner: Arc::new(BatcherInner {
				ctx,
				debounce,
				pending: Mutex::new(PendingChangeBatch::default()),
				recycling: Mutex::new(HashSet::new()),
				stopped: AtomicBool::new(false),
			}),
		}
	}

	fn pending(&self) -> MutexGuard<'_, PendingChangeBatch> {
		// A panic elsewhere must not wedge the watcher; the set itself stays consistent
		self.inner.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	/// Feed one filesystem notification. Must be called from within the tokio runtime.
	pub fn handle(&self, notification: FsNotification) {
		if self.is_stopped() || notification.is_dir {
			return;
		}
		let repo_path = match self.inner.ctx.repo_path_for(&notification.path) {
			Some(p) => p,
			None => {
				debug!("ignoring notification for {}", notification.path.display());
				return;
			}
		};

		match notification.kind {
			NotificationKind::Created | NotificationKind::Modified => self.add(notification.path),
			NotificationKind::Removed => self.recycle(repo_path),
		}
	}

	/// Recycle immediately, without touching the pending batch
	fn recycle(&self, repo_path: String) {
		if !self.recycling().insert(repo_path.clone()) {
			debug!("recycle of '{}' already running", repo_path);
			return;
		}
		let batcher = self.clone();
		tokio::spawn(async move {
			batcher.inner.ctx.recycle(&repo_path).await;
			batcher.recycling().remove(&repo_path);
		});
	}

	fn recycling(&self) -> MutexGuard<'_, HashSet<String>> {
		self.inner.recycling.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	/// Add a path to the pending set and (re)start the debounce timer
	fn add(&self, path: PathBuf) {
		let mut pending = self.pending();
		pending.paths.insert(path);
		if let Some(timer) = pending.timer.take() {
			timer.abort();
		}
		pending.generation += 1;

		let generation = pending.generation;
		let batcher = self.clone();
		let debounce = self.inner.debounce;
		pending.timer = Some(tokio::spawn(async move {
			tokio::time::sleep(debounce).await;
			batcher.flush(generation).await;
		}));
	}

	async fn flush(&self, generation: u64) {
		let paths: Vec<PathBuf> = {
			let mut pending = self.pending();
			if pending.generation != generation || self.is_stopped() {
				return;
			}
			// Detach our own handle so a later re-arm cannot abort an in-flight upload
			pending.timer = None;
			std::mem::take(&mut pending.paths).into_iter().collect()
		};

		let events = &self.inner.ctx.events;
		match paths.len() {
			0 => {}
			1 => {
				let path = &paths[0];
				events.send(SyncEvent::SingleFileDetected { name: base_name(path) });
				self.inner.ctx.upload(path).await;
			}
			n => {
				debug!("flushing batch of {} paths", n);
				events.send(SyncEvent::BatchDetected {
					description: format!("{} files changed together", n),
					paths,
				});
			}
		}
	}

	/// Number of paths waiting for the debounce window to close
	pub fn pending_len(&self) -> usize {
		self.pending().paths.len()
	}

	pub fn is_stopped(&self) -> bool {
		self.inner.stopped.load(Ordering::SeqCst)
	}

	/// Stop processing. Any armed timer is abandoned and pending paths are dropped.
	pub fn stop(&self) {
		self.inner.stopped.store(true, Ordering::SeqCst);
		let mut pending = self.pending();
		if let Some(timer) = pending.timer.take() {
			timer.abort();
		}
		pending.paths.clear();
	}
}

// vim: ts=4
