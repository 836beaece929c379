//! Sync orchestrator and the control surface exposed to the shell
//!
//! A session runs on its own tokio task:
//!
//! 1. list the remote branch, validate and scan the local root
//! 2. reconcile and apply every recycle and upload (failures are logged
//!    per file, the loop never stops early)
//! 3. unless cancelled, watch the local root until cancellation
//!
//! The shell talks to it only through [`SessionHandle`] (cancel, confirm a
//! batch) and the [`EventReceiver`] returned by [`start`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::api::ContentApi;
use crate::cancel::CancelSignal;
use crate::config::{Config, DEFAULT_RECYCLE_DIR};
use crate::context::SyncContext;
use crate::error::SyncError;
use crate::events::{self, EventReceiver, EventSink};
use crate::reconcile::{reconcile, SyncPlan};
use crate::remote::list_remote_files;
use crate::scan::scan_local_files;
use crate::types::RepositoryTarget;
use crate::upload::{upload_batch, BatchReport};
use crate::watcher::{ChangeBatcher, FolderWatcher, DEFAULT_DEBOUNCE};

/// Engine settings that are not part of the repository target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
	pub recycle_prefix: String,
	pub debounce: Duration,
}

impl Default for SessionOptions {
	fn default() -> Self {
		SessionOptions { recycle_prefix: DEFAULT_RECYCLE_DIR.to_string(), debounce: DEFAULT_DEBOUNCE }
	}
}

impl SessionOptions {
	pub fn from_config(config: &Config) -> Self {
		SessionOptions { recycle_prefix: config.recycle_dir.clone(), debounce: config.debounce() }
	}
}

/// Counts from the initial reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitialSyncReport {
	pub uploaded: usize,
	pub upload_failed: usize,
	pub recycled: usize,
	/// Recycles that found nothing to move (folder or already gone)
	pub recycle_skipped: usize,
	pub recycle_failed: usize,
}

/// How a session ended
#[derive(Debug)]
pub enum SessionOutcome {
	/// Initial sync ran, the watcher ran until cancelled
	Completed(InitialSyncReport),
	/// Cancelled during the initial pass; the watcher never started
	CancelledBeforeWatch(InitialSyncReport),
	/// Aborted before or instead of watching
	Aborted(SyncError),
}

/// Enumerate both trees and compute what the initial pass would do
pub async fn plan(ctx: &SyncContext) -> Result<SyncPlan, SyncError> {
	let remote = list_remote_files(ctx.api.as_ref(), &ctx.recycle_prefix, &ctx.events)
		.await
		.map_err(SyncError::RemoteListing)?;
	let local = scan_local_files(&ctx.local_root, &ctx.recycle_prefix)?;
	Ok(reconcile(&remote, &local))
}

/// Apply a plan: all recycles, then all uploads, each independently
pub async fn apply_plan(ctx: &SyncContext, plan: &SyncPlan) -> InitialSyncReport {
	let mut report = InitialSyncReport::default();

	for repo_path in &plan.recycles {
		let outcome = ctx.recycle(repo_path).await;
		if outcome.is_success() {
			report.recycled += 1;
		} else if outcome.is_failure() {
			report.recycle_failed += 1;
		} else {
			report.recycle_skipped += 1;
		}
	}

	for repo_path in &plan.uploads {
		if ctx.upload_repo_path(repo_path).await.is_success() {
			report.uploaded += 1;
		} else {
			report.upload_failed += 1;
		}
	}

	report
}

/// Reconcile and apply. Session-level failures happen before any mutation.
pub async fn initial_sync(ctx: &SyncContext) -> Result<InitialSyncReport, SyncError> {
	let plan = plan(ctx).await?;
	if plan.is_empty() {
		ctx.events.info("Local folder and remote repository are already in sync");
		return Ok(InitialSyncReport::default());
	}

	ctx.events.info(format!(
		"{} to recycle, {} to upload",
		plan.recycles.len(),
		plan.uploads.len()
	));
	Ok(apply_plan(ctx, &plan).await)
}

/// Full orchestrator sequence; returns once cancelled or aborted
pub async fn run_session(ctx: SyncContext, cancel: CancelSignal, debounce: Duration) -> SessionOutcome {
	ctx.events.info("Starting initial sync...");

	let report = match initial_sync(&ctx).await {
		Ok(report) => report,
		Err(e) => {
			ctx.events.error(format!("Initial sync failed: {}. Not starting the watcher.", e));
			ctx.events.stop_monitoring();
			return SessionOutcome::Aborted(e);
		}
	};

	if cancel.is_cancelled() {
		ctx.events.warn("Sync cancelled; the watcher will not start");
		return SessionOutcome::CancelledBeforeWatch(report);
	}
	ctx.events.info("Initial sync complete");

	let batcher = ChangeBatcher::new(ctx.clone(), debounce);
	let watcher = match FolderWatcher::start(&ctx.local_root, batcher.clone()) {
		Ok(watcher) => watcher,
		Err(e) => {
			ctx.events.error(format!("Could not watch '{}': {}", ctx.local_root.display(), e));
			ctx.events.stop_monitoring();
			return SessionOutcome::Aborted(e);
		}
	};
	ctx.events.info(format!("Watching folder for changes: {}", ctx.local_root.display()));

	cancel.cancelled().await;

	watcher.stop();
	batcher.stop();
	ctx.events.info("Monitoring stopped");
	SessionOutcome::Completed(report)
}

/// Control surface for a running session
#[derive(Clone)]
pub struct SessionHandle {
	ctx: SyncContext,
	cancel: CancelSignal,
	task: Arc<Mutex<Option<JoinHandle<SessionOutcome>>>>,
}

/// Start a session for `target` on a background task
pub fn start(
	api: Arc<dyn ContentApi>,
	target: &RepositoryTarget,
	options: SessionOptions,
) -> (SessionHandle, EventReceiver) {
	let (sink, receiver) = events::channel();
	(start_with_sink(api, target, options, sink), receiver)
}

/// Like [`start`], reporting into an existing event sink
pub fn start_with_sink(
	api: Arc<dyn ContentApi>,
	target: &RepositoryTarget,
	options: SessionOptions,
	sink: EventSink,
) -> SessionHandle {
	let ctx = SyncContext::new(api, sink, target, &options.recycle_prefix);
	let cancel = CancelSignal::new();
	let task = tokio::spawn(run_session(ctx.clone(), cancel.clone(), options.debounce));
	SessionHandle { ctx, cancel, task: Arc::new(Mutex::new(Some(task))) }
}

impl SessionHandle {
	/// Set the cancellation signal; the watcher stops and the session ends
	pub fn request_cancel(&self) {
		self.cancel.cancel();
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Upload a batch the consumer confirmed after `BatchDetected`.
	///
	/// Runs concurrently with further debounce cycles; cancelling the
	/// session stops the remaining files.
	pub fn confirm_batch(&self, paths: Vec<PathBuf>) -> JoinHandle<BatchReport> {
		let ctx = self.ctx.clone();
		let cancel = self.cancel.clone();
		tokio::spawn(async move { upload_batch(&ctx, &cancel, &paths).await })
	}

	/// Wait for the session to end. Only the first caller gets the outcome.
	pub async fn wait(&self) -> Option<SessionOutcome> {
		let task = self.task.lock().await.take()?;
		Some(match task.await {
			Ok(outcome) => outcome,
			Err(e) => SessionOutcome::Aborted(SyncError::Internal { message: e.to_string() }),
		})
	}
}

// vim: ts=4
