//! Content uploader: create-or-update one remote file from local bytes

use std::path::{Path, PathBuf};

use crate::api::{ContentApi, PutContent};
use crate::cancel::CancelSignal;
use crate::context::SyncContext;
use crate::error::ApiError;
use crate::events::EventSink;
use crate::logging::*;
use crate::paths::base_name;
use crate::types::ContentRecord;

/// Result of a single upload attempt
#[derive(Debug)]
pub enum UploadOutcome {
	/// No record existed at the path
	Created,
	/// An existing revision was replaced
	Updated,
	/// The local file could not be read; no request was made
	ReadFailed { message: String },
	/// The store rejected the write or could not be reached
	Failed(ApiError),
}

impl UploadOutcome {
	pub fn is_success(&self) -> bool {
		matches!(self, UploadOutcome::Created | UploadOutcome::Updated)
	}
}

pub fn upload_message(repo_path: &str) -> String {
	format!("Sync: Update {}", repo_path)
}

/// Upload the current bytes of `local_path` to `repo_path`.
///
/// Failures are logged and returned, never propagated; sibling uploads
/// are unaffected.
pub async fn upload_file(
	api: &dyn ContentApi,
	events: &EventSink,
	local_path: &Path,
	repo_path: &str,
) -> UploadOutcome {
	events.info(format!("- Processing (add/update): {}", base_name(local_path)));

	let bytes = match tokio::fs::read(local_path).await {
		Ok(bytes) => bytes,
		Err(e) => {
			events.error(format!("  Cannot read '{}': {}", local_path.display(), e));
			return UploadOutcome::ReadFailed { message: e.to_string() };
		}
	};

	let revision = lookup_revision(api, repo_path).await;
	let is_update = revision.is_some();
	let request = PutContent::new(upload_message(repo_path), &bytes, revision);

	events.info(format!("  Uploading to '{}'...", repo_path));
	match api.put_content(repo_path, &request).await {
		Ok(_) => {
			events.info(format!("  Uploaded '{}'", base_name(local_path)));
			if is_update {
				UploadOutcome::Updated
			} else {
				UploadOutcome::Created
			}
		}
		Err(e) => {
			events.error(format!("  Upload of '{}' failed ({}): {}", repo_path, e.class(), e));
			UploadOutcome::Failed(e)
		}
	}
}

/// Current revision at `repo_path`, if any.
///
/// This lookup is best-effort on purpose: not-found means a create, and
/// any other failure is also treated as "no existing revision". A stale
/// or missing revision makes the following write fail with a conflict
/// status rather than corrupt anything.
async fn lookup_revision(api: &dyn ContentApi, repo_path: &str) -> Option<String> {
	match api.get_content(repo_path).await {
		Ok(ContentRecord::File(record)) => Some(record.revision),
		Ok(ContentRecord::Directory(_)) => None,
		Err(e) if e.is_not_found() => None,
		Err(e) => {
			debug!("revision lookup for '{}' failed, treating as new: {}", repo_path, e);
			None
		}
	}
}

/// Summary of a confirmed multi-file upload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
	pub uploaded: usize,
	pub failed: usize,
	/// Paths never attempted because the session was cancelled
	pub skipped: usize,
}

/// Upload a confirmed batch, one file at a time.
///
/// The cancel signal is checked before each file, so cancelling mid-batch
/// stops the remaining uploads.
pub async fn upload_batch(ctx: &SyncContext, cancel: &CancelSignal, paths: &[PathBuf]) -> BatchReport {
	let mut report = BatchReport::default();
	ctx.events.info(format!("Uploading {} files...", paths.len()));

	for (idx, path) in paths.iter().enumerate() {
		if cancel.is_cancelled() {
			ctx.events.warn("Batch upload cancelled");
			report.skipped = paths.len() - idx;
			return report;
		}
		match ctx.upload(path).await {
			Some(outcome) if outcome.is_success() => report.uploaded += 1,
			_ => report.failed += 1,
		}
	}

	ctx.events.info(format!(
		"Batch upload finished: {} uploaded, {} failed",
		report.uploaded, report.failed
	));
	report
}

// vim: ts=4
