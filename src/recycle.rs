//! Soft delete: move a remote file into the recycle area
//!
//! The move is a copy followed by a delete. The delete is only issued
//! after the copy was confirmed, so the original is never removed without
//! a recycled copy. A failed delete after a successful copy leaves the
//! file in both places and is reported as a failure.

use chrono::{DateTime, Local};
use std::path::Path;

use crate::api::{ContentApi, DeleteContent, PutContent};
use crate::error::ApiError;
use crate::events::EventSink;
use crate::paths::normalize_prefix;
use crate::types::ContentRecord;

/// Timestamp format used in recycled file names (second resolution)
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Result of a recycle attempt
#[derive(Debug)]
pub enum RecycleOutcome {
	/// Copied to `destination` and removed from its original path
	Recycled { destination: String },
	/// The path names a folder; only single files are recyclable
	NotApplicable,
	/// Nothing stored at the path
	Absent,
	/// The existing record could not be fetched
	LookupFailed(ApiError),
	/// The store did not return the file's bytes, so no safe copy can be made
	ContentUnavailable,
	/// Writing the recycle copy failed; the original is untouched
	CopyFailed(ApiError),
	/// Copy succeeded but the original could not be removed
	DeleteFailed { destination: String, error: ApiError },
}

impl RecycleOutcome {
	pub fn is_success(&self) -> bool {
		matches!(self, RecycleOutcome::Recycled { .. })
	}

	pub fn is_failure(&self) -> bool {
		matches!(
			self,
			RecycleOutcome::LookupFailed(_)
				| RecycleOutcome::ContentUnavailable
				| RecycleOutcome::CopyFailed(_)
				| RecycleOutcome::DeleteFailed { .. }
		)
	}
}

/// Recycle destination for `repo_path` at `timestamp`.
///
/// `notes/todo.txt` at `20240101120000` becomes `recycle/todo_20240101120000.txt`.
/// Only the extension after the last dot is kept apart; a leading-dot name
/// such as `.env` has no extension.
pub fn recycle_path(repo_path: &str, recycle_prefix: &str, timestamp: &str) -> String {
	let file_name = repo_path.rsplit('/').next().unwrap_or(repo_path);
	let name = Path::new(file_name);
	let stem = name.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
	let recycled = match name.extension() {
		Some(ext) => format!("{}_{}.{}", stem, timestamp, ext.to_string_lossy()),
		None => format!("{}_{}", stem, timestamp),
	};
	format!("{}/{}", normalize_prefix(recycle_prefix), recycled)
}

pub fn copy_message(repo_path: &str) -> String {
	format!("Recycle: Move {}", repo_path)
}

pub fn delete_message(repo_path: &str) -> String {
	format!("Sync: Delete {} (moved to recycle bin)", repo_path)
}

/// Move `repo_path` into the recycle area, stamped with the current local time
pub async fn recycle_file(
	api: &dyn ContentApi,
	events: &EventSink,
	repo_path: &str,
	recycle_prefix: &str,
) -> RecycleOutcome {
	recycle_file_at(api, events, repo_path, recycle_prefix, Local::now()).await
}

/// Move `repo_path` into the recycle area using `now` for the destination name.
///
/// Same-named files recycled twice within one second map to the same
/// destination; the second copy then fails as a conflict and the original
/// stays in place.
pub async fn recycle_file_at(
	api: &dyn ContentApi,
	events: &EventSink,
	repo_path: &str,
	recycle_prefix: &str,
	now: DateTime<Local>,
) -> RecycleOutcome {
	events.info(format!("- Processing (move to recycle bin): {}", repo_path));

	let record = match api.get_content(repo_path).await {
		Ok(ContentRecord::File(record)) => record,
		Ok(ContentRecord::Directory(_)) => {
			events.warn(format!("  '{}' is a folder, skipping", repo_path));
			return RecycleOutcome::NotApplicable;
		}
		Err(e) if e.is_not_found() => {
			events.warn(format!("  '{}' is not on the remote, skipping", repo_path));
			return RecycleOutcome::Absent;
		}
		Err(e) => {
			events.error(format!("  Lookup of '{}' failed ({}): {}", repo_path, e.class(), e));
			return RecycleOutcome::LookupFailed(e);
		}
	};

	let content = match record.content {
		Some(content) => content,
		None => {
			events.error(format!(
				"  '{}' ({} bytes) was returned without content, leaving it in place",
				repo_path, record.size
			));
			return RecycleOutcome::ContentUnavailable;
		}
	};

	let destination = recycle_path(repo_path, recycle_prefix, &now.format(TIMESTAMP_FORMAT).to_string());
	events.info(format!("  Moving to '{}'...", destination));

	// New path, so no revision: this is always a create
	let copy = PutContent::new(copy_message(repo_path), &content, None);
	if let Err(e) = api.put_content(&destination, &copy).await {
		events.error(format!("  Creating recycle copy '{}' failed ({}): {}", destination, e.class(), e));
		return RecycleOutcome::CopyFailed(e);
	}

	let delete = DeleteContent { message: delete_message(repo_path), sha: record.revision };
	match api.delete_content(repo_path, &delete).await {
		Ok(()) => {
			events.info(format!("  Moved '{}' to the recycle bin", repo_path));
			RecycleOutcome::Recycled { destination }
		}
		Err(e) => {
			events.error(format!(
				"  Deleting original '{}' failed ({}): {}; it now also exists at '{}'",
				repo_path,
				e.class(),
				e,
				destination
			));
			RecycleOutcome::DeleteFailed { destination, error: e }
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	#[test]
	fn test_recycle_path_format() {
		assert_eq!(
			recycle_path("notes/todo.txt", "recycle", "20240101120000"),
			"recycle/todo_20240101120000.txt"
		);
	}

	#[test]
	fn test_recycle_path_top_level_and_prefix_slashes() {
		assert_eq!(recycle_path("a.txt", "/recycle/", "1"), "recycle/a_1.txt");
	}

	#[test]
	fn test_recycle_path_extension_edge_cases() {
		assert_eq!(recycle_path("dist/archive.tar.gz", "recycle", "T"), "recycle/archive.tar_T.gz");
		assert_eq!(recycle_path("Makefile", "recycle", "T"), "recycle/Makefile_T");
		assert_eq!(recycle_path("cfg/.env", "recycle", "T"), "recycle/.env_T");
	}

	#[test]
	fn test_timestamp_format() {
		let now = Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
		assert_eq!(now.format(TIMESTAMP_FORMAT).to_string(), "20240101120000");
	}

	#[test]
	fn test_commit_messages() {
		assert_eq!(copy_message("a/b.txt"), "Recycle: Move a/b.txt");
		assert_eq!(delete_message("a/b.txt"), "Sync: Delete a/b.txt (moved to recycle bin)");
	}
}

// vim: ts=4
