//! Remote tree enumeration

use crate::api::ContentApi;
use crate::error::ApiError;
use crate::events::EventSink;
use crate::paths::is_recycled;
use crate::types::FileSet;

/// List every file stored on the target branch, excluding the recycle area.
///
/// A missing repository or branch yields an empty set so a first sync
/// against a brand-new repository can proceed. Every other failure is
/// returned and must abort the session.
pub async fn list_remote_files(
	api: &dyn ContentApi,
	recycle_prefix: &str,
	events: &EventSink,
) -> Result<FileSet, ApiError> {
	let listing = match api.list_tree().await {
		Ok(listing) => listing,
		Err(e) if e.is_not_found() => {
			events.info("Repository or branch not found on the remote (it may be empty)");
			return Ok(FileSet::new());
		}
		// Reported once, by the session that aborts on it
		Err(e) => return Err(e),
	};

	if listing.truncated {
		events.warn(format!(
			"Remote listing was truncated after {} entries; files beyond it are not reconciled",
			listing.tree.len()
		));
	}

	Ok(listing
		.tree
		.into_iter()
		.filter(|entry| entry.is_blob() && !is_recycled(&entry.path, recycle_prefix))
		.map(|entry| entry.path)
		.collect())
}

// vim: ts=4
