//! Shared handles for one sync session

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::api::ContentApi;
use crate::events::EventSink;
use crate::paths::{is_recycled, to_repo_path};
use crate::recycle::{self, RecycleOutcome};
use crate::types::RepositoryTarget;
use crate::upload::{self, UploadOutcome};

/// Everything an upload or recycle needs, cheap to clone into tasks
#[derive(Clone)]
pub struct SyncContext {
	pub api: Arc<dyn ContentApi>,
	pub events: EventSink,
	pub local_root: PathBuf,
	pub recycle_prefix: String,
}

impl SyncContext {
	pub fn new(
		api: Arc<dyn ContentApi>,
		events: EventSink,
		target: &RepositoryTarget,
		recycle_prefix: &str,
	) -> Self {
		SyncContext {
			api,
			events,
			local_root: target.local_root.clone(),
			recycle_prefix: recycle_prefix.to_string(),
		}
	}

	/// Repo path for a local path, unless it lies outside the root or in the recycle area
	pub fn repo_path_for(&self, local_path: &Path) -> Option<String> {
		to_repo_path(&self.local_root, local_path).filter(|p| !is_recycled(p, &self.recycle_prefix))
	}

	/// Upload an absolute local path. `None` if the path is not syncable.
	pub async fn upload(&self, local_path: &Path) -> Option<UploadOutcome> {
		let repo_path = match self.repo_path_for(local_path) {
			Some(p) => p,
			None => {
				self.events.warn(format!("Ignoring '{}': not inside the synced folder", local_path.display()));
				return None;
			}
		};
		Some(upload::upload_file(self.api.as_ref(), &self.events, local_path, &repo_path).await)
	}

	/// Upload a repo path from under the local root
	pub async fn upload_repo_path(&self, repo_path: &str) -> UploadOutcome {
		let local_path = crate::paths::to_local_path(&self.local_root, repo_path);
		upload::upload_file(self.api.as_ref(), &self.events, &local_path, repo_path).await
	}

	/// Recycle the remote counterpart of a repo path
	pub async fn recycle(&self, repo_path: &str) -> RecycleOutcome {
		recycle::recycle_file(self.api.as_ref(), &self.events, repo_path, &self.recycle_prefix).await
	}
}

// vim: ts=4
