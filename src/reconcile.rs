//! Existence-based reconciliation of the remote and local trees
//!
//! Paths present on both sides are left alone even if their content
//! differs; content changes are only picked up by the live watcher.

use crate::types::FileSet;

/// Mutations needed to make the remote tree match the local one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
	/// Local-only paths
	pub uploads: FileSet,
	/// Remote-only paths, to be moved into the recycle area
	pub recycles: FileSet,
}

impl SyncPlan {
	pub fn is_empty(&self) -> bool {
		self.uploads.is_empty() && self.recycles.is_empty()
	}

	pub fn len(&self) -> usize {
		self.uploads.len() + self.recycles.len()
	}
}

/// Compute the symmetric difference of the two trees
pub fn reconcile(remote: &FileSet, local: &FileSet) -> SyncPlan {
	SyncPlan {
		uploads: local.difference(remote).cloned().collect(),
		recycles: remote.difference(local).cloned().collect(),
	}
}


// vim: ts=4
