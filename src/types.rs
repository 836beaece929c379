//! Core data types shared by the sync engine

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// Set of normalized repo-relative paths (forward-slash separated)
pub type FileSet = BTreeSet<String>;

/// Everything needed to address one remote branch and its local mirror.
///
/// Built once per session from the configuration and the secret store and
/// never mutated afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct RepositoryTarget {
	pub auth_token: String,
	pub owner: String,
	pub repo: String,
	pub branch: String,
	pub local_root: PathBuf,
}

// Keep the token out of logs
impl fmt::Debug for RepositoryTarget {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RepositoryTarget")
			.field("auth_token", &"<redacted>")
			.field("owner", &self.owner)
			.field("repo", &self.repo)
			.field("branch", &self.branch)
			.field("local_root", &self.local_root)
			.finish()
	}
}

/// A single stored file as returned by a content lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileRecord {
	pub path: String,
	/// Revision identifier required to update or delete this exact version
	pub revision: String,
	/// Size reported by the store
	pub size: u64,
	/// Decoded content; `None` when the store did not inline it
	pub content: Option<Vec<u8>>,
}

/// Result of a content lookup at a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentRecord {
	File(RemoteFileRecord),
	/// The path names a folder; carries the child paths
	Directory(Vec<String>),
}

/// Result of a successful create-or-update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
	pub status: u16,
	/// Revision of the newly written content, when reported
	pub revision: Option<String>,
}

impl WriteResult {
	pub fn created(&self) -> bool {
		self.status == 201
	}
}

// vim: ts=4
