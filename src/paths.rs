//! Conversions between local filesystem paths and repo-relative paths
//!
//! Repo paths are always forward-slash separated and relative to the
//! repository root, matching what the remote tree listing returns. Set
//! comparison between local and remote trees only works if both sides go
//! through these helpers.

use std::path::{Component, Path, PathBuf};

/// Convert an absolute local path under `root` into a repo path.
///
/// Returns `None` when the path is outside the root, is the root itself,
/// or contains anything but plain name components.
pub fn to_repo_path(root: &Path, path: &Path) -> Option<String> {
	let relative = path.strip_prefix(root).ok()?;
	let mut parts = Vec::new();
	for component in relative.components() {
		match component {
			Component::Normal(name) => parts.push(name.to_str()?.to_string()),
			Component::CurDir => {}
			_ => return None,
		}
	}
	if parts.is_empty() {
		return None;
	}
	Some(parts.join("/"))
}

/// Local path for a repo path under `root`
pub fn to_local_path(root: &Path, repo_path: &str) -> PathBuf {
	let mut local = root.to_path_buf();
	for part in repo_path.split('/').filter(|p| !p.is_empty()) {
		local.push(part);
	}
	local
}

/// Strip leading/trailing slashes from a configured prefix
pub fn normalize_prefix(prefix: &str) -> &str {
	prefix.trim_matches('/')
}

/// True if `repo_path` is inside the recycle area
pub fn is_recycled(repo_path: &str, recycle_prefix: &str) -> bool {
	let prefix = normalize_prefix(recycle_prefix);
	if prefix.is_empty() {
		return false;
	}
	repo_path == prefix
		|| (repo_path.starts_with(prefix) && repo_path[prefix.len()..].starts_with('/'))
}

/// Final path component for display
pub fn base_name(path: &Path) -> String {
	path.file_name()
		.map(|n| n.to_string_lossy().into_owned())
		.unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_to_repo_path_nested() {
		let root = Path::new("/home/user/sync");
		assert_eq!(
			to_repo_path(root, Path::new("/home/user/sync/dir/sub/file.txt")),
			Some("dir/sub/file.txt".to_string())
		);
	}

	#[test]
	fn test_to_repo_path_outside_root() {
		let root = Path::new("/home/user/sync");
		assert_eq!(to_repo_path(root, Path::new("/home/user/other/file.txt")), None);
		assert_eq!(to_repo_path(root, root), None);
	}

	#[test]
	fn test_to_repo_path_rejects_parent_refs() {
		let root = Path::new("/home/user/sync");
		assert_eq!(to_repo_path(root, Path::new("/home/user/sync/../etc/passwd")), None);
	}

	#[test]
	fn test_to_local_path_roundtrip() {
		let root = Path::new("/data/root");
		let local = to_local_path(root, "notes/todo.txt");
		assert_eq!(local, Path::new("/data/root").join("notes").join("todo.txt"));
		assert_eq!(to_repo_path(root, &local), Some("notes/todo.txt".to_string()));
	}

	#[test]
	fn test_is_recycled() {
		assert!(is_recycled("recycle/a_20240101120000.txt", "recycle"));
		assert!(is_recycled("recycle/a.txt", "/recycle/"));
		assert!(is_recycled("recycle", "recycle"));
		assert!(!is_recycled("recycled.txt", "recycle"));
		assert!(!is_recycled("docs/recycle/a.txt", "recycle"));
		assert!(!is_recycled("anything", ""));
	}

	#[test]
	fn test_base_name() {
		assert_eq!(base_name(Path::new("/a/b/c.txt")), "c.txt");
	}
}

// vim: ts=4
