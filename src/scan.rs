//! Local tree enumeration

use std::path::Path;
use walkdir::WalkDir;

use crate::error::SyncError;
use crate::logging::*;
use crate::paths::{is_recycled, to_repo_path};
use crate::types::FileSet;

/// Walk `root` and return every regular file as a repo path.
///
/// Directories are not listed. Anything under the recycle prefix is
/// skipped so a local folder with that name never feeds the recycle area.
pub fn scan_local_files(root: &Path, recycle_prefix: &str) -> Result<FileSet, SyncError> {
	if !root.is_dir() {
		return Err(SyncError::InvalidRoot { path: root.to_path_buf() });
	}

	let mut files = FileSet::new();
	let walker = WalkDir::new(root).follow_links(false).into_iter().filter_entry(|entry| {
		to_repo_path(root, entry.path()).map_or(true, |p| !is_recycled(&p, recycle_prefix))
	});

	for entry in walker {
		let entry = entry.map_err(|e| {
			let path = e.path().unwrap_or(root).to_path_buf();
			let source = e
				.into_io_error()
				.unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop"));
			SyncError::LocalIo { path, source }
		})?;

		if !entry.file_type().is_file() {
			continue;
		}
		match to_repo_path(root, entry.path()) {
			Some(repo_path) => {
				files.insert(repo_path);
			}
			None => debug!("skipping non UTF-8 path {}", entry.path().display()),
		}
	}

	debug!("found {} local files under {}", files.len(), root.display());
	Ok(files)
}


// vim: ts=4
