//! Filesystem notification source built on `notify`

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::ChangeBatcher;
use crate::error::SyncError;
use crate::logging::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
	Created,
	Modified,
	Removed,
}

/// One mutation of the watched tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsNotification {
	pub kind: NotificationKind,
	pub path: PathBuf,
	pub is_dir: bool,
}

impl FsNotification {
	pub fn file(kind: NotificationKind, path: impl Into<PathBuf>) -> Self {
		FsNotification { kind, path: path.into(), is_dir: false }
	}
}

fn notification(kind: NotificationKind, path: &Path, is_dir: bool) -> FsNotification {
	FsNotification { kind, path: path.to_path_buf(), is_dir }
}

/// Map a raw `notify` event onto creation/modification/removal notifications.
///
/// Renames become a removal of the old path and a creation of the new one.
/// Metadata-only changes and access events are dropped.
pub fn translate_event(event: &Event) -> Vec<FsNotification> {
	use NotificationKind::*;

	let paths = &event.paths;
	match event.kind {
		EventKind::Create(kind) => paths
			.iter()
			.map(|p| notification(Created, p, kind == CreateKind::Folder || p.is_dir()))
			.collect(),
		EventKind::Remove(kind) => {
			paths.iter().map(|p| notification(Removed, p, kind == RemoveKind::Folder)).collect()
		}
		EventKind::Modify(ModifyKind::Name(mode)) => match mode {
			RenameMode::From => paths.iter().map(|p| notification(Removed, p, false)).collect(),
			RenameMode::To => paths.iter().map(|p| notification(Created, p, p.is_dir())).collect(),
			// inotify also reports both halves as From and To; acting on this
			// one too would recycle the old path twice
			RenameMode::Both => Vec::new(),
			_ => paths
				.iter()
				.map(|p| {
					if p.exists() {
						notification(Created, p, p.is_dir())
					} else {
						notification(Removed, p, false)
					}
				})
				.collect(),
		},
		EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
		EventKind::Modify(_) => paths.iter().map(|p| notification(Modified, p, p.is_dir())).collect(),
		_ => Vec::new(),
	}
}

/// Recursive watch on a folder, feeding a [`ChangeBatcher`].
///
/// `notify` delivers on its own thread; notifications are forwarded over a
/// channel to a tokio task that owns the batcher calls.
pub struct FolderWatcher {
	watcher: RecommendedWatcher,
	root: PathBuf,
	dispatcher: JoinHandle<()>,
}

impl FolderWatcher {
	pub fn start(root: &Path, batcher: ChangeBatcher) -> Result<Self, SyncError> {
		let (tx, mut rx) = mpsc::unbounded_channel::<FsNotification>();

		let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
			Ok(event) => {
				for n in translate_event(&event) {
					if tx.send(n).is_err() {
						return;
					}
				}
			}
			Err(e) => warn!("file watcher error: {}", e),
		})?;
		watcher.watch(root, RecursiveMode::Recursive)?;

		let dispatcher = tokio::spawn(async move {
			while let Some(n) = rx.recv().await {
				batcher.handle(n);
			}
		});

		debug!("watching {}", root.display());
		Ok(FolderWatcher { watcher, root: root.to_path_buf(), dispatcher })
	}

	/// Release the subscription; queued notifications are discarded
	pub fn stop(mut self) {
		if let Err(e) = self.watcher.unwatch(&self.root) {
			debug!("unwatch {}: {}", self.root.display(), e);
		}
		self.dispatcher.abort();
		debug!("stopped watching {}", self.root.display());
	}
}


// vim: ts=4
