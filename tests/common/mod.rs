//! Shared test helpers: an in-memory content store and session fixtures
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use repomirror::api::types::decode_content;
use repomirror::api::{ApiResult, ContentApi, DeleteContent, PutContent, TreeEntry, TreeResponse};
use repomirror::cancel::CancelSignal;
use repomirror::context::SyncContext;
use repomirror::events::{self, EventReceiver};
use repomirror::types::{ContentRecord, RemoteFileRecord, WriteResult};
use repomirror::{ApiError, RepositoryTarget, SyncEvent};

pub const RECYCLE: &str = "recycle";

/// Injectable failure for one endpoint
#[derive(Debug, Clone, Copy)]
pub enum Failure {
	Transport,
	NotFound,
	Status(u16),
}

impl Failure {
	fn to_error(self, path: &str) -> ApiError {
		match self {
			Failure::Transport => ApiError::Transport { message: "connection reset".to_string() },
			Failure::NotFound => ApiError::NotFound { path: path.to_string() },
			Failure::Status(status) => ApiError::Status { status, body: "injected".to_string() },
		}
	}
}

/// Every request the mock received, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
	ListTree,
	Get(String),
	Put { path: String, sha: Option<String>, message: String },
	Delete { path: String, sha: String, message: String },
}

struct StoredFile {
	content: Vec<u8>,
	sha: String,
	inline: bool,
}

#[derive(Default)]
struct MockState {
	files: BTreeMap<String, StoredFile>,
	dirs: BTreeSet<String>,
	calls: Vec<Call>,
	next_sha: u64,
	list_failure: Option<Failure>,
	truncated: bool,
	get_failures: HashMap<String, Failure>,
	put_failures: HashMap<String, Failure>,
	delete_failures: HashMap<String, Failure>,
	cancel_after_puts: Option<(usize, CancelSignal)>,
}

impl MockState {
	fn new_sha(&mut self) -> String {
		self.next_sha += 1;
		format!("sha{}", self.next_sha)
	}

	fn puts(&self) -> usize {
		self.calls.iter().filter(|c| matches!(c, Call::Put { .. })).count()
	}
}

/// In-memory content store with GitHub-like revision checks
#[derive(Default)]
pub struct MockContentApi {
	state: Mutex<MockState>,
}

impl MockContentApi {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_file(self, path: &str, content: &[u8]) -> Self {
		self.insert(path, content);
		self
	}

	pub fn insert(&self, path: &str, content: &[u8]) {
		let mut state = self.state.lock().unwrap();
		let sha = state.new_sha();
		state.files.insert(path.to_string(), StoredFile { content: content.to_vec(), sha, inline: true });
	}

	pub fn with_dir(self, path: &str) -> Self {
		self.state.lock().unwrap().dirs.insert(path.to_string());
		self
	}

	/// Lookups of `path` come back without inline content
	pub fn without_inline_content(self, path: &str) -> Self {
		if let Some(file) = self.state.lock().unwrap().files.get_mut(path) {
			file.inline = false;
		}
		self
	}

	pub fn fail_list(self, failure: Failure) -> Self {
		self.state.lock().unwrap().list_failure = Some(failure);
		self
	}

	/// Listings come back flagged as cut short
	pub fn with_truncated_listing(self) -> Self {
		self.state.lock().unwrap().truncated = true;
		self
	}

	pub fn fail_get(self, path: &str, failure: Failure) -> Self {
		self.state.lock().unwrap().get_failures.insert(path.to_string(), failure);
		self
	}

	pub fn fail_put(self, path: &str, failure: Failure) -> Self {
		self.state.lock().unwrap().put_failures.insert(path.to_string(), failure);
		self
	}

	pub fn fail_delete(self, path: &str, failure: Failure) -> Self {
		self.state.lock().unwrap().delete_failures.insert(path.to_string(), failure);
		self
	}

	/// Cancel `signal` right after the `n`th successful or failed put
	pub fn cancel_after_puts(self, n: usize, signal: CancelSignal) -> Self {
		self.state.lock().unwrap().cancel_after_puts = Some((n, signal));
		self
	}

	pub fn calls(&self) -> Vec<Call> {
		self.state.lock().unwrap().calls.clone()
	}

	pub fn put_paths(&self) -> Vec<String> {
		self.calls()
			.into_iter()
			.filter_map(|c| match c {
				Call::Put { path, .. } => Some(path),
				_ => None,
			})
			.collect()
	}

	pub fn delete_paths(&self) -> Vec<String> {
		self.calls()
			.into_iter()
			.filter_map(|c| match c {
				Call::Delete { path, .. } => Some(path),
				_ => None,
			})
			.collect()
	}

	pub fn content(&self, path: &str) -> Option<Vec<u8>> {
		self.state.lock().unwrap().files.get(path).map(|f| f.content.clone())
	}

	pub fn sha(&self, path: &str) -> Option<String> {
		self.state.lock().unwrap().files.get(path).map(|f| f.sha.clone())
	}

	pub fn paths(&self) -> Vec<String> {
		self.state.lock().unwrap().files.keys().cloned().collect()
	}

	/// Stored paths under the recycle prefix
	pub fn recycled(&self) -> Vec<String> {
		let prefix = format!("{}/", RECYCLE);
		self.paths().into_iter().filter(|p| p.starts_with(&prefix)).collect()
	}
}

#[async_trait]
impl ContentApi for MockContentApi {
	async fn list_tree(&self) -> ApiResult<TreeResponse> {
		let mut state = self.state.lock().unwrap();
		state.calls.push(Call::ListTree);
		if let Some(failure) = state.list_failure {
			return Err(failure.to_error("main"));
		}
		let mut entries: Vec<TreeEntry> =
			state.dirs.iter().map(|d| TreeEntry { path: d.clone(), kind: "tree".to_string() }).collect();
		entries.extend(state.files.keys().map(|p| TreeEntry::blob(p)));
		Ok(TreeResponse { tree: entries, truncated: state.truncated })
	}

	async fn get_content(&self, path: &str) -> ApiResult<ContentRecord> {
		let mut state = self.state.lock().unwrap();
		state.calls.push(Call::Get(path.to_string()));
		if let Some(failure) = state.get_failures.get(path) {
			return Err(failure.to_error(path));
		}
		if state.dirs.contains(path) {
			let prefix = format!("{}/", path);
			let children = state.files.keys().filter(|p| p.starts_with(&prefix)).cloned().collect();
			return Ok(ContentRecord::Directory(children));
		}
		match state.files.get(path) {
			Some(file) => Ok(ContentRecord::File(RemoteFileRecord {
				path: path.to_string(),
				revision: file.sha.clone(),
				size: file.content.len() as u64,
				content: if file.inline { Some(file.content.clone()) } else { None },
			})),
			None => Err(ApiError::NotFound { path: path.to_string() }),
		}
	}

	async fn put_content(&self, path: &str, request: &PutContent) -> ApiResult<WriteResult> {
		let mut state = self.state.lock().unwrap();
		state.calls.push(Call::Put {
			path: path.to_string(),
			sha: request.sha.clone(),
			message: request.message.clone(),
		});
		if let Some((n, signal)) = &state.cancel_after_puts {
			if state.puts() >= *n {
				signal.cancel();
			}
		}
		if let Some(failure) = state.put_failures.get(path) {
			return Err(failure.to_error(path));
		}

		let content = decode_content(&request.content)?;
		let existing = state.files.get(path).map(|f| f.sha.clone());
		let status = match (&existing, &request.sha) {
			(None, None) => 201,
			(Some(current), Some(given)) if current == given => 200,
			(Some(_), None) => {
				return Err(ApiError::Status { status: 422, body: "sha wasn't supplied".to_string() })
			}
			_ => return Err(ApiError::Status { status: 409, body: "sha mismatch".to_string() }),
		};

		let sha = state.new_sha();
		state.files.insert(path.to_string(), StoredFile { content, sha: sha.clone(), inline: true });
		Ok(WriteResult { status, revision: Some(sha) })
	}

	async fn delete_content(&self, path: &str, request: &DeleteContent) -> ApiResult<()> {
		let mut state = self.state.lock().unwrap();
		state.calls.push(Call::Delete {
			path: path.to_string(),
			sha: request.sha.clone(),
			message: request.message.clone(),
		});
		if let Some(failure) = state.delete_failures.get(path) {
			return Err(failure.to_error(path));
		}
		match state.files.get(path) {
			None => Err(ApiError::NotFound { path: path.to_string() }),
			Some(file) if file.sha != request.sha => {
				Err(ApiError::Status { status: 409, body: "sha mismatch".to_string() })
			}
			Some(_) => {
				state.files.remove(path);
				Ok(())
			}
		}
	}
}

// ===================================================================
// FIXTURES
// ===================================================================

pub fn target(root: &Path) -> RepositoryTarget {
	RepositoryTarget {
		auth_token: "test-token".to_string(),
		owner: "alice".to_string(),
		repo: "notes".to_string(),
		branch: "main".to_string(),
		local_root: root.to_path_buf(),
	}
}

pub fn context(api: Arc<MockContentApi>, root: &Path) -> (SyncContext, EventReceiver) {
	let (sink, receiver) = events::channel();
	(SyncContext::new(api, sink, &target(root), RECYCLE), receiver)
}

/// Write a file below `root`, creating parent folders
pub fn write_file(root: &Path, rel: &str, content: &str) -> PathBuf {
	let path = root.join(rel);
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent).unwrap();
	}
	fs::write(&path, content).unwrap();
	path
}

pub fn log_lines(events: &[SyncEvent]) -> Vec<String> {
	events
		.iter()
		.filter_map(|e| match e {
			SyncEvent::Log(line) => Some(line.clone()),
			_ => None,
		})
		.collect()
}

/// Receive events until one matches `pred`, failing after `timeout`
pub async fn wait_for<F>(rx: &mut EventReceiver, timeout: Duration, pred: F) -> Vec<SyncEvent>
where
	F: Fn(&SyncEvent) -> bool,
{
	let mut seen = Vec::new();
	let deadline = tokio::time::Instant::now() + timeout;
	loop {
		match tokio::time::timeout_at(deadline, rx.recv()).await {
			Ok(Some(event)) => {
				let done = pred(&event);
				seen.push(event);
				if done {
					return seen;
				}
			}
			Ok(None) => panic!("event channel closed; seen {:?}", seen),
			Err(_) => panic!("timed out waiting for event; seen {:?}", seen),
		}
	}
}

pub fn is_log_containing(event: &SyncEvent, needle: &str) -> bool {
	matches!(event, SyncEvent::Log(line) if line.contains(needle))
}

// vim: ts=4
