//! Wire shapes of the content API
//!
//! Each endpoint gets a small closed set of result shapes. Anything that
//! does not deserialize into one of them is reported as
//! `ApiError::UnexpectedResponse` instead of being defaulted.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::types::{ContentRecord, RemoteFileRecord};

/// `GET git/trees/{branch}?recursive=1`
#[derive(Debug, Clone, Deserialize)]
pub struct TreeResponse {
	pub tree: Vec<TreeEntry>,
	/// Set by the store when the listing was cut short
	#[serde(default)]
	pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TreeEntry {
	pub path: String,
	#[serde(rename = "type")]
	pub kind: String,
}

impl TreeEntry {
	pub fn blob(path: &str) -> Self {
		TreeEntry { path: path.to_string(), kind: "blob".to_string() }
	}

	pub fn is_blob(&self) -> bool {
		self.kind == "blob"
	}
}

/// `GET contents/{path}`: an object for a file, an array for a folder
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ContentResponse {
	Directory(Vec<DirectoryEntry>),
	File(FileResponse),
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryEntry {
	pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileResponse {
	pub path: String,
	pub sha: String,
	#[serde(default)]
	pub size: u64,
	#[serde(default)]
	pub content: Option<String>,
	#[serde(default)]
	pub encoding: Option<String>,
}

impl ContentResponse {
	pub fn into_record(self) -> Result<ContentRecord, ApiError> {
		match self {
			ContentResponse::Directory(entries) => {
				Ok(ContentRecord::Directory(entries.into_iter().map(|e| e.path).collect()))
			}
			ContentResponse::File(file) => {
				// Large files come back with encoding "none" and no inline content
				let inline = file.encoding.as_deref().map_or(true, |enc| enc == "base64");
				let content = match file.content {
					Some(ref encoded) if inline && !(encoded.is_empty() && file.size > 0) => {
						Some(decode_content(encoded)?)
					}
					_ => None,
				};
				Ok(ContentRecord::File(RemoteFileRecord {
					path: file.path,
					revision: file.sha,
					size: file.size,
					content,
				}))
			}
		}
	}
}

/// `PUT contents/{path}` body. `sha` is present only for updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PutContent {
	pub message: String,
	pub content: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub sha: Option<String>,
}

impl PutContent {
	pub fn new(message: String, bytes: &[u8], sha: Option<String>) -> Self {
		PutContent { message, content: encode_content(bytes), sha }
	}
}

/// `DELETE contents/{path}` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteContent {
	pub message: String,
	pub sha: String,
}

/// Successful `PUT` response; only the new revision is of interest
#[derive(Debug, Clone, Deserialize)]
pub struct WriteResponse {
	#[serde(default)]
	pub content: Option<WrittenContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WrittenContent {
	pub sha: String,
}

pub fn encode_content(bytes: &[u8]) -> String {
	STANDARD.encode(bytes)
}

/// Decode a base64 payload. The store wraps long payloads, so whitespace is dropped first.
pub fn decode_content(encoded: &str) -> Result<Vec<u8>, ApiError> {
	let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
	Ok(STANDARD.decode(compact)?)
}


// vim: ts=4
