//! Content API trait
//!
//! The sync engine depends only on this trait, never on the HTTP client,
//! so every component can be exercised against an in-memory store.

use async_trait::async_trait;

use super::types::{DeleteContent, PutContent, TreeResponse};
use crate::error::ApiError;
use crate::types::{ContentRecord, WriteResult};

/// Result type for content API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Operations against one repository branch of the remote store
#[async_trait]
pub trait ContentApi: Send + Sync {
	/// Recursive listing of the branch head, flagged when the store cut it short.
	/// `ApiError::NotFound` when the repository or branch does not exist.
	async fn list_tree(&self) -> ApiResult<TreeResponse>;

	/// Fetch the record stored at `path`.
	/// `ApiError::NotFound` when nothing is stored there.
	async fn get_content(&self, path: &str) -> ApiResult<ContentRecord>;

	/// Create or update the file at `path`. Only 200/201 count as success.
	async fn put_content(&self, path: &str, request: &PutContent) -> ApiResult<WriteResult>;

	/// Delete the file at `path`. Only 200 counts as success.
	async fn delete_content(&self, path: &str, request: &DeleteContent) -> ApiResult<()>;
}

// vim: ts=4
