//! Remote content store access
//!
//! - `traits`: the [`ContentApi`] seam the engine is written against
//! - `types`: request/response wire shapes
//! - `http`: reqwest-backed implementation

pub mod http;
pub mod traits;
pub mod types;

pub use http::HttpContentApi;
pub use traits::{ApiResult, ContentApi};
pub use types::{DeleteContent, PutContent, TreeEntry, TreeResponse};

// vim: ts=4
