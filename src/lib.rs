//! # RepoMirror - One-way Folder Mirror into a Hosted Git Repository
//!
//! RepoMirror keeps a remote repository branch in line with a local folder.
//! A session first reconciles both trees (uploading local files, moving
//! remote-only files into a recycle folder), then watches the folder and
//! pushes changes through a debounced batcher.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use repomirror::api::HttpContentApi;
//! use repomirror::session::{self, SessionOptions};
//! use repomirror::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(None)?;
//!     let target = config.to_target(std::env::var("GITHUB_TOKEN")?)?;
//!     let api = Arc::new(HttpContentApi::new(&config.api_base_url, &target)?);
//!
//!     let (handle, mut events) = session::start(api, &target, SessionOptions::from_config(&config));
//!     while let Some(event) = events.recv().await {
//!         println!("{:?}", event);
//!     }
//!     handle.wait().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Dry Run
//!
//! ```rust,ignore
//! let plan = repomirror::session::plan(&ctx).await?;
//! println!("{} uploads, {} recycles", plan.uploads.len(), plan.recycles.len());
//! ```

pub mod api;
pub mod cancel;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod logging;
pub mod paths;
pub mod reconcile;
pub mod recycle;
pub mod remote;
pub mod scan;
pub mod secrets;
pub mod session;
pub mod types;
pub mod upload;
pub mod watcher;

// Re-export commonly used types and functions
pub use config::Config;
pub use error::{ApiError, ConfigError, SyncError};
pub use events::{EventReceiver, EventSink, SyncEvent};
pub use session::{SessionHandle, SessionOptions, SessionOutcome};
pub use types::{ContentRecord, FileSet, RemoteFileRecord, RepositoryTarget};

// vim: ts=4
