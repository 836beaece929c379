//! Error types for RepoMirror operations

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Session-level errors. Any of these aborts the sync session before or
/// instead of mutating the remote store.
#[derive(Debug)]
pub enum SyncError {
	/// Remote tree enumeration failed (anything but not-found)
	RemoteListing(ApiError),

	/// Local root is missing or not a directory
	InvalidRoot { path: PathBuf },

	/// Local tree could not be walked
	LocalIo { path: PathBuf, source: io::Error },

	/// Filesystem watcher could not be started
	Watch { message: String },

	/// Configuration is incomplete or unreadable
	Config(ConfigError),

	/// The background session task died
	Internal { message: String },
}

impl fmt::Display for SyncError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SyncError::RemoteListing(e) => {
				write!(f, "Remote listing failed ({}): {}", e.class(), e)
			}
			SyncError::InvalidRoot { path } => {
				write!(f, "'{}' is not a valid directory", path.display())
			}
			SyncError::LocalIo { path, source } => {
				write!(f, "Cannot read '{}': {}", path.display(), source)
			}
			SyncError::Watch { message } => write!(f, "Cannot watch folder: {}", message),
			SyncError::Config(e) => write!(f, "Configuration error: {}", e),
			SyncError::Internal { message } => write!(f, "Internal error: {}", message),
		}
	}
}

impl Error for SyncError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			SyncError::RemoteListing(e) => Some(e),
			SyncError::LocalIo { source, .. } => Some(source),
			SyncError::Config(e) => Some(e),
			_ => None,
		}
	}
}

impl From<ConfigError> for SyncError {
	fn from(e: ConfigError) -> Self {
		SyncError::Config(e)
	}
}

impl From<notify::Error> for SyncError {
	fn from(e: notify::Error) -> Self {
		SyncError::Watch { message: e.to_string() }
	}
}

/// Content API errors
#[derive(Debug)]
pub enum ApiError {
	/// Connection-level failure (DNS, TLS, reset, timeout)
	Transport { message: String },

	/// The store has no record at the requested path (or no such branch)
	NotFound { path: String },

	/// The store rejected the request (stale revision, permissions, ...)
	Status { status: u16, body: String },

	/// Response body did not have the shape expected for the endpoint
	UnexpectedResponse { endpoint: &'static str, message: String },

	/// Content payload was not valid base64
	Encoding { message: String },
}

impl ApiError {
	/// True for the not-found condition, which several callers treat as a normal state
	pub fn is_not_found(&self) -> bool {
		matches!(self, ApiError::NotFound { .. })
	}

	/// Short failure class used in user-facing log lines
	pub fn class(&self) -> &'static str {
		match self {
			ApiError::Transport { .. } => "network error",
			ApiError::NotFound { .. } => "not found",
			ApiError::Status { status: 409, .. } | ApiError::Status { status: 422, .. } => {
				"conflict"
			}
			ApiError::Status { .. } => "rejected",
			ApiError::UnexpectedResponse { .. } => "unexpected response",
			ApiError::Encoding { .. } => "encoding error",
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiError::Transport { message } => write!(f, "Transport error: {}", message),
			ApiError::NotFound { path } => write!(f, "Not found: {}", path),
			ApiError::Status { status, body } => {
				if body.is_empty() {
					write!(f, "HTTP status {}", status)
				} else {
					write!(f, "HTTP status {}: {}", status, body)
				}
			}
			ApiError::UnexpectedResponse { endpoint, message } => {
				write!(f, "Unexpected {} response: {}", endpoint, message)
			}
			ApiError::Encoding { message } => write!(f, "Content encoding error: {}", message),
		}
	}
}

impl Error for ApiError {}

impl From<reqwest::Error> for ApiError {
	fn from(e: reqwest::Error) -> Self {
		ApiError::Transport { message: e.to_string() }
	}
}

impl From<base64::DecodeError> for ApiError {
	fn from(e: base64::DecodeError) -> Self {
		ApiError::Encoding { message: e.to_string() }
	}
}

/// Configuration collaborator errors
#[derive(Debug)]
pub enum ConfigError {
	/// A required field is empty
	MissingField { field: &'static str },

	/// A field holds an unusable value
	InvalidValue { field: &'static str, message: String },

	/// Config file could not be parsed
	Parse { path: PathBuf, message: String },

	/// Config file could not be read or written
	Io { path: PathBuf, source: io::Error },

	/// No token stored for the user
	MissingToken { username: String },
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfigError::MissingField { field } => write!(f, "'{}' must be set", field),
			ConfigError::InvalidValue { field, message } => {
				write!(f, "Invalid value for '{}': {}", field, message)
			}
			ConfigError::Parse { path, message } => {
				write!(f, "Cannot parse {}: {}", path.display(), message)
			}
			ConfigError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
			ConfigError::MissingToken { username } => {
				write!(f, "No access token found for user '{}'", username)
			}
		}
	}
}

impl Error for ConfigError {}


// vim: ts=4
