//! Secret store collaborator: resolves a user's access token at session start

use std::collections::HashMap;
use std::env;

use crate::error::ConfigError;

/// Source of access tokens keyed by username
pub trait SecretStore: Send + Sync {
	/// Token for `username`, or `None` if nothing is stored
	fn token_for(&self, username: &str) -> Result<Option<String>, ConfigError>;

	/// Like `token_for`, but a missing token is an error
	fn require_token(&self, username: &str) -> Result<String, ConfigError> {
		self.token_for(username)?
			.ok_or_else(|| ConfigError::MissingToken { username: username.to_string() })
	}
}

/// Reads `REPOMIRROR_TOKEN`, falling back to `GITHUB_TOKEN`
pub struct EnvSecretStore;

impl SecretStore for EnvSecretStore {
	fn token_for(&self, _username: &str) -> Result<Option<String>, ConfigError> {
		Ok(["REPOMIRROR_TOKEN", "GITHUB_TOKEN"]
			.iter()
			.filter_map(|key| env::var(key).ok())
			.find(|v| !v.trim().is_empty()))
	}
}

/// In-memory store for embedders that manage tokens themselves
#[derive(Debug, Default, Clone)]
pub struct StaticSecretStore {
	tokens: HashMap<String, String>,
}

impl StaticSecretStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_token(mut self, username: &str, token: &str) -> Self {
		self.tokens.insert(username.to_string(), token.to_string());
		self
	}
}

impl SecretStore for StaticSecretStore {
	fn token_for(&self, username: &str) -> Result<Option<String>, ConfigError> {
		Ok(self.tokens.get(username).cloned())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_static_store() {
		let store = StaticSecretStore::new().with_token("alice", "t0k");
		assert_eq!(store.require_token("alice").unwrap(), "t0k");
		assert!(matches!(store.require_token("bob"), Err(ConfigError::MissingToken { .. })));
	}
}

// vim: ts=4
