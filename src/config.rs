//! Configuration for RepoMirror
//!
//! The configuration follows a priority chain:
//! 1. Built-in defaults (Config::default())
//! 2. Config file (~/.config/repomirror/config.toml or config.json)
//! 3. Environment variables (REPOMIRROR_* prefix)
//! 4. CLI flags (highest priority, applied by the binary)
//!
//! The access token is never part of this struct; it is resolved through
//! [`crate::secrets::SecretStore`] when a session starts.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use crate::error::ConfigError;
use crate::types::RepositoryTarget;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_RECYCLE_DIR: &str = "recycle";
pub const DEFAULT_DEBOUNCE_MS: u64 = 1500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
	// ========================================================================
	// REPOSITORY
	// ========================================================================
	/// Repository owner; also the key for the token in the secret store
	pub owner: String,

	/// Repository name
	pub repo: String,

	/// Branch to mirror into
	pub branch: String,

	/// Local folder to mirror
	pub folder: PathBuf,

	// ========================================================================
	// REMOTE
	// ========================================================================
	/// Content API root
	pub api_base_url: String,

	/// Remote folder that receives soft-deleted files
	pub recycle_dir: String,

	// ========================================================================
	// WATCHING
	// ========================================================================
	/// Quiet period before a burst of changes is flushed (milliseconds)
	pub debounce_ms: u64,

	// ========================================================================
	// OUTPUT
	// ========================================================================
	/// Log level used when RUST_LOG is not set
	pub log_level: String,

	/// UI theme name; stored for the shell, unused by the engine
	pub theme: String,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			owner: String::new(),
			repo: String::new(),
			branch: DEFAULT_BRANCH.to_string(),
			folder: PathBuf::new(),
			api_base_url: DEFAULT_API_URL.to_string(),
			recycle_dir: DEFAULT_RECYCLE_DIR.to_string(),
			debounce_ms: DEFAULT_DEBOUNCE_MS,
			log_level: "info".to_string(),
			theme: "litera".to_string(),
		}
	}
}

impl Config {
	/// Default config directory ($XDG_CONFIG_HOME/repomirror or ~/.config/repomirror)
	pub fn default_dir() -> PathBuf {
		if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
			if !xdg.is_empty() {
				return PathBuf::from(xdg).join("repomirror");
			}
		}
		env::var("HOME")
			.map(|h| PathBuf::from(h).join(".config").join("repomirror"))
			.unwrap_or_else(|_| PathBuf::from(".repomirror"))
	}

	/// First existing default config file, if any
	pub fn default_file() -> Option<PathBuf> {
		let dir = Self::default_dir();
		["config.toml", "config.json"].iter().map(|name| dir.join(name)).find(|p| p.is_file())
	}

	/// Parse a config file; `.json` files are read leniently, everything else as TOML
	pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
		let contents = fs::read_to_string(path)
			.map_err(|e| ConfigError::Io { path: path.to_path_buf(), source: e })?;
		let parse_err = |message: String| ConfigError::Parse { path: path.to_path_buf(), message };

		if path.extension().map_or(false, |ext| ext == "json") {
			json5::from_str(&contents).map_err(|e| parse_err(e.to_string()))
		} else {
			toml::from_str(&contents).map_err(|e| parse_err(e.to_string()))
		}
	}

	/// Defaults, then `path` (or the default file if it exists), then the environment
	pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
		let mut config = match path {
			Some(p) => Self::from_file(p)?,
			None => match Self::default_file() {
				Some(p) => Self::from_file(&p)?,
				None => Config::default(),
			},
		};
		config.apply_env(|key| env::var(key).ok())?;
		Ok(config)
	}

	/// Overlay REPOMIRROR_* variables. `lookup` is injectable for tests.
	pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

		if let Some(v) = get("REPOMIRROR_OWNER") {
			self.owner = v;
		}
		if let Some(v) = get("REPOMIRROR_REPO") {
			self.repo = v;
		}
		if let Some(v) = get("REPOMIRROR_BRANCH") {
			self.branch = v;
		}
		if let Some(v) = get("REPOMIRROR_FOLDER") {
			self.folder = PathBuf::from(v);
		}
		if let Some(v) = get("REPOMIRROR_API_URL") {
			self.api_base_url = v;
		}
		if let Some(v) = get("REPOMIRROR_RECYCLE_DIR") {
			self.recycle_dir = v;
		}
		if let Some(v) = get("REPOMIRROR_DEBOUNCE_MS") {
			self.debounce_ms = v.parse().map_err(|_| ConfigError::InvalidValue {
				field: "debounceMs",
				message: format!("'{}' is not a number of milliseconds", v),
			})?;
		}
		if let Some(v) = get("REPOMIRROR_LOG_LEVEL") {
			self.log_level = v;
		}
		Ok(())
	}

	/// Check that everything a session needs is present
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.owner.trim().is_empty() {
			return Err(ConfigError::MissingField { field: "owner" });
		}
		if self.repo.trim().is_empty() {
			return Err(ConfigError::MissingField { field: "repo" });
		}
		if self.folder.as_os_str().is_empty() {
			return Err(ConfigError::MissingField { field: "folder" });
		}
		if self.branch.trim().is_empty() {
			return Err(ConfigError::MissingField { field: "branch" });
		}
		if crate::paths::normalize_prefix(&self.recycle_dir).is_empty() {
			return Err(ConfigError::InvalidValue {
				field: "recycleDir",
				message: "recycle folder cannot be the repository root".to_string(),
			});
		}
		if self.debounce_ms == 0 {
			return Err(ConfigError::InvalidValue {
				field: "debounceMs",
				message: "must be greater than zero".to_string(),
			});
		}
		Ok(())
	}

	pub fn debounce(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}

	/// Build the immutable session target with a token from the secret store
	pub fn to_target(&self, auth_token: String) -> Result<RepositoryTarget, ConfigError> {
		self.validate()?;
		Ok(RepositoryTarget {
			auth_token,
			owner: self.owner.trim().to_string(),
			repo: self.repo.trim().to_string(),
			branch: self.branch.trim().to_string(),
			local_root: self.folder.clone(),
		})
	}

	/// Persist to `path` (TOML unless the extension is `.json`)
	pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
		let parse_err = |message: String| ConfigError::Parse { path: path.to_path_buf(), message };
		let contents = if path.extension().map_or(false, |ext| ext == "json") {
			serde_json::to_string_pretty(self).map_err(|e| parse_err(e.to_string()))?
		} else {
			toml::to_string_pretty(self).map_err(|e| parse_err(e.to_string()))?
		};

		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.map_err(|e| ConfigError::Io { path: parent.to_path_buf(), source: e })?;
		}
		fs::write(path, contents).map_err(|e| ConfigError::Io { path: path.to_path_buf(), source: e })
	}
}


// vim: ts=4
