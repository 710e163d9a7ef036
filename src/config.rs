//! Workspace SFTP configuration
//!
//! The configuration lives in a JSON file inside the workspace. It is looked up in
//! this order and the first existing file wins:
//! 1. `<workspace>/.zed/sftp.json`
//! 2. `<workspace>/.vscode/sftp.json` (compatibility with the VS Code extension)
//! 3. `<workspace>/sftp.json`
//!
//! Saving always writes `.zed/sftp.json`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Candidate config locations relative to the workspace root, in lookup order
pub const CONFIG_CANDIDATES: [&str; 3] = [".zed/sftp.json", ".vscode/sftp.json", "sftp.json"];

/// Directory the config is saved into
pub const CANONICAL_CONFIG_DIR: &str = ".zed";

/// File name of the config
pub const CONFIG_FILE_NAME: &str = "sftp.json";

/// Port used when the config has none
pub const DEFAULT_PORT: u16 = 22;

/// Parallel file transfers inside a folder operation
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Patterns that are always part of the ignore set
pub const DEFAULT_IGNORE: [&str; 2] = [".git", "node_modules"];

// ============================================================================
// MAIN CONFIGURATION STRUCT
// ============================================================================

/// Per-workspace SFTP configuration as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct SftpConfig {
	// ========================================================================
	// IDENTITY & CONNECTION
	// ========================================================================
	/// Display name
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,

	/// Transfer protocol
	pub protocol: Protocol,

	/// Remote host name or address
	pub host: String,

	/// Remote port (22 when absent)
	#[serde(skip_serializing_if = "Option::is_none")]
	pub port: Option<u16>,

	/// Login user
	pub username: String,

	/// Password credential
	#[serde(skip_serializing_if = "Option::is_none")]
	pub password: Option<String>,

	/// Private key credential; a leading `~` expands to the home directory
	#[serde(skip_serializing_if = "Option::is_none")]
	pub private_key_path: Option<String>,

	/// Passphrase for the private key
	#[serde(skip_serializing_if = "Option::is_none")]
	pub passphrase: Option<String>,

	// ========================================================================
	// PATH MAPPING
	// ========================================================================
	/// Remote root directory
	pub remote_path: String,

	/// Local root (defaults to the workspace root at load time)
	#[serde(skip_serializing_if = "Option::is_none")]
	pub local_path: Option<String>,

	/// Workspace subdirectory used as the effective local root, e.g. "site/wp-content/"
	#[serde(skip_serializing_if = "Option::is_none")]
	pub context: Option<String>,

	// ========================================================================
	// BEHAVIOR
	// ========================================================================
	/// Upload a document when the editor saves it
	#[serde(skip_serializing_if = "Option::is_none")]
	pub upload_on_save: Option<bool>,

	/// Download a document when the editor opens it
	#[serde(skip_serializing_if = "Option::is_none")]
	pub download_on_open: Option<bool>,

	/// Glob patterns excluded from sync
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ignore: Option<Vec<String>>,

	/// Parallel file transfers in folder operations
	#[serde(skip_serializing_if = "Option::is_none")]
	pub concurrency: Option<usize>,

	/// Connect timeout in milliseconds
	#[serde(skip_serializing_if = "Option::is_none")]
	pub connect_timeout: Option<u64>,

	/// Keepalive interval in milliseconds
	#[serde(skip_serializing_if = "Option::is_none")]
	pub keepalive: Option<u64>,

	/// Allow keyboard-interactive authentication
	#[serde(skip_serializing_if = "Option::is_none")]
	pub interactive_auth: Option<bool>,

	/// Algorithm preferences for the SSH handshake
	#[serde(skip_serializing_if = "Option::is_none")]
	pub algorithms: Option<Algorithms>,

	/// File watcher settings
	#[serde(skip_serializing_if = "Option::is_none")]
	pub watcher: Option<WatcherConfig>,

	// ========================================================================
	// PROFILES
	// ========================================================================
	/// Named partial overlays
	#[serde(skip_serializing_if = "Option::is_none")]
	pub profiles: Option<BTreeMap<String, ProfileOverlay>>,

	/// Profile merged over the base config at load time
	#[serde(skip_serializing_if = "Option::is_none")]
	pub default_profile: Option<String>,
}

impl SftpConfig {
	/// Port to connect to
	pub fn effective_port(&self) -> u16 {
		self.port.unwrap_or(DEFAULT_PORT)
	}

	/// Parallelism for folder transfers, never zero
	pub fn effective_concurrency(&self) -> usize {
		self.concurrency.filter(|c| *c > 0).unwrap_or(DEFAULT_CONCURRENCY)
	}

	pub fn upload_on_save(&self) -> bool {
		self.upload_on_save.unwrap_or(false)
	}

	pub fn download_on_open(&self) -> bool {
		self.download_on_open.unwrap_or(false)
	}

	/// The overlay selected by `defaultProfile`, if both it and `profiles` are set
	pub fn selected_profile(&self) -> Option<(&str, Option<&ProfileOverlay>)> {
		let name = self.default_profile.as_deref()?;
		let profiles = self.profiles.as_ref()?;
		Some((name, profiles.get(name)))
	}

	/// Merge a profile over this config.
	///
	/// Every field present in the profile replaces the base value, including
	/// `false` and `0`. Fields absent from the profile are left untouched.
	pub fn apply_profile(&mut self, profile: &ProfileOverlay) {
		if let Some(v) = &profile.name {
			self.name = Some(v.clone());
		}
		if let Some(v) = profile.protocol {
			self.protocol = v;
		}
		if let Some(v) = &profile.host {
			self.host = v.clone();
		}
		if let Some(v) = profile.port {
			self.port = Some(v);
		}
		if let Some(v) = &profile.username {
			self.username = v.clone();
		}
		if let Some(v) = &profile.password {
			self.password = Some(v.clone());
		}
		if let Some(v) = &profile.private_key_path {
			self.private_key_path = Some(v.clone());
		}
		if let Some(v) = &profile.passphrase {
			self.passphrase = Some(v.clone());
		}
		if let Some(v) = &profile.remote_path {
			self.remote_path = v.clone();
		}
		if let Some(v) = &profile.local_path {
			self.local_path = Some(v.clone());
		}
		if let Some(v) = &profile.context {
			self.context = Some(v.clone());
		}
		if let Some(v) = profile.upload_on_save {
			self.upload_on_save = Some(v);
		}
		if let Some(v) = profile.download_on_open {
			self.download_on_open = Some(v);
		}
		if let Some(v) = &profile.ignore {
			self.ignore = Some(v.clone());
		}
		if let Some(v) = profile.concurrency {
			self.concurrency = Some(v);
		}
		if let Some(v) = profile.connect_timeout {
			self.connect_timeout = Some(v);
		}
		if let Some(v) = profile.keepalive {
			self.keepalive = Some(v);
		}
		if let Some(v) = profile.interactive_auth {
			self.interactive_auth = Some(v);
		}
		if let Some(v) = &profile.algorithms {
			self.algorithms = Some(v.clone());
		}
		if let Some(v) = &profile.watcher {
			self.watcher = Some(v.clone());
		}
	}

	/// Read and parse a config file without validating it
	pub fn from_file(path: &Path) -> Result<Self, crate::error::ConfigError> {
		let content = std::fs::read_to_string(path).map_err(|source| {
			crate::error::ConfigError::Read { path: path.to_path_buf(), source }
		})?;
		serde_json::from_str(&content).map_err(|source| crate::error::ConfigError::Parse {
			path: path.to_path_buf(),
			source,
		})
	}
}

/// Return the first existing config file under `workspace_root`
pub fn find_config_file(workspace_root: &Path) -> Option<PathBuf> {
	CONFIG_CANDIDATES.iter().map(|rel| workspace_root.join(rel)).find(|p| p.is_file())
}

/// Path the config is saved to
pub fn canonical_config_path(workspace_root: &Path) -> PathBuf {
	workspace_root.join(CANONICAL_CONFIG_DIR).join(CONFIG_FILE_NAME)
}

// ============================================================================
// NESTED CONFIGURATION STRUCTS
// ============================================================================

/// Partial config merged over the base by [`SftpConfig::apply_profile`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileOverlay {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub protocol: Option<Protocol>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub host: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub port: Option<u16>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub password: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub private_key_path: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub passphrase: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub remote_path: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub local_path: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub context: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub upload_on_save: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub download_on_open: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ignore: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub concurrency: Option<usize>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub connect_timeout: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub keepalive: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub interactive_auth: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub algorithms: Option<Algorithms>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub watcher: Option<WatcherConfig>,
}

/// SSH algorithm preferences. Each list restricts and orders what is offered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Algorithms {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub kex: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub cipher: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub server_host_key: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub hmac: Option<Vec<String>>,
}

/// File watcher settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct WatcherConfig {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub files: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub auto_upload: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub auto_delete: Option<bool>,
}

// ============================================================================
// ENUMERATIONS
// ============================================================================

/// Transfer protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
	#[default]
	Sftp,
	Ftp,
	Ftps,
}

impl std::fmt::Display for Protocol {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Protocol::Sftp => f.write_str("sftp"),
			Protocol::Ftp => f.write_str("ftp"),
			Protocol::Ftps => f.write_str("ftps"),
		}
	}
}


// vim: ts=4
