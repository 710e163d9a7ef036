//! Per-workspace session
//!
//! Ties one [`ConfigResolver`] to one [`TransferDispatcher`]. Both the language
//! server and the CLI drive transfers through a session; nothing is global.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::config::SftpConfig;
use crate::error::{ConfigError, SecurityError, SftpError};
use crate::protocol::RemoteFs;
use crate::resolver::{ConfigResolver, ResolvedConfig};
use crate::transfer::{Outcome, TransferDispatcher};

pub struct Session {
	workspace_root: PathBuf,
	resolver: RwLock<ConfigResolver>,
	dispatcher: TransferDispatcher,
}

impl Session {
	/// Session transferring over SFTP
	pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
		Self::with_dispatcher(workspace_root, TransferDispatcher::sftp())
	}

	/// Session over a custom remote file system
	pub fn with_remote(workspace_root: impl Into<PathBuf>, remote: Box<dyn RemoteFs>) -> Self {
		Self::with_dispatcher(workspace_root, TransferDispatcher::new(remote))
	}

	fn with_dispatcher(workspace_root: impl Into<PathBuf>, dispatcher: TransferDispatcher) -> Self {
		let workspace_root = workspace_root.into();
		Self {
			resolver: RwLock::new(ConfigResolver::new(workspace_root.clone())),
			workspace_root,
			dispatcher,
		}
	}

	pub fn workspace_root(&self) -> &Path {
		&self.workspace_root
	}

	// === Configuration ===

	/// Load the workspace configuration. `Ok(None)` when there is no config file.
	pub async fn load(&self) -> Result<Option<Arc<ResolvedConfig>>, ConfigError> {
		self.resolver.write().await.load()
	}

	/// Re-read the configuration from disk
	pub async fn reload(&self) -> Result<Option<Arc<ResolvedConfig>>, ConfigError> {
		self.resolver.write().await.reload()
	}

	/// Write `config` to `.zed/sftp.json` and make it current
	pub async fn save(&self, config: SftpConfig) -> Result<Arc<ResolvedConfig>, ConfigError> {
		self.resolver.write().await.save(config)
	}

	/// Snapshot of the current configuration
	pub async fn current(&self) -> Option<Arc<ResolvedConfig>> {
		self.resolver.read().await.current()
	}

	pub async fn should_ignore(&self, path: &Path) -> bool {
		self.resolver.read().await.should_ignore(path)
	}

	pub async fn is_in_context(&self, path: &Path) -> bool {
		self.resolver.read().await.is_in_context(path)
	}

	pub async fn resolve_remote_path(&self, local: &Path) -> Result<Option<String>, SecurityError> {
		self.resolver.read().await.resolve_remote_path(local)
	}

	pub async fn context_path(&self) -> PathBuf {
		self.resolver.read().await.context_path()
	}

	// === Editor events ===

	/// Document saved: reload the config, then upload when `uploadOnSave` is
	/// set and the file is in context and not ignored.
	/// `Ok(None)` when the file was not eligible.
	pub async fn on_save(&self, path: &Path) -> Result<Option<Outcome>, SftpError> {
		let cfg = match self.reload().await? {
			Some(cfg) => cfg,
			None => return Ok(None),
		};
		let path = self.absolutize(path);
		if !cfg.config().upload_on_save() || !self.is_eligible(&cfg, &path) {
			return Ok(None);
		}
		Ok(Some(self.dispatcher.upload(&cfg, &path).await?))
	}

	/// Document opened: download when `downloadOnOpen` is set and the file
	/// is in context and not ignored
	pub async fn on_open(&self, path: &Path) -> Result<Option<Outcome>, SftpError> {
		let cfg = match self.current().await {
			Some(cfg) => cfg,
			None => return Ok(None),
		};
		let path = self.absolutize(path);
		if !cfg.config().download_on_open() || !self.is_eligible(&cfg, &path) {
			return Ok(None);
		}
		Ok(Some(self.dispatcher.download(&cfg, &path).await?))
	}

	fn is_eligible(&self, cfg: &ResolvedConfig, path: &Path) -> bool {
		let eligible = cfg.is_in_context(path) && !cfg.should_ignore(path);
		if !eligible {
			debug!("{} is not eligible for automatic transfer", path.display());
		}
		eligible
	}

	// === Explicit operations ===

	pub async fn upload(&self, path: &Path) -> Result<Outcome, SftpError> {
		let cfg = self.require_config().await?;
		self.dispatcher.upload(&cfg, &self.absolutize(path)).await
	}

	pub async fn download(&self, path: &Path) -> Result<Outcome, SftpError> {
		let cfg = self.require_config().await?;
		self.dispatcher.download(&cfg, &self.absolutize(path)).await
	}

	pub async fn upload_folder(&self, path: &Path) -> Result<Outcome, SftpError> {
		let cfg = self.require_config().await?;
		self.dispatcher.upload_folder(&cfg, &self.absolutize(path)).await
	}

	pub async fn download_folder(&self, path: &Path) -> Result<Outcome, SftpError> {
		let cfg = self.require_config().await?;
		self.dispatcher.download_folder(&cfg, &self.absolutize(path)).await
	}

	/// Push the whole context root to the remote root
	pub async fn sync(&self) -> Result<Outcome, SftpError> {
		let cfg = self.require_config().await?;
		self.dispatcher.sync_folder(&cfg, cfg.context_path()).await
	}

	pub async fn sync_folder(&self, path: &Path) -> Result<Outcome, SftpError> {
		let cfg = self.require_config().await?;
		self.dispatcher.sync_folder(&cfg, &self.absolutize(path)).await
	}

	/// Fetch the remote copy of `path` for a diff, returning the temp file
	pub async fn download_for_diff(&self, path: &Path) -> Result<PathBuf, SftpError> {
		let cfg = self.require_config().await?;
		self.dispatcher.download_to_temp(&cfg, &self.absolutize(path)).await
	}

	pub async fn list_remote_files(&self, remote: &str) -> Result<Vec<String>, SftpError> {
		let cfg = self.require_config().await?;
		self.dispatcher.list_remote_files(&cfg, remote).await
	}

	pub async fn delete_remote_file(&self, remote: &str) -> Result<(), SftpError> {
		let cfg = self.require_config().await?;
		self.dispatcher.delete_remote_file(&cfg, remote).await
	}

	pub async fn is_connected(&self) -> bool {
		self.dispatcher.is_connected().await
	}

	/// Close the remote connection, if any
	pub async fn close(&self) {
		self.dispatcher.close().await;
	}

	async fn require_config(&self) -> Result<Arc<ResolvedConfig>, ConfigError> {
		self.current()
			.await
			.ok_or_else(|| ConfigError::NotLoaded { workspace_root: self.workspace_root.clone() })
	}

	fn absolutize(&self, path: &Path) -> PathBuf {
		if path.is_absolute() {
			path.to_path_buf()
		} else {
			self.workspace_root.join(path)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_operations_need_config() {
		let dir = tempfile::tempdir().unwrap();
		let session = Session::new(dir.path());
		assert!(session.load().await.unwrap().is_none());

		let err = session.upload(Path::new("a.txt")).await.unwrap_err();
		assert!(matches!(err, SftpError::Config(ConfigError::NotLoaded { .. })));
		assert!(!session.is_connected().await);
	}

	#[tokio::test]
	async fn test_events_without_config_do_nothing() {
		let dir = tempfile::tempdir().unwrap();
		let session = Session::new(dir.path());
		assert_eq!(session.on_save(Path::new("a.txt")).await.unwrap(), None);
		assert_eq!(session.on_open(Path::new("a.txt")).await.unwrap(), None);
	}

	#[tokio::test]
	async fn test_context_path_defaults_to_root() {
		let dir = tempfile::tempdir().unwrap();
		let session = Session::new(dir.path());
		assert_eq!(session.context_path().await, dir.path());
	}
}

// vim: ts=4
