//! Core trait for the remote file system
//!
//! The dispatcher depends only on this trait. [`super::SftpRemote`] is the
//! production implementation; tests drive the dispatcher with in-memory fakes.

use async_trait::async_trait;
use std::path::Path;

use super::error::RemoteError;
use super::types::*;

/// Result type for remote operations
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Operations the dispatcher needs from a remote host.
///
/// Remote paths are absolute and `/`-separated.
#[async_trait]
pub trait RemoteFs: Send + Sync {
	// === Lifecycle ===

	/// Open the connection
	async fn connect(&mut self, params: &ConnectParams) -> RemoteResult<()>;

	/// Close the connection
	async fn end(&mut self) -> RemoteResult<()>;

	// === Files ===

	/// Upload one local file, replacing the remote file
	async fn put(&self, local: &Path, remote: &str) -> RemoteResult<u64>;

	/// Download one remote file, replacing the local file
	async fn get(&self, remote: &str, local: &Path) -> RemoteResult<u64>;

	/// Delete one remote file
	async fn delete(&self, remote: &str) -> RemoteResult<()>;

	// === Directories ===

	/// Create a remote directory, with all missing parents when `recursive`
	async fn mkdir(&self, remote: &str, recursive: bool) -> RemoteResult<()>;

	/// List a remote directory, without `.` and `..`
	async fn list(&self, remote: &str) -> RemoteResult<Vec<RemoteEntry>>;

	/// Upload a local tree below `remote`. Paths rejected by `filter` are skipped,
	/// a rejected directory is not descended into.
	async fn upload_dir(
		&self,
		local: &Path,
		remote: &str,
		filter: PathFilter<'_>,
	) -> RemoteResult<TransferStats>;

	/// Download a remote tree into `local`. `filter` sees the local destination path.
	async fn download_dir(
		&self,
		remote: &str,
		local: &Path,
		filter: PathFilter<'_>,
	) -> RemoteResult<TransferStats>;
}

// vim: ts=4
