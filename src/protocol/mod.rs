//! Remote file system layer
//!
//! The transfer dispatcher depends only on the [`RemoteFs`] trait, keeping
//! SSH and SFTP details out of the path resolution and dispatch logic.
//!
//! # Example Usage
//!
//! ```ignore
//! use zed_sftp::protocol::{RemoteFs, SftpRemote};
//!
//! let mut remote = SftpRemote::new();
//! remote.connect(&params).await?;
//! remote.mkdir("/srv/www/assets", true).await?;
//! remote.put(Path::new("assets/app.js"), "/srv/www/assets/app.js").await?;
//! remote.end().await?;
//! ```

pub mod error;
pub mod sftp;
pub mod traits;
pub mod types;

// Re-export public API
pub use error::RemoteError;
pub use sftp::SftpRemote;
pub use traits::{RemoteFs, RemoteResult};
pub use types::{
	ConnectParams, Credential, EntryKind, PathFilter, RemoteEntry, TransferStats,
};

// vim: ts=4
