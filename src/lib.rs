//! # zed-sftp - SFTP sync language server for Zed
//!
//! Mirrors a local workspace to a remote directory over SFTP. The language
//! server uploads documents on save, downloads them on open and exposes
//! explicit upload, download, sync and diff commands. Behavior is driven by a
//! per-workspace `sftp.json`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use zed_sftp::session::Session;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Session::new("/home/me/site");
//!     session.load().await?;
//!     session.upload("wp-content/themes/x/style.css".as_ref()).await?;
//!     session.close().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Layers
//!
//! - [`resolver`] loads [`config`] and answers ignore, context and remote path questions
//! - [`transfer`] owns the connection and dispatches transfers
//! - [`protocol`] is the remote file system, SFTP over russh
//! - [`session`] ties one resolver to one dispatcher
//! - [`server`] is the tower-lsp front end

pub mod config;
pub mod error;
pub mod exclusion;
pub mod logging;
pub mod protocol;
pub mod resolver;
pub mod server;
pub mod session;
pub mod transfer;
pub mod validation;

// Re-export commonly used types and functions
pub use config::SftpConfig;
pub use error::{ConfigError, ConnectionError, SecurityError, SftpError, TransferError};
pub use resolver::{ConfigResolver, ResolvedConfig};
pub use session::Session;
pub use transfer::{Outcome, TransferDispatcher};

// vim: ts=4
