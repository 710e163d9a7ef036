//! Error types for zed-sftp operations

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crate::protocol::RemoteError;

/// Main error type returned by resolver and dispatcher operations
#[derive(Debug)]
pub enum SftpError {
	/// Configuration missing, unreadable or invalid
	Config(ConfigError),

	/// A path tried to escape the context root or the remote root
	Security(SecurityError),

	/// Connecting or authenticating to the remote host failed
	Connection(ConnectionError),

	/// A remote or local I/O step of a transfer failed
	Transfer(TransferError),

	/// Local I/O error outside a transfer
	Io(io::Error),
}

impl fmt::Display for SftpError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SftpError::Config(e) => write!(f, "Configuration error: {}", e),
			SftpError::Security(e) => write!(f, "Security error: {}", e),
			SftpError::Connection(e) => write!(f, "Connection error: {}", e),
			SftpError::Transfer(e) => write!(f, "Transfer error: {}", e),
			SftpError::Io(e) => write!(f, "I/O error: {}", e),
		}
	}
}

impl Error for SftpError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			SftpError::Config(e) => Some(e),
			SftpError::Security(e) => Some(e),
			SftpError::Connection(e) => Some(e),
			SftpError::Transfer(e) => Some(e),
			SftpError::Io(e) => Some(e),
		}
	}
}

impl From<io::Error> for SftpError {
	fn from(e: io::Error) -> Self {
		SftpError::Io(e)
	}
}

impl From<ConfigError> for SftpError {
	fn from(e: ConfigError) -> Self {
		SftpError::Config(e)
	}
}

impl From<SecurityError> for SftpError {
	fn from(e: SecurityError) -> Self {
		SftpError::Security(e)
	}
}

impl From<ConnectionError> for SftpError {
	fn from(e: ConnectionError) -> Self {
		SftpError::Connection(e)
	}
}

impl From<TransferError> for SftpError {
	fn from(e: TransferError) -> Self {
		SftpError::Transfer(e)
	}
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
	/// Config file exists but could not be read
	Read { path: PathBuf, source: io::Error },

	/// Config file is not valid JSON for the schema
	Parse { path: PathBuf, source: serde_json::Error },

	/// A required field is absent or empty
	MissingField { field: &'static str },

	/// Neither a password nor a private key path is configured
	NoCredential,

	/// An ignore pattern is not a valid glob
	InvalidPattern { pattern: String, message: String },

	/// Semantically invalid value
	Invalid { message: String },

	/// Config file could not be written
	Write { path: PathBuf, source: io::Error },

	/// No configuration is loaded for the workspace
	NotLoaded { workspace_root: PathBuf },
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfigError::Read { path, source } => {
				write!(f, "Failed to read {}: {}", path.display(), source)
			}
			ConfigError::Parse { path, source } => {
				write!(f, "Failed to parse SFTP config {}: {}", path.display(), source)
			}
			ConfigError::MissingField { field } => write!(f, "Missing required field: {}", field),
			ConfigError::NoCredential => {
				write!(f, "Either password or privateKeyPath must be provided")
			}
			ConfigError::InvalidPattern { pattern, message } => {
				write!(f, "Invalid ignore pattern '{}': {}", pattern, message)
			}
			ConfigError::Invalid { message } => write!(f, "{}", message),
			ConfigError::Write { path, source } => {
				write!(f, "Failed to write {}: {}", path.display(), source)
			}
			ConfigError::NotLoaded { workspace_root } => {
				write!(f, "No SFTP configuration found in {}", workspace_root.display())
			}
		}
	}
}

impl Error for ConfigError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			ConfigError::Read { source, .. } | ConfigError::Write { source, .. } => Some(source),
			ConfigError::Parse { source, .. } => Some(source),
			_ => None,
		}
	}
}

/// Path traversal rejections
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityError {
	/// The local path, relative to the context root, contains `..`
	PathTraversal { path: String },

	/// The combined remote path contains `..`
	RemoteTraversal { path: String },
}

impl fmt::Display for SecurityError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SecurityError::PathTraversal { path } => {
				write!(f, "Path traversal detected in file path: {}", path)
			}
			SecurityError::RemoteTraversal { path } => {
				write!(f, "Path traversal detected in remote path: {}", path)
			}
		}
	}
}

impl Error for SecurityError {}

/// Connection-specific errors
#[derive(Debug)]
pub enum ConnectionError {
	/// Configured protocol has no transport
	UnsupportedProtocol { protocol: String },

	/// Private key file could not be read
	KeyRead { path: PathBuf, source: io::Error },

	/// Connect did not complete within the configured timeout
	Timeout { host: String, after: Duration },

	/// Handshake, authentication or subsystem failure
	Failed { host: String, source: RemoteError },
}

impl fmt::Display for ConnectionError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConnectionError::UnsupportedProtocol { protocol } => {
				write!(f, "Protocol '{}' is not supported, only sftp is", protocol)
			}
			ConnectionError::KeyRead { path, source } => {
				write!(f, "Failed to read private key {}: {}", path.display(), source)
			}
			ConnectionError::Timeout { host, after } => {
				write!(f, "Connection to {} timed out after {}ms", host, after.as_millis())
			}
			ConnectionError::Failed { host, source } => {
				write!(f, "Failed to connect to SFTP server {}: {}", host, source)
			}
		}
	}
}

impl Error for ConnectionError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			ConnectionError::KeyRead { source, .. } => Some(source),
			ConnectionError::Failed { source, .. } => Some(source),
			_ => None,
		}
	}
}

/// Which dispatcher operation a transfer error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
	Upload,
	Download,
	UploadFolder,
	DownloadFolder,
	SyncFolder,
	DownloadForDiff,
	List,
	Delete,
}

impl fmt::Display for Operation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			Operation::Upload => "upload file",
			Operation::Download => "download file",
			Operation::UploadFolder => "upload folder",
			Operation::DownloadFolder => "download folder",
			Operation::SyncFolder => "sync folder",
			Operation::DownloadForDiff => "download remote file for diff",
			Operation::List => "list remote files",
			Operation::Delete => "delete remote file",
		};
		f.write_str(s)
	}
}

/// Transfer errors
#[derive(Debug)]
pub enum TransferError {
	/// The remote collaborator reported a failure
	Remote { operation: Operation, path: String, source: RemoteError },

	/// Preparing the local side failed
	Local { operation: Operation, path: PathBuf, source: io::Error },

	/// The path does not map to a remote location
	OutsideContext { operation: Operation, path: PathBuf },
}

impl fmt::Display for TransferError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TransferError::Remote { operation, path, source } => {
				write!(f, "Failed to {} {}: {}", operation, path, source)
			}
			TransferError::Local { operation, path, source } => {
				write!(f, "Failed to {} {}: {}", operation, path.display(), source)
			}
			TransferError::OutsideContext { operation, path } => {
				write!(f, "Failed to {}: {} is outside context path", operation, path.display())
			}
		}
	}
}

impl Error for TransferError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			TransferError::Remote { source, .. } => Some(source),
			TransferError::Local { source, .. } => Some(source),
			TransferError::OutsideContext { .. } => None,
		}
	}
}

// vim: ts=4
