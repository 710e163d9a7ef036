//! Remote file system error types
//!
//! Every failure reported by the SSH or SFTP layers is flattened into a
//! [`RemoteError`] so the dispatcher can wrap it once with its own context.

use std::fmt;
use std::io;
use std::time::Duration;

/// Remote collaborator error type
#[derive(Debug)]
pub enum RemoteError {
	/// Local or stream I/O error
	Io(io::Error),
	/// SSH transport error
	Ssh(String),
	/// SFTP subsystem error
	Sftp(String),
	/// Server rejected the credentials
	AuthRejected { user: String, method: &'static str },
	/// Private key could not be decoded
	Key(String),
	/// Operation attempted before `connect`
	NotConnected,
	/// Connect did not finish in time
	Timeout(Duration),
	/// Generic error message
	Other(String),
}

impl fmt::Display for RemoteError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RemoteError::Io(e) => write!(f, "I/O error: {}", e),
			RemoteError::Ssh(msg) => write!(f, "SSH error: {}", msg),
			RemoteError::Sftp(msg) => write!(f, "SFTP error: {}", msg),
			RemoteError::AuthRejected { user, method } => {
				write!(f, "{} authentication failed for user '{}'", method, user)
			}
			RemoteError::Key(msg) => write!(f, "Invalid private key: {}", msg),
			RemoteError::NotConnected => write!(f, "Not connected"),
			RemoteError::Timeout(after) => write!(f, "Timed out after {}ms", after.as_millis()),
			RemoteError::Other(msg) => write!(f, "{}", msg),
		}
	}
}

impl std::error::Error for RemoteError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			RemoteError::Io(e) => Some(e),
			_ => None,
		}
	}
}

impl From<io::Error> for RemoteError {
	fn from(e: io::Error) -> Self {
		RemoteError::Io(e)
	}
}

impl From<russh::Error> for RemoteError {
	fn from(e: russh::Error) -> Self {
		RemoteError::Ssh(e.to_string())
	}
}

impl From<russh_sftp::client::error::Error> for RemoteError {
	fn from(e: russh_sftp::client::error::Error) -> Self {
		RemoteError::Sftp(e.to_string())
	}
}

impl From<String> for RemoteError {
	fn from(e: String) -> Self {
		RemoteError::Other(e)
	}
}

impl From<&str> for RemoteError {
	fn from(e: &str) -> Self {
		RemoteError::Other(e.to_string())
	}
}

// vim: ts=4
