//! Types exchanged with the remote file system collaborator

use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::config::Algorithms;

/// Decides whether a local path takes part in a folder transfer.
/// Returns `true` to transfer the path.
pub type PathFilter<'a> = &'a (dyn Fn(&Path) -> bool + Send + Sync);

/// Everything needed to open one connection
#[derive(Clone)]
pub struct ConnectParams {
	pub host: String,
	pub port: u16,
	pub username: String,
	pub credential: Credential,

	/// Bound on TCP connect, handshake and authentication together
	pub ready_timeout: Option<Duration>,

	/// SSH keepalive interval
	pub keepalive: Option<Duration>,

	/// Retry password authentication as keyboard-interactive
	pub interactive_auth: bool,

	/// Restrict and order negotiated algorithms
	pub algorithms: Option<Algorithms>,

	/// Parallel file transfers in folder operations
	pub concurrency: usize,
}

impl fmt::Debug for ConnectParams {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ConnectParams")
			.field("host", &self.host)
			.field("port", &self.port)
			.field("username", &self.username)
			.field("credential", &self.credential)
			.field("ready_timeout", &self.ready_timeout)
			.field("keepalive", &self.keepalive)
			.field("interactive_auth", &self.interactive_auth)
			.field("concurrency", &self.concurrency)
			.finish()
	}
}

/// Authentication material. Secrets never appear in `Debug` output.
#[derive(Clone)]
pub enum Credential {
	Password(String),
	/// PEM / OpenSSH encoded private key and its optional passphrase
	PrivateKey { key: String, passphrase: Option<String> },
}

impl fmt::Debug for Credential {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Credential::Password(_) => f.write_str("Password(***)"),
			Credential::PrivateKey { passphrase, .. } => {
				write!(f, "PrivateKey {{ passphrase: {} }}", passphrase.is_some())
			}
		}
	}
}

/// Kind of a remote directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
	File,
	Directory,
	Symlink,
}

/// One entry of a remote directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
	pub name: String,
	pub kind: EntryKind,
	pub size: Option<u64>,
}

/// Totals for a folder transfer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
	pub files: usize,
	pub bytes: u64,
}


// vim: ts=4
