//! SFTP implementation of [`RemoteFs`] over russh and russh-sftp

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use russh::client;
use russh::keys::{ssh_key, PrivateKeyWithHashAlg};
use russh_sftp::client::SftpSession;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::error::RemoteError;
use super::traits::{RemoteFs, RemoteResult};
use super::types::*;
use crate::config::{Algorithms, DEFAULT_CONCURRENCY};

/// Upper bound on keyboard-interactive challenge rounds
const MAX_INTERACTIVE_ROUNDS: usize = 5;

/// Host key handler. Keys are logged by fingerprint and accepted.
struct SshHandler {
	host: String,
	port: u16,
}

impl client::Handler for SshHandler {
	type Error = russh::Error;

	async fn check_server_key(
		&mut self,
		server_public_key: &ssh_key::PublicKey,
	) -> Result<bool, Self::Error> {
		info!(
			host = %self.host,
			port = self.port,
			"server key {} {}",
			server_public_key.algorithm(),
			server_public_key.fingerprint(ssh_key::HashAlg::Sha256)
		);
		Ok(true)
	}
}

/// An active SSH + SFTP connection
struct SftpConn {
	sftp: SftpSession,
	session: client::Handle<SshHandler>,
}

/// SFTP client holding at most one connection
pub struct SftpRemote {
	conn: Option<SftpConn>,
	concurrency: usize,
}

impl Default for SftpRemote {
	fn default() -> Self {
		Self::new()
	}
}

impl SftpRemote {
	pub fn new() -> Self {
		Self { conn: None, concurrency: DEFAULT_CONCURRENCY }
	}

	fn sftp(&self) -> RemoteResult<&SftpSession> {
		self.conn.as_ref().map(|c| &c.sftp).ok_or(RemoteError::NotConnected)
	}

	/// TCP connect, handshake, authenticate, open the sftp subsystem
	async fn establish(params: &ConnectParams) -> RemoteResult<SftpConn> {
		let config = Arc::new(client::Config {
			keepalive_interval: params.keepalive,
			preferred: preferred_algorithms(params.algorithms.as_ref()),
			..Default::default()
		});
		let handler = SshHandler { host: params.host.clone(), port: params.port };

		let addr = (params.host.as_str(), params.port);
		let mut session = client::connect(config, addr, handler).await?;
		debug!("SSH handshake with {}:{} complete", params.host, params.port);

		authenticate(&mut session, params).await?;
		debug!("Authenticated as {}", params.username);

		let channel = session.channel_open_session().await?;
		channel.request_subsystem(true, "sftp").await?;
		let sftp = SftpSession::new(channel.into_stream()).await?;

		Ok(SftpConn { sftp, session })
	}
}

async fn authenticate(
	session: &mut client::Handle<SshHandler>,
	params: &ConnectParams,
) -> RemoteResult<()> {
	let user = params.username.as_str();

	match &params.credential {
		Credential::Password(password) => {
			let result = session.authenticate_password(user, password.as_str()).await?;
			if result.success() {
				return Ok(());
			}
			if params.interactive_auth
				&& keyboard_interactive(session, user, password).await?
			{
				return Ok(());
			}
			Err(RemoteError::AuthRejected { user: user.to_string(), method: "Password" })
		}
		Credential::PrivateKey { key, passphrase } => {
			let key = russh::keys::decode_secret_key(key, passphrase.as_deref())
				.map_err(|e| RemoteError::Key(e.to_string()))?;
			let hash_alg = session.best_supported_rsa_hash().await?.flatten();
			let result = session
				.authenticate_publickey(user, PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg))
				.await?;
			if result.success() {
				Ok(())
			} else {
				Err(RemoteError::AuthRejected { user: user.to_string(), method: "Public key" })
			}
		}
	}
}

/// Answer every keyboard-interactive prompt with the password
async fn keyboard_interactive(
	session: &mut client::Handle<SshHandler>,
	user: &str,
	password: &str,
) -> RemoteResult<bool> {
	use russh::client::KeyboardInteractiveAuthResponse as Response;

	debug!("Trying keyboard-interactive authentication");
	let mut response =
		session.authenticate_keyboard_interactive_start(user, None::<String>).await?;

	for _ in 0..MAX_INTERACTIVE_ROUNDS {
		match response {
			Response::Success => return Ok(true),
			Response::InfoRequest { prompts, .. } => {
				let answers = prompts.iter().map(|_| password.to_string()).collect();
				response = session.authenticate_keyboard_interactive_respond(answers).await?;
			}
			_ => return Ok(false),
		}
	}
	Ok(false)
}

/// Default russh preferences narrowed and reordered by the configured lists.
/// A list matching nothing russh supports is ignored with a warning.
fn preferred_algorithms(algorithms: Option<&Algorithms>) -> russh::Preferred {
	let mut preferred = russh::Preferred::default();
	let algorithms = match algorithms {
		Some(a) => a,
		None => return preferred,
	};

	if let Some(wanted) = &algorithms.kex {
		if let Some(kex) = narrow(&preferred.kex, wanted, |n| n.as_ref(), "kex") {
			preferred.kex = Cow::Owned(kex);
		}
	}
	if let Some(wanted) = &algorithms.cipher {
		if let Some(cipher) = narrow(&preferred.cipher, wanted, |n| n.as_ref(), "cipher") {
			preferred.cipher = Cow::Owned(cipher);
		}
	}
	if let Some(wanted) = &algorithms.hmac {
		if let Some(mac) = narrow(&preferred.mac, wanted, |n| n.as_ref(), "hmac") {
			preferred.mac = Cow::Owned(mac);
		}
	}
	if let Some(wanted) = &algorithms.server_host_key {
		if let Some(key) = narrow(&preferred.key, wanted, |a| a.as_str(), "serverHostKey") {
			preferred.key = Cow::Owned(key);
		}
	}

	preferred
}

fn narrow<T: Clone>(
	available: &[T],
	wanted: &[String],
	name: fn(&T) -> &str,
	what: &str,
) -> Option<Vec<T>> {
	let picked: Vec<T> = wanted
		.iter()
		.filter_map(|w| available.iter().find(|a| name(a) == w.as_str()).cloned())
		.collect();
	if picked.is_empty() {
		warn!("None of the configured {} algorithms {:?} are supported, using defaults", what, wanted);
		return None;
	}
	Some(picked)
}

fn join(dir: &str, name: &str) -> String {
	format!("{}/{}", dir.trim_end_matches('/'), name)
}

async fn copy_to_remote(sftp: &SftpSession, local: &Path, remote: &str) -> RemoteResult<u64> {
	let mut source = tokio::fs::File::open(local).await?;
	let mut target = sftp.create(remote).await?;
	let bytes = tokio::io::copy(&mut source, &mut target).await?;
	target.shutdown().await?;
	debug!("put {} -> {} ({} bytes)", local.display(), remote, bytes);
	Ok(bytes)
}

async fn copy_from_remote(sftp: &SftpSession, remote: &str, local: &Path) -> RemoteResult<u64> {
	let mut source = sftp.open(remote).await?;
	let mut target = tokio::fs::File::create(local).await?;
	let bytes = tokio::io::copy(&mut source, &mut target).await?;
	target.flush().await?;
	debug!("get {} -> {} ({} bytes)", remote, local.display(), bytes);
	Ok(bytes)
}

async fn ensure_remote_dir(sftp: &SftpSession, remote: &str) -> RemoteResult<()> {
	if !sftp.try_exists(remote).await? {
		sftp.create_dir(remote).await?;
	}
	Ok(())
}

#[async_trait]
impl RemoteFs for SftpRemote {
	async fn connect(&mut self, params: &ConnectParams) -> RemoteResult<()> {
		let conn = match params.ready_timeout {
			Some(limit) => tokio::time::timeout(limit, Self::establish(params))
				.await
				.map_err(|_| RemoteError::Timeout(limit))??,
			None => Self::establish(params).await?,
		};
		self.conn = Some(conn);
		self.concurrency = params.concurrency.max(1);
		Ok(())
	}

	async fn end(&mut self) -> RemoteResult<()> {
		if let Some(conn) = self.conn.take() {
			if let Err(e) = conn.sftp.close().await {
				debug!("sftp close: {}", e);
			}
			conn.session.disconnect(russh::Disconnect::ByApplication, "", "en").await?;
		}
		Ok(())
	}

	async fn put(&self, local: &Path, remote: &str) -> RemoteResult<u64> {
		copy_to_remote(self.sftp()?, local, remote).await
	}

	async fn get(&self, remote: &str, local: &Path) -> RemoteResult<u64> {
		copy_from_remote(self.sftp()?, remote, local).await
	}

	async fn delete(&self, remote: &str) -> RemoteResult<()> {
		self.sftp()?.remove_file(remote).await?;
		Ok(())
	}

	async fn mkdir(&self, remote: &str, recursive: bool) -> RemoteResult<()> {
		let sftp = self.sftp()?;
		if !recursive {
			sftp.create_dir(remote).await?;
			return Ok(());
		}

		let mut current = String::new();
		for segment in remote.split('/').filter(|s| !s.is_empty()) {
			current.push('/');
			current.push_str(segment);
			ensure_remote_dir(sftp, &current).await?;
		}
		Ok(())
	}

	async fn list(&self, remote: &str) -> RemoteResult<Vec<RemoteEntry>> {
		let mut entries = Vec::new();
		for entry in self.sftp()?.read_dir(remote).await? {
			let name = entry.file_name();
			if name == "." || name == ".." {
				continue;
			}
			let attrs = entry.metadata();
			let kind = if attrs.is_dir() {
				EntryKind::Directory
			} else if attrs.is_symlink() {
				EntryKind::Symlink
			} else {
				EntryKind::File
			};
			entries.push(RemoteEntry { name, kind, size: attrs.size });
		}
		Ok(entries)
	}

	async fn upload_dir(
		&self,
		local: &Path,
		remote: &str,
		filter: PathFilter<'_>,
	) -> RemoteResult<TransferStats> {
		let sftp = self.sftp()?;
		self.mkdir(remote, true).await?;

		// Directories are created while walking; files are streamed afterwards.
		let mut pending = vec![(local.to_path_buf(), remote.to_string())];
		let mut files: Vec<(PathBuf, String)> = Vec::new();
		while let Some((dir, remote_dir)) = pending.pop() {
			let mut entries = tokio::fs::read_dir(&dir).await?;
			while let Some(entry) = entries.next_entry().await? {
				let path = entry.path();
				if !filter(&path) {
					debug!("Skipping ignored {}", path.display());
					continue;
				}
				let target = join(&remote_dir, &entry.file_name().to_string_lossy());
				let file_type = entry.file_type().await?;
				if file_type.is_dir() {
					ensure_remote_dir(sftp, &target).await?;
					pending.push((path, target));
				} else if file_type.is_file() {
					files.push((path, target));
				} else if file_type.is_symlink() && tokio::fs::metadata(&path).await?.is_file() {
					files.push((path, target));
				} else {
					debug!("Skipping {}: not a regular file", path.display());
				}
			}
		}

		let results: Vec<RemoteResult<u64>> = stream::iter(files)
			.map(|(path, target)| async move { copy_to_remote(sftp, &path, &target).await })
			.buffer_unordered(self.concurrency)
			.collect()
			.await;

		let mut stats = TransferStats::default();
		for result in results {
			stats.bytes += result?;
			stats.files += 1;
		}
		Ok(stats)
	}

	async fn download_dir(
		&self,
		remote: &str,
		local: &Path,
		filter: PathFilter<'_>,
	) -> RemoteResult<TransferStats> {
		let sftp = self.sftp()?;
		tokio::fs::create_dir_all(local).await?;

		let mut pending = vec![(remote.to_string(), local.to_path_buf())];
		let mut files: Vec<(String, PathBuf)> = Vec::new();
		while let Some((remote_dir, dir)) = pending.pop() {
			for entry in sftp.read_dir(remote_dir.as_str()).await? {
				let name = entry.file_name();
				if name == "." || name == ".." || name.contains('/') {
					continue;
				}
				let path = dir.join(&name);
				if !filter(&path) {
					debug!("Skipping ignored {}", path.display());
					continue;
				}
				let source = join(&remote_dir, &name);
				let attrs = entry.metadata();
				if attrs.is_dir() {
					tokio::fs::create_dir_all(&path).await?;
					pending.push((source, path));
				} else if attrs.is_symlink() {
					debug!("Skipping remote symlink {}", source);
				} else {
					files.push((source, path));
				}
			}
		}

		let results: Vec<RemoteResult<u64>> = stream::iter(files)
			.map(|(source, path)| async move { copy_from_remote(sftp, &source, &path).await })
			.buffer_unordered(self.concurrency)
			.collect()
			.await;

		let mut stats = TransferStats::default();
		for result in results {
			stats.bytes += result?;
			stats.files += 1;
		}
		Ok(stats)
	}
}


// vim: ts=4
