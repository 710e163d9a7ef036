//! Language server front end
//!
//! Speaks LSP over stdio via tower-lsp. Save and open notifications trigger
//! automatic transfers, `workspace/executeCommand` runs explicit ones. Results
//! are reported back as log and show-message notifications.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result as RpcResult;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};
use tracing::{debug, error, info, warn};

use crate::error::{ConfigError, SftpError};
use crate::session::Session;
use crate::transfer::Outcome;

/// Commands advertised through `executeCommandProvider`
pub const COMMANDS: [&str; 6] = [
	"sftp.upload",
	"sftp.download",
	"sftp.sync",
	"sftp.uploadFolder",
	"sftp.downloadFolder",
	"sftp.diff",
];

pub struct Backend {
	client: Client,
	workspace_root: RwLock<Option<PathBuf>>,
	session: RwLock<Option<Arc<Session>>>,
}

impl Backend {
	pub fn new(client: Client) -> Self {
		Self { client, workspace_root: RwLock::new(None), session: RwLock::new(None) }
	}

	async fn session(&self) -> Option<Arc<Session>> {
		self.session.read().await.clone()
	}

	async fn log(&self, typ: MessageType, message: impl Into<String>) {
		self.client.log_message(typ, message.into()).await;
	}

	async fn show(&self, typ: MessageType, message: impl Into<String>) {
		self.client.show_message(typ, message.into()).await;
	}

	/// Report the result of an automatic transfer
	async fn report(&self, verb: &str, path: &Path, result: Result<Option<Outcome>, SftpError>) {
		match result {
			Ok(Some(Outcome::Done(remote))) => {
				self.log(MessageType::INFO, format!("{} {} ({})", verb, path.display(), remote)).await;
				self.show(MessageType::INFO, format!("{}: {}", verb, file_name(path))).await;
			}
			Ok(Some(Outcome::Skipped)) => {
				self.log(MessageType::LOG, format!("File is outside context path: {}", path.display()))
					.await;
			}
			Ok(None) => {}
			Err(e) => {
				error!("{} {} failed: {}", verb, path.display(), e);
				self.log(MessageType::ERROR, format!("{} failed: {}", verb, e)).await;
				self.show(MessageType::ERROR, format!("{} failed: {}", verb, e)).await;
			}
		}
	}

	/// Run one command. `Ok(None)` when the target was outside the context
	/// path and nothing was transferred.
	async fn run_command(
		&self,
		session: &Session,
		command: &str,
		arguments: &[Value],
	) -> Result<Option<String>, CommandError> {
		if command == "sftp.sync" {
			let outcome = session.sync().await?;
			let root = session.context_path().await;
			return Ok(self.completed(&outcome, &root, "Sync completed".to_string()).await);
		}

		let path = path_argument(arguments).ok_or(CommandError::MissingArgument)?;
		let name = file_name(&path);
		let (outcome, message) = match command {
			"sftp.upload" => (session.upload(&path).await?, format!("Uploaded: {}", name)),
			"sftp.download" => (session.download(&path).await?, format!("Downloaded: {}", name)),
			"sftp.uploadFolder" => {
				(session.upload_folder(&path).await?, format!("Uploaded folder: {}", name))
			}
			"sftp.downloadFolder" => {
				(session.download_folder(&path).await?, format!("Downloaded folder: {}", name))
			}
			"sftp.diff" => {
				self.log(MessageType::INFO, format!("Fetching remote version for diff: {}", path.display()))
					.await;
				let temp = session.download_for_diff(&path).await?;
				self.open_diff(temp, session.workspace_root().join(&path)).await?;
				return Ok(Some(format!("Diff: {} (remote vs local)", name)));
			}
			_ => return Err(CommandError::Unknown),
		};
		Ok(self.completed(&outcome, &path, message).await)
	}

	/// Success message for `outcome`; a skipped transfer is only logged
	async fn completed(&self, outcome: &Outcome, path: &Path, message: String) -> Option<String> {
		let message = outcome_message(outcome, message);
		if message.is_none() {
			self.log(MessageType::WARNING, format!("File is outside context path: {}", path.display()))
				.await;
		}
		message
	}

	/// Session with a loaded config, or the reason there is none.
	///
	/// An unconfigured session re-reads the config first so a file fixed or
	/// created after startup is picked up.
	async fn configured_session(&self) -> Result<Arc<Session>, String> {
		let session = match self.session().await {
			Some(session) => session,
			None => return Err(not_configured("no workspace folder")),
		};
		if session.current().await.is_some() {
			return Ok(session);
		}
		match session.reload().await {
			Ok(Some(_)) => Ok(session),
			Ok(None) => Err(not_configured(ConfigError::NotLoaded {
				workspace_root: session.workspace_root().to_path_buf(),
			})),
			Err(e) => Err(not_configured(e)),
		}
	}

	/// Open the editor's diff view, remote copy on the left
	async fn open_diff(&self, remote_copy: PathBuf, local: PathBuf) -> Result<(), CommandError> {
		let mut child = tokio::process::Command::new("zed")
			.arg("--diff")
			.arg(&remote_copy)
			.arg(&local)
			.spawn()
			.map_err(CommandError::Diff)?;

		let client = self.client.clone();
		tokio::spawn(async move {
			match child.wait().await {
				Ok(status) if status.success() => {}
				Ok(status) => {
					let message = format!("Failed to open diff: zed exited with {}", status);
					client.log_message(MessageType::ERROR, message.clone()).await;
					client.show_message(MessageType::ERROR, message).await;
				}
				Err(e) => {
					client.log_message(MessageType::ERROR, format!("Failed to open diff: {}", e)).await;
				}
			}
		});
		Ok(())
	}
}

#[derive(Debug)]
enum CommandError {
	MissingArgument,
	Unknown,
	Diff(std::io::Error),
	Sftp(SftpError),
}

impl std::fmt::Display for CommandError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			CommandError::MissingArgument => write!(f, "Missing path argument"),
			CommandError::Unknown => write!(f, "Unknown command"),
			CommandError::Diff(e) => write!(f, "Failed to open diff: {}", e),
			CommandError::Sftp(e) => write!(f, "{}", e),
		}
	}
}

impl From<SftpError> for CommandError {
	fn from(e: SftpError) -> Self {
		CommandError::Sftp(e)
	}
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
	async fn initialize(&self, params: InitializeParams) -> RpcResult<InitializeResult> {
		#[allow(deprecated)]
		let root = params
			.workspace_folders
			.as_ref()
			.and_then(|folders| folders.first())
			.and_then(|folder| folder.uri.to_file_path().ok())
			.or_else(|| params.root_uri.as_ref().and_then(|uri| uri.to_file_path().ok()));
		debug!("Workspace root: {:?}", root);
		*self.workspace_root.write().await = root;

		Ok(InitializeResult {
			capabilities: ServerCapabilities {
				text_document_sync: Some(TextDocumentSyncCapability::Options(
					TextDocumentSyncOptions {
						open_close: Some(true),
						change: Some(TextDocumentSyncKind::FULL),
						save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
							include_text: Some(false),
						})),
						..Default::default()
					},
				)),
				execute_command_provider: Some(ExecuteCommandOptions {
					commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
					..Default::default()
				}),
				..Default::default()
			},
			server_info: Some(ServerInfo {
				name: env!("CARGO_PKG_NAME").to_string(),
				version: Some(env!("CARGO_PKG_VERSION").to_string()),
			}),
		})
	}

	async fn initialized(&self, _: InitializedParams) {
		self.log(MessageType::INFO, "SFTP Language Server initialized").await;

		let root = match self.workspace_root.read().await.clone() {
			Some(root) => root,
			None => {
				warn!("No workspace folder, SFTP disabled");
				return;
			}
		};

		let session = Arc::new(Session::new(root));
		match session.load().await {
			Ok(Some(cfg)) => {
				info!("SFTP config loaded for {}", cfg.config().host);
				self.log(MessageType::INFO, format!("SFTP config loaded for {}", cfg.config().host))
					.await;
				if let Some(context) = &cfg.config().context {
					self.log(
						MessageType::INFO,
						format!("Context path: {} -> {}", context, cfg.context_path().display()),
					)
					.await;
				}
				if cfg.config().upload_on_save() {
					self.log(MessageType::INFO, "Upload on save is enabled").await;
				}
			}
			Ok(None) => {
				warn!("No SFTP config found in {}", session.workspace_root().display());
				self.log(MessageType::WARNING, "No SFTP config found").await;
			}
			Err(e) => {
				// No connection is made with a broken config; commands and saves
				// re-read it and keep reporting this cause until it is fixed.
				error!("Failed to initialize SFTP: {}", e);
				self.log(MessageType::ERROR, format!("Failed to initialize SFTP: {}", e)).await;
				self.show(MessageType::ERROR, not_configured(&e)).await;
			}
		}
		*self.session.write().await = Some(session);
	}

	async fn shutdown(&self) -> RpcResult<()> {
		if let Some(session) = self.session().await {
			session.close().await;
		}
		Ok(())
	}

	async fn did_open(&self, params: DidOpenTextDocumentParams) {
		let (session, path) = match self.event_target(&params.text_document.uri).await {
			Some(target) => target,
			None => return,
		};
		let result = session.on_open(&path).await;
		self.report("Downloaded", &path, result).await;
	}

	async fn did_change(&self, _: DidChangeTextDocumentParams) {}

	async fn did_save(&self, params: DidSaveTextDocumentParams) {
		let (session, path) = match self.event_target(&params.text_document.uri).await {
			Some(target) => target,
			None => return,
		};
		let result = session.on_save(&path).await;
		self.report("Uploaded", &path, result).await;
	}

	async fn did_close(&self, _: DidCloseTextDocumentParams) {}

	async fn execute_command(&self, params: ExecuteCommandParams) -> RpcResult<Option<Value>> {
		let session = match self.configured_session().await {
			Ok(session) => session,
			Err(message) => {
				self.log(MessageType::ERROR, message.clone()).await;
				self.show(MessageType::ERROR, message).await;
				return Ok(None);
			}
		};

		match self.run_command(&session, &params.command, &params.arguments).await {
			Ok(Some(message)) => self.show(MessageType::INFO, message).await,
			Ok(None) => {}
			Err(CommandError::Unknown) => {
				self.show(MessageType::ERROR, format!("Unknown command: {}", params.command)).await
			}
			Err(e) => {
				error!("Command {} failed: {}", params.command, e);
				self.log(MessageType::ERROR, format!("Command failed: {}", e)).await;
				self.show(MessageType::ERROR, format!("Command failed: {}", e)).await;
			}
		}
		Ok(None)
	}
}

impl Backend {
	async fn event_target(&self, uri: &Url) -> Option<(Arc<Session>, PathBuf)> {
		let session = self.session().await?;
		match uri.to_file_path() {
			Ok(path) => Some((session, path)),
			Err(()) => {
				debug!("Ignoring non-file document {}", uri);
				None
			}
		}
	}
}

/// First command argument as a path; accepts plain paths and `file://` URIs
fn path_argument(arguments: &[Value]) -> Option<PathBuf> {
	let raw = arguments.first()?.as_str()?;
	if raw.starts_with("file://") {
		return Url::parse(raw).ok()?.to_file_path().ok();
	}
	Some(PathBuf::from(raw))
}

/// `Some(message)` for a completed transfer, `None` when it was skipped
fn outcome_message(outcome: &Outcome, message: String) -> Option<String> {
	match outcome {
		Outcome::Done(_) => Some(message),
		Outcome::Skipped => None,
	}
}

fn not_configured(cause: impl std::fmt::Display) -> String {
	format!("SFTP not configured: {}", cause)
}

fn file_name(path: &Path) -> String {
	path.file_name()
		.map(|n| n.to_string_lossy().into_owned())
		.unwrap_or_else(|| path.display().to_string())
}

/// Serve LSP on stdin/stdout until the client exits
pub async fn run_stdio() {
	let stdin = tokio::io::stdin();
	let stdout = tokio::io::stdout();

	let (service, socket) = LspService::new(Backend::new);
	info!("Serving LSP on stdio");
	Server::new(stdin, stdout, socket).serve(service).await;
}


// vim: ts=4
