use clap::{Arg, ArgAction, ArgMatches, Command};
use std::error::Error;
use std::{env, path};

use zed_sftp::session::Session;
use zed_sftp::transfer::Outcome;
use zed_sftp::{logging, server};

///////////////////////
// Utility functions //
///////////////////////

/// Resolve a command line path against the current directory
fn absolute(cwd: &path::Path, arg: &str) -> path::PathBuf {
	let p = path::PathBuf::from(arg);
	if p.is_absolute() {
		p
	} else {
		cwd.join(p)
	}
}

fn path_arg<'a>(matches: &'a ArgMatches, cmd: &str) -> Result<&'a String, Box<dyn Error>> {
	matches.get_one::<String>("path").ok_or_else(|| format!("{}: path argument required", cmd).into())
}

fn print_outcome(verb: &str, target: &path::Path, outcome: Outcome) {
	match outcome {
		Outcome::Done(remote) => println!("{} {} -> {}", verb, target.display(), remote),
		Outcome::Skipped => println!("Skipped {}: outside context path", target.display()),
	}
}

async fn check(session: &Session) -> Result<(), Box<dyn Error>> {
	let cfg = session
		.load()
		.await?
		.ok_or_else(|| format!("No SFTP config found in {}", session.workspace_root().display()))?;
	let c = cfg.config();

	if let Some(source) = cfg.source() {
		println!("config:       {}", source.display());
	}
	if let Some(name) = &c.name {
		println!("name:         {}", name);
	}
	println!("protocol:     {}", c.protocol);
	println!("host:         {}@{}:{}", c.username, c.host, c.effective_port());
	println!("remote path:  {}", c.remote_path);
	println!("context path: {}", cfg.context_path().display());
	println!("upload/save:  {}", c.upload_on_save());
	println!("ignore:       {}", cfg.ignore_patterns().join(", "));
	Ok(())
}

async fn run(session: &Session, name: &str, sub: &ArgMatches) -> Result<(), Box<dyn Error>> {
	let cwd = env::current_dir()?;
	if session.load().await?.is_none() {
		return Err(format!("No SFTP config found in {}", session.workspace_root().display()).into());
	}

	match name {
		"upload" => {
			let p = absolute(&cwd, path_arg(sub, name)?);
			print_outcome("Uploaded", &p, session.upload(&p).await?);
		}
		"download" => {
			let p = absolute(&cwd, path_arg(sub, name)?);
			print_outcome("Downloaded", &p, session.download(&p).await?);
		}
		"upload-folder" => {
			let p = absolute(&cwd, path_arg(sub, name)?);
			print_outcome("Uploaded folder", &p, session.upload_folder(&p).await?);
		}
		"download-folder" => {
			let p = absolute(&cwd, path_arg(sub, name)?);
			print_outcome("Downloaded folder", &p, session.download_folder(&p).await?);
		}
		"sync" => {
			let root = session.context_path().await;
			print_outcome("Synced", &root, session.sync().await?);
		}
		"diff" => {
			let p = absolute(&cwd, path_arg(sub, name)?);
			let temp = session.download_for_diff(&p).await?;
			let status = tokio::process::Command::new("zed")
				.arg("--diff")
				.arg(&temp)
				.arg(&p)
				.status()
				.await
				.map_err(|e| format!("Failed to open diff: {}", e))?;
			if !status.success() {
				return Err(format!("zed --diff exited with {}", status).into());
			}
		}
		"ls" => {
			let remote = sub.get_one::<String>("remote").ok_or("ls: remote path required")?;
			for entry in session.list_remote_files(remote).await? {
				println!("{}", entry);
			}
		}
		"rm" => {
			let remote = sub.get_one::<String>("remote").ok_or("rm: remote path required")?;
			session.delete_remote_file(remote).await?;
			println!("Deleted {}", remote);
		}
		_ => return Err(format!("Unknown command: {}", name).into()),
	}
	Ok(())
}

fn path_command(name: &'static str, about: &'static str) -> Command {
	Command::new(name).about(about).arg(Arg::new("path").required(true))
}

fn remote_command(name: &'static str, about: &'static str) -> Command {
	Command::new(name).about(about).arg(Arg::new("remote").required(true))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
	logging::init_tracing();

	let matches = Command::new("zed-sftp")
		.version(env!("CARGO_PKG_VERSION"))
		.about("Mirror a workspace to a remote SFTP directory")
		.arg(
			Arg::new("workspace")
				.short('w')
				.long("workspace")
				.value_name("DIR")
				.help("Workspace root (defaults to the current directory)"),
		)
		.arg(
			Arg::new("stdio")
				.long("stdio")
				.action(ArgAction::SetTrue)
				.help("Serve LSP on stdio (default without subcommand)"),
		)
		.subcommand(
			Command::new("serve").about("Run the language server").arg(
				Arg::new("stdio")
					.long("stdio")
					.action(ArgAction::SetTrue)
					.help("Communicate over stdin/stdout (the only transport)"),
			),
		)
		.subcommand(Command::new("check").about("Show the resolved configuration"))
		.subcommand(path_command("upload", "Upload one file"))
		.subcommand(path_command("download", "Download one file"))
		.subcommand(path_command("upload-folder", "Upload a folder recursively"))
		.subcommand(path_command("download-folder", "Download a folder recursively"))
		.subcommand(Command::new("sync").about("Upload the whole context folder"))
		.subcommand(path_command("diff", "Compare a file with its remote version in Zed"))
		.subcommand(remote_command("ls", "List a remote directory"))
		.subcommand(remote_command("rm", "Delete a remote file"))
		.get_matches();

	let workspace = match matches.get_one::<String>("workspace") {
		Some(dir) => absolute(&env::current_dir()?, dir),
		None => env::current_dir()?,
	};

	match matches.subcommand() {
		None | Some(("serve", _)) => {
			server::run_stdio().await;
			Ok(())
		}
		Some(("check", _)) => check(&Session::new(workspace)).await,
		Some((name, sub)) => {
			let session = Session::new(workspace);
			let result = run(&session, name, sub).await;
			session.close().await;
			result
		}
	}
}

// vim: ts=4
