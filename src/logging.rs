//! Tracing setup.
//!
//! Logs go to stderr: when running as a language server stdout carries the
//! LSP framing and must not receive anything else.
//!
//! ```bash
//! RUST_LOG=debug zed-sftp serve
//! RUST_LOG=zed_sftp::transfer=trace zed-sftp upload src/index.php
//! ```

/// Initialize the tracing subscriber with `RUST_LOG` support, defaulting to `info`.
pub fn init_tracing() {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
		)
		.with_writer(std::io::stderr)
		.with_ansi(false)
		.init();
}

// vim: ts=4
