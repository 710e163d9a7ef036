//! Path resolution tests
//!
//! Context membership, ignore matching and local to remote mapping through the
//! public resolver API. Paths are synthetic; nothing here touches the disk.

use std::path::Path;

use zed_sftp::config::SftpConfig;
use zed_sftp::{ResolvedConfig, SecurityError};

fn config() -> SftpConfig {
	SftpConfig {
		host: "example.com".into(),
		username: "deploy".into(),
		password: Some("secret".into()),
		remote_path: "public_html".into(),
		..Default::default()
	}
}

fn resolve(config: SftpConfig) -> ResolvedConfig {
	ResolvedConfig::resolve(config, Path::new("/w"), None).unwrap()
}

// ===================================================================
// Context
// ===================================================================

#[test]
fn test_context_membership() {
	let cfg = resolve(SftpConfig { context: Some("site/wp-content".into()), ..config() });

	assert_eq!(cfg.context_path(), Path::new("/w/site/wp-content"));
	assert!(cfg.is_in_context(Path::new("/w/site/wp-content/x.php")));
	assert!(cfg.is_in_context(Path::new("/w/site/wp-content")));
	assert!(!cfg.is_in_context(Path::new("/w/other/x.php")));
	assert!(!cfg.is_in_context(Path::new("/w/site/wp-content-old/x.php")));
}

#[test]
fn test_context_membership_normalizes() {
	let cfg = resolve(SftpConfig { context: Some("ctx".into()), ..config() });

	assert!(cfg.is_in_context(Path::new("/w/./ctx/a.txt")));
	assert!(cfg.is_in_context(Path::new("/w/other/../ctx/a.txt")));
	assert!(!cfg.is_in_context(Path::new("/w/ctx/../a.txt")));
}

// ===================================================================
// Remote mapping
// ===================================================================

#[test]
fn test_remote_mapping() {
	let cfg = resolve(SftpConfig { context: Some("ctx".into()), ..config() });

	let cases = [
		("/w/ctx/a/b.txt", "/public_html/a/b.txt"),
		("/w/ctx/index.php", "/public_html/index.php"),
		("/w/ctx/./a.txt", "/public_html/a.txt"),
		("/w/ctx", "/public_html"),
	];
	for (local, remote) in cases {
		assert_eq!(
			cfg.remote_path_for(Path::new(local)).unwrap().as_deref(),
			Some(remote),
			"{}",
			local
		);
	}
}

#[test]
fn test_remote_root_slashes_collapse() {
	let cfg = resolve(SftpConfig { remote_path: "/var//www/".into(), ..config() });
	assert_eq!(
		cfg.remote_path_for(Path::new("/w/a.txt")).unwrap().as_deref(),
		Some("/var/www/a.txt")
	);
}

#[test]
fn test_out_of_context_maps_to_none() {
	let cfg = resolve(SftpConfig { context: Some("ctx".into()), ..config() });
	assert_eq!(cfg.remote_path_for(Path::new("/w/ctx2/a.txt")).unwrap(), None);
	assert_eq!(cfg.remote_path_for(Path::new("/elsewhere/a.txt")).unwrap(), None);
}

#[test]
fn test_parent_segments_rejected() {
	let cfg = resolve(SftpConfig { context: Some("ctx".into()), ..config() });

	for local in ["/w/ctx/../ctx/a.txt", "/w/ctx/a/../../ctx/b.txt", "/w/ctx/a/../b.txt"] {
		match cfg.remote_path_for(Path::new(local)) {
			Err(SecurityError::PathTraversal { .. }) => {}
			other => panic!("{} should be rejected, got {:?}", local, other),
		}
	}
}

#[test]
fn test_remote_root_with_parent_rejected() {
	let cfg = resolve(SftpConfig { remote_path: "/srv/../etc".into(), ..config() });
	let err = cfg.remote_path_for(Path::new("/w/passwd")).unwrap_err();
	assert_eq!(err, SecurityError::RemoteTraversal { path: "/srv/../etc/passwd".into() });
}

// ===================================================================
// Ignore
// ===================================================================

#[test]
fn test_default_ignores_always_present() {
	let cfg = resolve(config());
	assert!(cfg.ignore_patterns().contains(&".git".to_string()));
	assert!(cfg.ignore_patterns().contains(&"node_modules".to_string()));

	assert!(cfg.should_ignore(Path::new("/w/.git/config")));
	assert!(cfg.should_ignore(Path::new("/w/node_modules/react/index.js")));
	assert!(!cfg.should_ignore(Path::new("/w/src/index.ts")));
}

#[test]
fn test_configured_patterns() {
	let cfg = resolve(SftpConfig {
		ignore: Some(vec!["*.log".into(), "**/cache".into(), ".env*".into()]),
		..config()
	});

	assert!(cfg.should_ignore(Path::new("/w/error.log")));
	assert!(!cfg.should_ignore(Path::new("/w/logs/error.log")));
	assert!(cfg.should_ignore(Path::new("/w/wp-content/cache/page.html")));
	assert!(cfg.should_ignore(Path::new("/w/.env.local")));
	assert!(!cfg.should_ignore(Path::new("/w/src/env.ts")));
}

#[test]
fn test_ignore_is_workspace_relative_not_context_relative() {
	let cfg = resolve(SftpConfig {
		context: Some("site".into()),
		ignore: Some(vec!["site/uploads".into()]),
		..config()
	});
	assert!(cfg.should_ignore(Path::new("/w/site/uploads/a.jpg")));
	assert!(!cfg.should_ignore(Path::new("/w/site/themes/a.css")));
}

// vim: ts=4
