//! Ignore-pattern handling
//!
//! Paths are matched relative to the workspace root. A pattern excludes a path
//! when it matches the path itself or any directory above it, so `.git`
//! excludes `.git/config` and `node_modules` excludes everything below it.
//! The config file candidates are always excluded, they carry credentials.

mod patterns;

pub use patterns::PatternMatcher;

use crate::config::{CONFIG_CANDIDATES, DEFAULT_IGNORE};

/// Configured patterns followed by the built-in defaults, without duplicates.
///
/// Order is preserved: user patterns first, then any default not already
/// present, then the config file locations.
pub fn build_ignore_patterns(configured: Option<&[String]>) -> Vec<String> {
	let mut patterns: Vec<String> = Vec::new();
	for pattern in configured.unwrap_or_default() {
		if !patterns.contains(pattern) {
			patterns.push(pattern.clone());
		}
	}
	for default in DEFAULT_IGNORE.into_iter().chain(CONFIG_CANDIDATES) {
		if !patterns.iter().any(|p| p == default) {
			patterns.push(default.to_string());
		}
	}
	patterns
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults_added_when_absent() {
		assert_eq!(
			build_ignore_patterns(None),
			vec![".git", "node_modules", ".zed/sftp.json", ".vscode/sftp.json", "sftp.json"]
		);
	}

	#[test]
	fn test_defaults_not_duplicated() {
		let configured = vec!["node_modules".to_string(), "*.log".to_string(), "*.log".to_string()];
		assert_eq!(
			build_ignore_patterns(Some(&configured)),
			vec!["node_modules", "*.log", ".git", ".zed/sftp.json", ".vscode/sftp.json", "sftp.json"]
		);
	}

	#[test]
	fn test_config_files_ignored() {
		let matcher = PatternMatcher::new(&build_ignore_patterns(None)).unwrap();
		assert!(matcher.is_ignored(std::path::Path::new(".zed/sftp.json")));
		assert!(matcher.is_ignored(std::path::Path::new(".vscode/sftp.json")));
		assert!(matcher.is_ignored(std::path::Path::new("sftp.json")));
		assert!(!matcher.is_ignored(std::path::Path::new("docs/sftp.json")));
		assert!(!matcher.is_ignored(std::path::Path::new(".zed/settings.json")));
	}
}

// vim: ts=4
