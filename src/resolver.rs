//! Configuration resolver
//!
//! Loads the workspace config, applies the default profile, and answers the
//! path questions every transfer needs: is this file ignored, is it inside the
//! context root, and where does it live on the remote host.
//!
//! A loaded configuration is an immutable [`ResolvedConfig`] behind an `Arc`.
//! Reload and save swap the whole value; nothing mutates it in place.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{self, SftpConfig};
use crate::error::{ConfigError, SecurityError};
use crate::exclusion::{build_ignore_patterns, PatternMatcher};
use crate::validation::{self, Validator};

/// Effective configuration plus everything derived from it
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
	/// Configuration after defaults and profile overlay
	config: SftpConfig,

	/// Workspace root the config was resolved against
	workspace_root: PathBuf,

	/// Absolute local root for path mapping
	context_path: PathBuf,

	/// Compiled ignore patterns
	ignore: PatternMatcher,

	/// File the config was read from, `None` when built in memory
	source: Option<PathBuf>,
}

impl ResolvedConfig {
	/// Validate, overlay and derive. `source` is recorded for diagnostics only.
	pub fn resolve(
		mut config: SftpConfig,
		workspace_root: &Path,
		source: Option<PathBuf>,
	) -> Result<Self, ConfigError> {
		config.validate()?;

		if config.local_path.as_deref().map_or(true, str::is_empty) {
			config.local_path = Some(workspace_root.to_string_lossy().into_owned());
		}

		// Context root and ignore set come from the base config; a profile
		// overlays connection and behaviour fields only.
		let context_path = resolve_context(workspace_root, config.context.as_deref())?;
		let ignore = PatternMatcher::new(&build_ignore_patterns(config.ignore.as_deref()))?;

		let selected = config.selected_profile().map(|(name, p)| (name.to_string(), p.cloned()));
		if let Some((name, profile)) = selected {
			match profile {
				Some(profile) => {
					debug!("Applying profile '{}'", name);
					config.apply_profile(&profile);
					config.validate()?;
				}
				None => warn!("Profile '{}' not found in profiles, using base config", name),
			}
		}

		Ok(Self {
			config,
			workspace_root: validation::normalize_path(workspace_root),
			context_path,
			ignore,
			source,
		})
	}

	pub fn config(&self) -> &SftpConfig {
		&self.config
	}

	pub fn workspace_root(&self) -> &Path {
		&self.workspace_root
	}

	/// Absolute local root used for remote path mapping
	pub fn context_path(&self) -> &Path {
		&self.context_path
	}

	/// Ignore patterns, configured ones first, then defaults
	pub fn ignore_patterns(&self) -> &[String] {
		self.ignore.patterns()
	}

	pub fn source(&self) -> Option<&Path> {
		self.source.as_deref()
	}

	/// True if `path` (absolute, or relative to the workspace root) matches an ignore pattern
	pub fn should_ignore(&self, path: &Path) -> bool {
		let absolute = validation::normalize_path(&self.absolutize(path));
		let relative = validation::relative_path(&absolute, &self.workspace_root);
		let ignored = self.ignore.is_ignored(&relative);
		if ignored {
			debug!("Ignoring {}", relative.display());
		}
		ignored
	}

	/// True if `path` lies inside the context root, compared segment by segment
	pub fn is_in_context(&self, path: &Path) -> bool {
		validation::is_path_within_root(&self.absolutize(path), &self.context_path)
	}

	/// Map a local path to its remote location.
	///
	/// Returns `Ok(None)` for paths outside the context root. Any `..` in the
	/// path relative to the context, or in the combined remote path, is rejected.
	pub fn remote_path_for(&self, local: &Path) -> Result<Option<String>, SecurityError> {
		let absolute = self.absolutize(local);
		if !validation::is_path_within_root(&absolute, &self.context_path) {
			return Ok(None);
		}

		let relative = validation::relative_path(&absolute, &self.context_path);
		validation::validate_path_safe(&relative)?;

		let root = validation::absolute_remote_root(&self.config.remote_path);
		let remote = validation::join_remote(&root, &relative);
		validation::validate_remote_path_safe(&remote)?;

		Ok(Some(remote))
	}

	fn absolutize(&self, path: &Path) -> PathBuf {
		if path.is_absolute() {
			path.to_path_buf()
		} else {
			self.workspace_root.join(path)
		}
	}
}

/// `context` with slashes trimmed, joined onto the workspace root
fn resolve_context(workspace_root: &Path, context: Option<&str>) -> Result<PathBuf, ConfigError> {
	let root = validation::normalize_path(workspace_root);
	let context = match context.map(validation::trim_slashes) {
		Some(c) if !c.is_empty() => c,
		_ => return Ok(root),
	};

	let joined = validation::normalize_path(&root.join(context));
	if !joined.starts_with(&root) {
		return Err(ConfigError::Invalid {
			message: format!("context '{}' points outside the workspace", context),
		});
	}
	Ok(joined)
}

/// Holds the workspace root and at most one resolved configuration
#[derive(Debug)]
pub struct ConfigResolver {
	workspace_root: PathBuf,
	current: Option<Arc<ResolvedConfig>>,
}

impl ConfigResolver {
	pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
		Self { workspace_root: workspace_root.into(), current: None }
	}

	pub fn workspace_root(&self) -> &Path {
		&self.workspace_root
	}

	/// Currently loaded configuration
	pub fn current(&self) -> Option<Arc<ResolvedConfig>> {
		self.current.clone()
	}

	/// File the current configuration was loaded from or saved to
	pub fn config_path(&self) -> Option<PathBuf> {
		self.current.as_ref().and_then(|c| c.source().map(Path::to_path_buf))
	}

	/// Find, parse, validate and resolve the config file.
	///
	/// `Ok(None)` when no candidate file exists. On error the previously loaded
	/// configuration is kept.
	pub fn load(&mut self) -> Result<Option<Arc<ResolvedConfig>>, ConfigError> {
		let path = match config::find_config_file(&self.workspace_root) {
			Some(path) => path,
			None => {
				debug!("No SFTP config under {}", self.workspace_root.display());
				self.current = None;
				return Ok(None);
			}
		};

		let raw = SftpConfig::from_file(&path)?;
		let resolved = Arc::new(ResolvedConfig::resolve(raw, &self.workspace_root, Some(path))?);
		info!(
			"Loaded SFTP config for {} from {}",
			resolved.config().host,
			resolved.source().map(|p| p.display().to_string()).unwrap_or_default()
		);
		self.current = Some(resolved.clone());
		Ok(Some(resolved))
	}

	/// Load again from disk, replacing the current configuration wholesale
	pub fn reload(&mut self) -> Result<Option<Arc<ResolvedConfig>>, ConfigError> {
		self.load()
	}

	/// Persist `config` to `.zed/sftp.json` and make it current
	pub fn save(&mut self, config: SftpConfig) -> Result<Arc<ResolvedConfig>, ConfigError> {
		config.validate()?;

		let path = config::canonical_config_path(&self.workspace_root);
		if let Some(dir) = path.parent() {
			std::fs::create_dir_all(dir)
				.map_err(|source| ConfigError::Write { path: dir.to_path_buf(), source })?;
		}

		let json = serde_json::to_string_pretty(&config).map_err(|e| ConfigError::Invalid {
			message: format!("Failed to serialize config: {}", e),
		})?;
		std::fs::write(&path, json)
			.map_err(|source| ConfigError::Write { path: path.clone(), source })?;
		info!("Saved SFTP config to {}", path.display());

		let resolved = Arc::new(ResolvedConfig::resolve(config, &self.workspace_root, Some(path))?);
		self.current = Some(resolved.clone());
		Ok(resolved)
	}

	/// See [`ResolvedConfig::should_ignore`]. False when nothing is loaded.
	pub fn should_ignore(&self, path: &Path) -> bool {
		self.current.as_ref().map_or(false, |c| c.should_ignore(path))
	}

	/// See [`ResolvedConfig::is_in_context`]. False when nothing is loaded.
	pub fn is_in_context(&self, path: &Path) -> bool {
		self.current.as_ref().map_or(false, |c| c.is_in_context(path))
	}

	/// See [`ResolvedConfig::remote_path_for`]. `Ok(None)` when nothing is loaded.
	pub fn resolve_remote_path(&self, local: &Path) -> Result<Option<String>, SecurityError> {
		match &self.current {
			Some(c) => c.remote_path_for(local),
			None => Ok(None),
		}
	}

	/// Absolute context root, or the workspace root when nothing is loaded
	pub fn context_path(&self) -> PathBuf {
		self.current
			.as_ref()
			.map(|c| c.context_path().to_path_buf())
			.unwrap_or_else(|| self.workspace_root.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn base() -> SftpConfig {
		SftpConfig {
			host: "example.com".into(),
			username: "deploy".into(),
			password: Some("secret".into()),
			remote_path: "public_html".into(),
			..Default::default()
		}
	}

	#[test]
	fn test_context_resolution() {
		let config = SftpConfig { context: Some("/site/wp-content/".into()), ..base() };
		let resolved = ResolvedConfig::resolve(config, Path::new("/w"), None).unwrap();
		assert_eq!(resolved.context_path(), Path::new("/w/site/wp-content"));
		assert!(resolved.is_in_context(Path::new("/w/site/wp-content/x.php")));
		assert!(!resolved.is_in_context(Path::new("/w/other/x.php")));
	}

	#[test]
	fn test_context_defaults_to_workspace_root() {
		let resolved = ResolvedConfig::resolve(base(), Path::new("/w"), None).unwrap();
		assert_eq!(resolved.context_path(), Path::new("/w"));
		assert_eq!(resolved.config().local_path.as_deref(), Some("/w"));
	}

	#[test]
	fn test_context_escaping_workspace_rejected() {
		let config = SftpConfig { context: Some("../elsewhere".into()), ..base() };
		let err = ResolvedConfig::resolve(config, Path::new("/w"), None).unwrap_err();
		assert!(matches!(err, ConfigError::Invalid { .. }));
	}

	#[test]
	fn test_sibling_prefix_not_in_context() {
		let config = SftpConfig { context: Some("ctx".into()), ..base() };
		let resolved = ResolvedConfig::resolve(config, Path::new("/w"), None).unwrap();
		assert!(!resolved.is_in_context(Path::new("/w/ctx2/a.txt")));
		assert_eq!(resolved.remote_path_for(Path::new("/w/ctx2/a.txt")).unwrap(), None);
	}

	#[test]
	fn test_remote_path_mapping() {
		let config = SftpConfig { context: Some("ctx".into()), ..base() };
		let resolved = ResolvedConfig::resolve(config, Path::new("/w"), None).unwrap();
		assert_eq!(
			resolved.remote_path_for(Path::new("/w/ctx/a/b.txt")).unwrap().as_deref(),
			Some("/public_html/a/b.txt")
		);
		assert_eq!(
			resolved.remote_path_for(Path::new("/w/ctx")).unwrap().as_deref(),
			Some("/public_html")
		);
	}

	#[test]
	fn test_traversal_rejected() {
		let config = SftpConfig { context: Some("ctx".into()), ..base() };
		let resolved = ResolvedConfig::resolve(config, Path::new("/w"), None).unwrap();
		let err = resolved.remote_path_for(Path::new("/w/ctx/a/../b.txt")).unwrap_err();
		assert!(matches!(err, SecurityError::PathTraversal { .. }));
	}

	#[test]
	fn test_remote_root_traversal_rejected() {
		let config = SftpConfig { remote_path: "/var/www/../etc".into(), ..base() };
		let resolved = ResolvedConfig::resolve(config, Path::new("/w"), None).unwrap();
		let err = resolved.remote_path_for(Path::new("/w/passwd")).unwrap_err();
		assert!(matches!(err, SecurityError::RemoteTraversal { .. }));
	}

	#[test]
	fn test_relative_paths_are_workspace_relative() {
		let resolved = ResolvedConfig::resolve(base(), Path::new("/w"), None).unwrap();
		assert!(resolved.should_ignore(Path::new(".git/config")));
		assert!(!resolved.should_ignore(Path::new("src/index.ts")));
		assert_eq!(
			resolved.remote_path_for(Path::new("src/index.ts")).unwrap().as_deref(),
			Some("/public_html/src/index.ts")
		);
	}

	#[test]
	fn test_missing_profile_keeps_base() {
		let config = SftpConfig {
			default_profile: Some("nope".into()),
			profiles: Some(Default::default()),
			..base()
		};
		let resolved = ResolvedConfig::resolve(config, Path::new("/w"), None).unwrap();
		assert_eq!(resolved.config().host, "example.com");
	}

	#[test]
	fn test_profile_does_not_move_context_or_ignore() {
		let mut profiles = std::collections::BTreeMap::new();
		profiles.insert(
			"prod".to_string(),
			config::ProfileOverlay {
				context: Some("b".into()),
				ignore: Some(vec!["*.php".into()]),
				port: Some(2222),
				..Default::default()
			},
		);
		let config = SftpConfig {
			context: Some("a".into()),
			profiles: Some(profiles),
			default_profile: Some("prod".into()),
			..base()
		};
		let resolved = ResolvedConfig::resolve(config, Path::new("/w"), None).unwrap();
		assert_eq!(resolved.config().port, Some(2222));
		assert_eq!(resolved.context_path(), Path::new("/w/a"));
		assert_eq!(resolved.ignore_patterns().iter().filter(|p| *p == "*.php").count(), 0);
		assert!(!resolved.should_ignore(Path::new("/w/a/index.php")));
	}

	#[test]
	fn test_unnormalized_paths_are_ignored() {
		let resolved = ResolvedConfig::resolve(base(), Path::new("/w"), None).unwrap();
		assert!(resolved.should_ignore(Path::new("/w/src/../.git/config")));
		assert!(resolved.should_ignore(Path::new("/w/./node_modules/x.js")));
		assert!(resolved.should_ignore(Path::new("src/../.git/HEAD")));
		assert!(!resolved.should_ignore(Path::new("/w/.git/../src/a.ts")));
	}

	#[test]
	fn test_empty_resolver_answers_absent() {
		let resolver = ConfigResolver::new("/w");
		assert!(resolver.current().is_none());
		assert!(!resolver.is_in_context(Path::new("/w/a")));
		assert!(!resolver.should_ignore(Path::new("/w/.git")));
		assert_eq!(resolver.resolve_remote_path(Path::new("/w/a")).unwrap(), None);
		assert_eq!(resolver.context_path(), PathBuf::from("/w"));
	}
}

// vim: ts=4
