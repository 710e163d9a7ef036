//! Path validation and lexical path arithmetic
//!
//! Nothing here touches the file system: paths are compared and joined
//! component by component so results do not depend on what exists on disk.

use std::path::{Component, Path, PathBuf};

use crate::error::SecurityError;

/// Check if a path is safe (no parent directory references)
pub fn is_path_safe(path: &Path) -> bool {
	!path.components().any(|c| matches!(c, Component::ParentDir))
}

/// Fail with `SecurityError::PathTraversal` when `path` contains `..`
pub fn validate_path_safe(path: &Path) -> Result<(), SecurityError> {
	if !is_path_safe(path) {
		return Err(SecurityError::PathTraversal { path: path.display().to_string() });
	}
	Ok(())
}

/// Check a `/`-separated remote path for `..` segments
pub fn is_remote_path_safe(path: &str) -> bool {
	!path.split('/').any(|segment| segment == "..")
}

/// Fail with `SecurityError::RemoteTraversal` when `path` contains a `..` segment
pub fn validate_remote_path_safe(path: &str) -> Result<(), SecurityError> {
	if !is_remote_path_safe(path) {
		return Err(SecurityError::RemoteTraversal { path: path.to_string() });
	}
	Ok(())
}

/// Lexically normalize a path: drop `.` segments and resolve `..` against the
/// preceding segment. `..` at the root is dropped, leading `..` of a relative
/// path is kept.
pub fn normalize_path(path: &Path) -> PathBuf {
	let mut out: Vec<Component> = Vec::new();
	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => match out.last() {
				Some(Component::Normal(_)) => {
					out.pop();
				}
				Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
				_ => out.push(component),
			},
			other => out.push(other),
		}
	}
	if out.is_empty() {
		return PathBuf::from(".");
	}
	out.iter().collect()
}

/// Check if `path` is inside `root` (or equal to it), comparing normalized
/// path segments. `/w/ctx2` is not within `/w/ctx`.
pub fn is_path_within_root(path: &Path, root: &Path) -> bool {
	normalize_path(path).starts_with(normalize_path(root))
}

/// Path of `path` relative to `base`.
///
/// `base` is normalized, `path` only has its `.` segments removed: a `..`
/// written in `path` survives into the result so callers can reject it.
/// Where `path` leaves `base`, the result climbs out with `..` segments.
pub fn relative_path(path: &Path, base: &Path) -> PathBuf {
	let base = normalize_path(base);
	let path_components: Vec<Component> =
		path.components().filter(|c| !matches!(c, Component::CurDir)).collect();
	let base_components: Vec<Component> =
		base.components().filter(|c| !matches!(c, Component::CurDir)).collect();

	let common = path_components
		.iter()
		.zip(base_components.iter())
		.take_while(|(a, b)| a == b)
		.count();

	let mut out = PathBuf::new();
	for _ in common..base_components.len() {
		out.push("..");
	}
	for component in &path_components[common..] {
		out.push(component.as_os_str());
	}
	out
}

/// Strip leading and trailing `/` (and `\`) from a context setting
pub fn trim_slashes(value: &str) -> &str {
	value.trim_matches(|c| c == '/' || c == '\\')
}

/// Make sure a remote root starts with `/`
pub fn absolute_remote_root(remote_path: &str) -> String {
	if remote_path.starts_with('/') {
		remote_path.to_string()
	} else {
		format!("/{}", remote_path)
	}
}

/// Join a remote root with a local relative path using `/` separators,
/// whatever the host separator is. Empty segments collapse; the result never
/// ends with `/` unless it is the root itself.
pub fn join_remote(root: &str, relative: &Path) -> String {
	let mut segments: Vec<String> =
		root.split('/').filter(|s| !s.is_empty()).map(|s| s.to_string()).collect();
	for component in relative.components() {
		match component {
			Component::Normal(s) => segments.push(s.to_string_lossy().into_owned()),
			Component::ParentDir => segments.push("..".to_string()),
			Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
		}
	}
	format!("/{}", segments.join("/"))
}

/// Parent directory of a remote path (`/` for top-level entries)
pub fn remote_parent(path: &str) -> String {
	match path.trim_end_matches('/').rfind('/') {
		Some(0) | None => "/".to_string(),
		Some(idx) => path[..idx].to_string(),
	}
}


// vim: ts=4
