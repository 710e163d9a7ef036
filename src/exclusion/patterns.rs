//! Glob matching for ignore patterns

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::Path;

use crate::error::ConfigError;

/// Compiled ignore patterns
#[derive(Debug, Clone)]
pub struct PatternMatcher {
	/// Original pattern strings, in configured order
	patterns: Vec<String>,

	/// Compiled set
	set: GlobSet,
}

impl PatternMatcher {
	/// Compile a pattern list.
	///
	/// `*` and `?` match dotfiles but never cross `/`; `**` spans directories.
	pub fn new(patterns: &[String]) -> Result<Self, ConfigError> {
		let mut builder = GlobSetBuilder::new();

		for pattern in patterns {
			let glob = GlobBuilder::new(pattern).literal_separator(true).build().map_err(|e| {
				ConfigError::InvalidPattern { pattern: pattern.clone(), message: e.to_string() }
			})?;
			builder.add(glob);
		}

		let set = builder.build().map_err(|e| ConfigError::InvalidPattern {
			pattern: patterns.join(", "),
			message: e.to_string(),
		})?;

		Ok(Self { patterns: patterns.to_vec(), set })
	}

	/// Pattern strings this matcher was built from
	pub fn patterns(&self) -> &[String] {
		&self.patterns
	}

	/// Check a workspace-relative path against every pattern, also testing each
	/// ancestor directory of the path
	pub fn is_ignored(&self, relative: &Path) -> bool {
		relative
			.ancestors()
			.filter(|p| !p.as_os_str().is_empty())
			.any(|p| self.set.is_match(p))
	}
}


// vim: ts=4
