//! Centralized validation for zed-sftp
//!
//! This module provides common validation functions and traits for:
//! - Configuration validation (required fields, credentials, ports)
//! - Path validation (traversal, normalization, context containment, remote joins)

use crate::error::ConfigError;

pub mod config;
pub mod path;

pub use config::*;
pub use path::*;

/// Trait for validatable types
pub trait Validator {
	/// Validate this type
	/// Returns Ok(()) if valid, Err(ConfigError) naming the first problem found
	fn validate(&self) -> Result<(), ConfigError>;
}

// vim: ts=4
