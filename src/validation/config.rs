//! Configuration validation functions

use super::Validator;
use crate::config::SftpConfig;
use crate::error::ConfigError;

/// Fail with `MissingField` when `value` is empty or whitespace
pub fn validate_required(field: &'static str, value: &str) -> Result<(), ConfigError> {
	if value.trim().is_empty() {
		return Err(ConfigError::MissingField { field });
	}
	Ok(())
}

/// At least one of password and private key path must be set and non-empty
pub fn validate_credentials(
	password: Option<&str>,
	private_key_path: Option<&str>,
) -> Result<(), ConfigError> {
	let has_password = password.map_or(false, |p| !p.is_empty());
	let has_key = private_key_path.map_or(false, |p| !p.trim().is_empty());
	if !has_password && !has_key {
		return Err(ConfigError::NoCredential);
	}
	Ok(())
}

/// Port 0 is never valid for a client connection
pub fn validate_port(port: Option<u16>) -> Result<(), ConfigError> {
	if port == Some(0) {
		return Err(ConfigError::Invalid { message: "port must be between 1 and 65535".to_string() });
	}
	Ok(())
}

impl Validator for SftpConfig {
	fn validate(&self) -> Result<(), ConfigError> {
		validate_required("host", &self.host)?;
		validate_required("username", &self.username)?;
		validate_required("remotePath", &self.remote_path)?;
		validate_credentials(self.password.as_deref(), self.private_key_path.as_deref())?;
		validate_port(self.port)?;
		Ok(())
	}
}


// vim: ts=4
