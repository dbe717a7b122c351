//! Configuration error types.
//!
//! Errors raised while loading and validating chain configuration files.

use log::error;
use std::{error::Error, fmt};

/// Errors that can occur during configuration operations
#[derive(Debug)]
pub enum ConfigError {
	/// A loaded configuration failed validation
	ValidationError(String),
	/// A configuration file could not be parsed
	ParseError(String),
	/// File system error while reading configuration
	FileError(String),
}

impl ConfigError {
	fn format_message(&self) -> String {
		match self {
			Self::ValidationError(msg) => format!("Validation error: {}", msg),
			Self::ParseError(msg) => format!("Parse error: {}", msg),
			Self::FileError(msg) => format!("File error: {}", msg),
		}
	}

	/// Create a new validation error and log it
	pub fn validation_error(msg: impl Into<String>) -> Self {
		let error = Self::ValidationError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Create a new parse error and log it
	pub fn parse_error(msg: impl Into<String>) -> Self {
		let error = Self::ParseError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Create a new file error and log it
	pub fn file_error(msg: impl Into<String>) -> Self {
		let error = Self::FileError(msg.into());
		error!("{}", error.format_message());
		error
	}
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
	fn from(err: std::io::Error) -> Self {
		Self::file_error(err.to_string())
	}
}

impl From<serde_json::Error> for ConfigError {
	fn from(err: serde_json::Error) -> Self {
		Self::parse_error(err.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_error_formatting() {
		assert_eq!(
			ConfigError::validation_error("nodes list is empty").to_string(),
			"Validation error: nodes list is empty"
		);
		assert_eq!(
			ConfigError::parse_error("unexpected token").to_string(),
			"Parse error: unexpected token"
		);
		assert_eq!(
			ConfigError::file_error("chains directory not found").to_string(),
			"File error: chains directory not found"
		);
	}

	#[test]
	fn test_io_error_conversion() {
		let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
		assert!(matches!(
			ConfigError::from(io_error),
			ConfigError::FileError(_)
		));
	}

	#[test]
	fn test_serde_error_conversion() {
		let serde_error = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
		assert!(matches!(
			ConfigError::from(serde_error),
			ConfigError::ParseError(_)
		));
	}
}
