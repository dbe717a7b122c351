//! Error types for repository operations.
//!
//! Provides a consistent error surface for configuration-backed
//! repositories: load failures, validation failures, and internal faults.

use log::error;
use std::{error::Error, fmt};

/// Errors that can occur during repository operations
#[derive(Debug)]
pub enum RepositoryError {
	/// Loaded configuration failed validation
	ValidationError(String),
	/// Configurations could not be loaded from disk
	LoadError(String),
	/// Internal repository fault
	InternalError(String),
}

impl RepositoryError {
	fn format_message(&self) -> String {
		match self {
			Self::ValidationError(msg) => format!("Validation error: {}", msg),
			Self::LoadError(msg) => format!("Load error: {}", msg),
			Self::InternalError(msg) => format!("Internal error: {}", msg),
		}
	}

	/// Create a new validation error and log it
	pub fn validation_error(msg: impl Into<String>) -> Self {
		let error = Self::ValidationError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Create a new load error and log it
	pub fn load_error(msg: impl Into<String>) -> Self {
		let error = Self::LoadError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Create a new internal error and log it
	pub fn internal_error(msg: impl Into<String>) -> Self {
		let error = Self::InternalError(msg.into());
		error!("{}", error.format_message());
		error
	}
}

impl fmt::Display for RepositoryError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl Error for RepositoryError {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_error_formatting() {
		assert_eq!(
			RepositoryError::load_error("failed to load chains").to_string(),
			"Load error: failed to load chains"
		);
		assert_eq!(
			RepositoryError::validation_error("bad slug").to_string(),
			"Validation error: bad slug"
		);
		assert_eq!(
			RepositoryError::internal_error("poisoned state").to_string(),
			"Internal error: poisoned state"
		);
	}
}
