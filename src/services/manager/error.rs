//! Node manager error types.

use log::error;
use std::{error::Error, fmt};

/// Errors that can occur while managing the client fleet
#[derive(Debug)]
pub enum ManagerError {
	/// A protocol client could not be started
	StartError(String),
	/// Internal manager fault
	InternalError(String),
}

impl ManagerError {
	fn format_message(&self) -> String {
		match self {
			Self::StartError(msg) => format!("Start error: {}", msg),
			Self::InternalError(msg) => format!("Internal error: {}", msg),
		}
	}

	/// Creates a new start error with logging
	pub fn start_error(msg: impl Into<String>) -> Self {
		let error = Self::StartError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new internal error with logging
	pub fn internal_error(msg: impl Into<String>) -> Self {
		let error = Self::InternalError(msg.into());
		error!("{}", error.format_message());
		error
	}
}

impl fmt::Display for ManagerError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl Error for ManagerError {}
