//! Protocol client error types.
//!
//! Transport failures are reported downstream as events, not returned to
//! callers; these errors cover the client lifecycle itself.

use log::error;
use std::{error::Error, fmt};

/// Errors that can occur while managing a node client
#[derive(Debug)]
pub enum ClientError {
	/// The streaming connection could not be established
	ConnectionError(String),
	/// The client was started twice or stopped before starting
	LifecycleError(String),
	/// Internal client fault
	InternalError(String),
}

impl ClientError {
	fn format_message(&self) -> String {
		match self {
			Self::ConnectionError(msg) => format!("Connection error: {}", msg),
			Self::LifecycleError(msg) => format!("Lifecycle error: {}", msg),
			Self::InternalError(msg) => format!("Internal error: {}", msg),
		}
	}

	/// Creates a new connection error with logging
	pub fn connection_error(msg: impl Into<String>) -> Self {
		let error = Self::ConnectionError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new lifecycle error with logging
	pub fn lifecycle_error(msg: impl Into<String>) -> Self {
		let error = Self::LifecycleError(msg.into());
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

impl fmt::Display for ClientError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl Error for ClientError {}
