//! Filter error types.

use log::error;
use std::{error::Error, fmt};

/// Errors that can occur while filtering reports
#[derive(Debug)]
pub enum FilterError {
	/// A transaction height could not be parsed. This violates the
	/// monotonicity watermark's schema assumption and is treated as
	/// fatal by the orchestrator.
	HeightParseError(String),
	/// Internal filter fault
	InternalError(String),
}

impl FilterError {
	fn format_message(&self) -> String {
		match self {
			Self::HeightParseError(msg) => format!("Height parse error: {}", msg),
			Self::InternalError(msg) => format!("Internal error: {}", msg),
		}
	}

	/// Creates a new height parse error with logging
	pub fn height_parse_error(msg: impl Into<String>) -> Self {
		let error = Self::HeightParseError(msg.into());
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

impl fmt::Display for FilterError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl Error for FilterError {}
