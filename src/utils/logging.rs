//! Logging setup for the application.
//!
//! Configures `tracing_subscriber` with an environment-driven filter
//! (`RUST_LOG`, defaulting to `info`) and a compact stdout formatter.

use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Setup logging to stdout
pub fn setup_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
	setup_logging_with_writer(std::io::stdout)?;
	Ok(())
}

/// Setup logging with a custom writer, used by tests to capture output
pub fn setup_logging_with_writer<W>(
	writer: W,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>
where
	W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::registry()
		.with(filter)
		.with(
			fmt::layer().with_writer(writer).event_format(
				fmt::format()
					.with_level(true)
					.with_target(true)
					.with_ansi(true)
					.compact(),
			),
		)
		.try_init()?;
	Ok(())
}
