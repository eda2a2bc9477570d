//! Logging setup for the service.
//!
//! Uses `tracing_subscriber` with an env-derived filter. Logs go to stdout
//! by default; setting `LOG_MODE=file` switches to a daily-rolling file
//! under `LOG_DATA_DIR` (default `logs/`).

use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Setup logging according to `LOG_MODE` / `LOG_LEVEL` / `LOG_DATA_DIR`.
pub fn setup_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
	if std::env::var("LOG_MODE").map(|v| v == "file").unwrap_or(false) {
		let log_dir = std::env::var("LOG_DATA_DIR").unwrap_or_else(|_| "logs".to_string());
		let appender = tracing_appender::rolling::daily(log_dir, "deposit-monitor.log");
		setup_logging_with_writer(appender)
	} else {
		setup_logging_with_writer(std::io::stdout)
	}
}

/// Setup logging with a custom writer. Used directly by tests to capture
/// output.
pub fn setup_logging_with_writer<W>(
	writer: W,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>
where
	W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
		EnvFilter::new(level)
	});

	tracing_subscriber::registry()
		.with(filter)
		.with(
			fmt::layer()
				.with_writer(writer)
				.event_format(
					fmt::format()
						.with_level(true)
						.with_target(true)
						.with_thread_ids(false)
						.with_thread_names(false)
						.with_ansi(true)
						.compact(),
				)
				.fmt_fields(fmt::format::PrettyFields::new()),
		)
		.try_init()?;
	Ok(())
}
