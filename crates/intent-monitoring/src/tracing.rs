use intent_config::LoggingConfig;
use std::str::FromStr;
use tracing::{info, span, Level, Span};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

/// Tracing configuration
#[derive(Debug, Clone)]
pub struct TracingConfig {
	pub level: Level,
	pub with_thread_ids: bool,
	pub with_file_and_line: bool,
	pub with_target: bool,
	pub with_span_events: FmtSpan,
	pub json_format: bool,
}

impl Default for TracingConfig {
	fn default() -> Self {
		Self {
			level: Level::INFO,
			with_thread_ids: false,
			with_file_and_line: true,
			with_target: true,
			with_span_events: FmtSpan::CLOSE,
			json_format: false,
		}
	}
}

impl TracingConfig {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds the subscriber settings from the `[logging]` section.
	pub fn from_logging(logging: &LoggingConfig) -> Result<Self, String> {
		let config = if logging.json {
			Self::production()
		} else {
			Self::default()
		};
		Ok(config.with_level(parse_level(&logging.level)?))
	}

	pub fn with_level(mut self, level: Level) -> Self {
		self.level = level;
		self
	}

	pub fn with_json_format(mut self, json: bool) -> Self {
		self.json_format = json;
		self
	}

	pub fn debug() -> Self {
		Self::default().with_level(Level::DEBUG)
	}

	pub fn production() -> Self {
		Self {
			level: Level::INFO,
			with_thread_ids: false,
			with_file_and_line: false,
			with_target: false,
			with_span_events: FmtSpan::NONE,
			json_format: true,
		}
	}

	fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
		let layer = tracing_subscriber::fmt::layer()
			.with_span_events(self.with_span_events.clone())
			.with_thread_ids(self.with_thread_ids)
			.with_file(self.with_file_and_line)
			.with_line_number(self.with_file_and_line)
			.with_target(self.with_target);

		if self.json_format {
			layer.json().boxed()
		} else {
			layer.pretty().boxed()
		}
	}
}

/// Parses a level name such as `"debug"` or `"WARN"`.
pub fn parse_level(level: &str) -> Result<Level, String> {
	Level::from_str(level.trim()).map_err(|_| format!("Unknown log level: {}", level))
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_tracing(config: TracingConfig) -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::registry()
		.with(config.fmt_layer())
		.with(LevelFilter::from_level(config.level))
		.try_init()
		.map_err(|e| format!("Failed to initialize tracing: {}", e))?;

	info!(max_level = %config.level, json = config.json_format, "Tracing initialized");
	Ok(())
}

/// Span wrapped around one declaration operation.
pub fn declaration_span(operation: &str, chain_id: u64) -> Span {
	span!(
		Level::INFO,
		"declaration_operation",
		operation = %operation,
		chain_id = chain_id
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_presets() {
		assert_eq!(TracingConfig::debug().level, Level::DEBUG);

		let production = TracingConfig::production();
		assert!(production.json_format);
		assert!(!production.with_target);
	}

	#[test]
	fn test_parse_level() {
		assert_eq!(parse_level("debug").unwrap(), Level::DEBUG);
		assert_eq!(parse_level(" WARN ").unwrap(), Level::WARN);
		assert!(parse_level("loud").is_err());
	}

	#[test]
	fn test_from_logging_section() {
		let config = TracingConfig::from_logging(&LoggingConfig::default()).unwrap();
		assert_eq!(config.level, Level::INFO);
		assert!(!config.json_format);

		let json = LoggingConfig {
			level: "trace".to_string(),
			json: true,
		};
		let config = TracingConfig::from_logging(&json).unwrap();
		assert_eq!(config.level, Level::TRACE);
		assert!(config.json_format);

		let unknown = LoggingConfig {
			level: "chatty".to_string(),
			json: false,
		};
		let err = TracingConfig::from_logging(&unknown).unwrap_err();
		assert!(err.contains("chatty"));
	}

	#[test]
	fn test_second_init_fails() {
		// Only one global subscriber may be installed per process.
		let _ = init_tracing(TracingConfig::debug());
		let second = init_tracing(TracingConfig::default().with_json_format(true));
		assert!(second.is_err());
	}

	#[test]
	fn test_declaration_span_enters() {
		let span = declaration_span("sign", 1);
		let _guard = span.enter();
	}
}
