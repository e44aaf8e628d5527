// intent-config/src/lib.rs

use regex::Regex;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

mod types;

pub use types::*;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

impl From<ConfigError> for intent_types::DeclarationError {
	fn from(err: ConfigError) -> Self {
		intent_types::DeclarationError::Config(err.to_string())
	}
}

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
	file_path: Option<String>,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "INTENT_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_string_lossy().to_string());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub async fn load(&self) -> Result<ProtocolConfig, ConfigError> {
		let file_path = self.file_path.as_ref().ok_or_else(|| {
			ConfigError::FileNotFound("No configuration file specified".to_string())
		})?;

		if !Path::new(file_path).exists() {
			return Err(ConfigError::FileNotFound(file_path.clone()));
		}

		let content = tokio::fs::read_to_string(file_path).await?;
		debug!("Loaded configuration from {}", file_path);
		self.load_from_str(&content)
	}

	/// Parses, overrides and validates a configuration held in memory.
	pub fn load_from_str(&self, content: &str) -> Result<ProtocolConfig, ConfigError> {
		let substituted = self.substitute_env_vars(content)?;

		let mut config: ProtocolConfig =
			toml::from_str(&substituted).map_err(|e| ConfigError::ParseError(e.to_string()))?;

		self.apply_env_overrides(&mut config)?;
		validate_config(&config)?;

		Ok(config)
	}

	fn substitute_env_vars(&self, content: &str) -> Result<String, ConfigError> {
		let mut result = content.to_string();

		// Find and replace ${VAR_NAME} patterns
		let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::ParseError(e.to_string()))?;

		for cap in re.captures_iter(content) {
			let full_match = &cap[0];
			let var_name = &cap[1];

			let env_value = env::var(var_name)
				.map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

			result = result.replace(full_match, &env_value);
		}

		Ok(result)
	}

	fn apply_env_overrides(&self, config: &mut ProtocolConfig) -> Result<(), ConfigError> {
		if let Ok(name) = env::var(format!("{}DOMAIN_NAME", self.env_prefix)) {
			config.domain.name = name;
		}

		if let Ok(version) = env::var(format!("{}DOMAIN_VERSION", self.env_prefix)) {
			config.domain.version = version;
		}

		if let Ok(flag) = env::var(format!("{}ALLOW_REQUIRE_ONLY_INTENTS", self.env_prefix)) {
			config.validation.allow_require_only_intents = flag.parse().map_err(|e| {
				ConfigError::ValidationError(format!(
					"Invalid value for allow_require_only_intents: {}",
					e
				))
			})?;
		}

		Ok(())
	}
}

fn validate_config(config: &ProtocolConfig) -> Result<(), ConfigError> {
	if config.domain.name.trim().is_empty() {
		return Err(ConfigError::ValidationError(
			"domain.name must not be empty".to_string(),
		));
	}

	if config.domain.version.trim().is_empty() {
		return Err(ConfigError::ValidationError(
			"domain.version must not be empty".to_string(),
		));
	}

	if config.account.init_code_template.is_empty() {
		return Err(ConfigError::ValidationError(
			"account.init_code_template must not be empty".to_string(),
		));
	}

	Ok(())
}
