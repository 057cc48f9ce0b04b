//! Configuration loading for the arbitrage bot.
//!
//! Reads a TOML file, substitutes `${VAR}` placeholders from the process
//! environment, applies defaults and validates the result. Any failure here
//! is fatal at startup.

use regex::Regex;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

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

/// Configuration loader with environment variable substitution
#[derive(Debug, Default)]
pub struct ConfigLoader {
	file_path: Option<PathBuf>,
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_path_buf());
		self
	}

	pub async fn load(&self) -> Result<ArbConfig, ConfigError> {
		let file_path = self.file_path.as_ref().ok_or_else(|| {
			ConfigError::FileNotFound("No configuration file specified".to_string())
		})?;

		if !file_path.exists() {
			return Err(ConfigError::FileNotFound(file_path.display().to_string()));
		}

		info!(path = %file_path.display(), "Loading configuration");
		let content = tokio::fs::read_to_string(file_path).await?;
		self.parse(&content)
	}

	/// Parses and validates configuration text.
	pub fn parse(&self, content: &str) -> Result<ArbConfig, ConfigError> {
		let substituted = substitute_env_vars(content)?;

		let config: ArbConfig =
			toml::from_str(&substituted).map_err(|e| ConfigError::ParseError(e.to_string()))?;

		validate_config(&config)?;
		debug!(name = %config.arbitrage.name, "Configuration validated");
		Ok(config)
	}
}

fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
	let mut result = content.to_string();

	// ${VAR_NAME}
	let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::ParseError(e.to_string()))?;

	for cap in re.captures_iter(content) {
		let full_match = &cap[0];
		let var_name = &cap[1];

		let env_value =
			env::var(var_name).map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

		result = result.replace(full_match, &env_value);
	}

	Ok(result)
}

fn validate_config(config: &ArbConfig) -> Result<(), ConfigError> {
	if config.arbitrage.name.trim().is_empty() {
		return Err(invalid("arbitrage.name must not be empty"));
	}
	if config.arbitrage.poll_interval_ms == 0 {
		return Err(invalid("arbitrage.poll_interval_ms must be greater than 0"));
	}
	config.arbitrage.price_override()?;

	validate_private_key(&config.account.private_key)?;

	validate_http_url("chain.rpc_url", &config.chain.rpc_url)?;
	if config.chain.contract_address.is_zero() {
		return Err(invalid("chain.contract_address must not be the zero address"));
	}
	if config.chain.chain_id == Some(0) {
		return Err(invalid("chain.chain_id must be greater than 0"));
	}
	if config.chain.confirmation_timeout_secs == 0 {
		return Err(invalid("chain.confirmation_timeout_secs must be greater than 0"));
	}
	if config.chain.receipt_poll_interval_ms == 0 {
		return Err(invalid("chain.receipt_poll_interval_ms must be greater than 0"));
	}

	validate_http_url("feed.url", &config.feed.url)?;
	if config.feed.page_size == 0 {
		return Err(invalid("feed.page_size must be greater than 0"));
	}
	if config.feed.page_num == 0 {
		return Err(invalid("feed.page_num starts at 1"));
	}
	if config.feed.timeout_ms == 0 {
		return Err(invalid("feed.timeout_ms must be greater than 0"));
	}

	Ok(())
}

fn validate_private_key(key: &str) -> Result<(), ConfigError> {
	let key_without_prefix = key.strip_prefix("0x").unwrap_or(key);

	if key_without_prefix.len() != 64 {
		return Err(invalid(
			"account.private_key must be 64 hex characters (32 bytes)",
		));
	}
	if hex::decode(key_without_prefix).is_err() {
		return Err(invalid("account.private_key must be valid hexadecimal"));
	}

	Ok(())
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
	let url = url::Url::parse(value)
		.map_err(|e| ConfigError::ValidationError(format!("{} is not a valid URL: {}", field, e)))?;
	if !matches!(url.scheme(), "http" | "https") {
		return Err(ConfigError::ValidationError(format!(
			"{} must start with http:// or https://",
			field
		)));
	}
	Ok(())
}

fn invalid(message: &str) -> ConfigError {
	ConfigError::ValidationError(message.to_string())
}
