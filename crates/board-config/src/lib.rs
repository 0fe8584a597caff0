//! Configuration module for the order board engine.
//!
//! This module provides structures and utilities for managing board
//! configuration. It supports loading configuration from TOML files with
//! `${VAR}` / `${VAR:-default}` environment-variable resolution, and
//! validates that all required values are properly set.

use board_types::{StatusFilter, StatusRollup};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the board engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration for the engine itself: polling, pagination,
	/// filtering and roll-up behavior.
	pub board: BoardConfig,
	/// Configuration for the backend the engine polls and mutates.
	pub backend: BackendConfig,
	/// Configuration for the HTTP surface exposed to a display layer.
	pub api: Option<ApiConfig>,
}

/// Engine configuration: one instance is scoped to one restaurant.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BoardConfig {
	/// Restaurant scope used in every transition URL.
	pub restaurant_id: String,
	/// Seconds between poll cycles.
	#[serde(default = "default_poll_interval_seconds")]
	pub poll_interval_seconds: u64,
	/// Page size requested until the first "load more".
	#[serde(default = "default_initial_limit")]
	pub initial_limit: usize,
	/// How much each "load more" grows the requested page size.
	#[serde(default = "default_load_more_increment")]
	pub load_more_increment: usize,
	/// Overall statuses requested from the backend. Defaults to all.
	#[serde(default)]
	pub statuses: StatusFilter,
	/// Who derives the overall status from category completion.
	#[serde(default)]
	pub status_rollup: StatusRollup,
}

/// Returns the default poll period in seconds.
///
/// The board refreshed every 3 seconds in production; the fixed interval
/// doubles as the retry policy, so it stays short.
fn default_poll_interval_seconds() -> u64 {
	3
}

/// Returns the default initial page size.
fn default_initial_limit() -> usize {
	20
}

/// Returns the default "load more" increment.
fn default_load_more_increment() -> usize {
	10
}

/// Configuration for the order backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
	/// Base URL of the restaurant backend.
	pub url: String,
	/// Per-request timeout in seconds.
	#[serde(default = "default_request_timeout_seconds")]
	pub request_timeout_seconds: u64,
}

/// Returns the default backend request timeout in seconds.
fn default_request_timeout_seconds() -> u64 {
	10
}

/// Configuration for the HTTP surface serving the board view.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default)]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

/// Returns the default API host.
fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

/// Returns the default API port.
fn default_api_port() -> u16 {
	3000
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable
/// VAR_NAME. Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => {
				if let Some(default) = default_value {
					default.to_string()
				} else {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)));
				}
			}
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a TOML file, resolving environment
	/// variables and validating the result.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let contents = tokio::fs::read_to_string(path).await?;
		contents.parse()
	}

	/// Validates the configuration to ensure all required fields are
	/// properly set.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.board.restaurant_id.is_empty() {
			return Err(ConfigError::Validation(
				"Restaurant ID cannot be empty".into(),
			));
		}
		if self.board.poll_interval_seconds == 0 {
			return Err(ConfigError::Validation(
				"poll_interval_seconds must be greater than 0".into(),
			));
		}
		if self.board.initial_limit == 0 {
			return Err(ConfigError::Validation(
				"initial_limit must be greater than 0".into(),
			));
		}
		if self.board.load_more_increment == 0 {
			return Err(ConfigError::Validation(
				"load_more_increment must be greater than 0".into(),
			));
		}
		if self.board.statuses.is_empty() {
			return Err(ConfigError::Validation(
				"statuses filter cannot be empty".into(),
			));
		}

		if self.backend.url.is_empty() {
			return Err(ConfigError::Validation("Backend URL cannot be empty".into()));
		}
		if !self.backend.url.starts_with("http://") && !self.backend.url.starts_with("https://") {
			return Err(ConfigError::Validation(format!(
				"Backend URL must be http(s), got '{}'",
				self.backend.url
			)));
		}
		if self.backend.request_timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"request_timeout_seconds must be greater than 0".into(),
			));
		}

		Ok(())
	}
}

/// Implementation of FromStr trait for Config to enable parsing from
/// string.
///
/// Environment variables are resolved and the configuration is
/// automatically validated after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
