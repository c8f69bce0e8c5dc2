use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("cannot read config {path}: {error}")]
	Io { path: PathBuf, error: std::io::Error },

	/// Bad syntax, unknown keys or wrong value types.
	#[error("malformed config: {0}")]
	Toml(#[from] toml::de::Error),

	/// Parsed, but rejected by validation.
	#[error("invalid value for `{field}`: {reason}")]
	Invalid { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
