//! Configuration for proofline.
//!
//! Configuration is a single TOML file with two tables:
//!
//! - **`[analysis]`**: what to check and what to ignore (categories, ignored
//!   rules and texts, vocabulary, dialect, excluded languages, semantic gate)
//! - **`[engine]`**: scheduling thresholds, timers, cache tiers, worker pools
//!
//! Every field is optional. Cache tier tables (`[engine.fast_cache]`,
//! `[engine.slow_cache]`) must give both `capacity` and `ttl_secs` when present.
//!
//! ```toml
//! [analysis]
//! dialect = "british"
//! enabled_categories = ["spelling", "grammar"]
//! vocabulary = ["kubernetes"]
//!
//! [analysis.semantic]
//! min_words = 6
//!
//! [engine]
//! semantic_debounce_ms = 2000
//! ```
//!
//! The default location is `$XDG_CONFIG_HOME/proofline/config.toml`.

pub mod analysis;
pub mod engine;
pub mod error;
pub mod provider;

use std::path::{Path, PathBuf};

pub use analysis::{AnalysisConfig, AnalyzerParams, Dialect, EXCLUDABLE_LANGUAGES, SemanticConfig, Wordlist};
pub use engine::{CacheTierConfig, EngineConfig, MutationTimingConfig};
pub use error::{ConfigError, Result};
pub use provider::{ConfigProvider, SharedConfig};
use serde::{Deserialize, Serialize};

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	pub analysis: AnalysisConfig,
	pub engine: EngineConfig,
}

impl Config {
	/// Parses and validates configuration from a TOML string.
	pub fn from_toml_str(input: &str) -> Result<Self> {
		let mut config: Config = toml::from_str(input)?;
		config.analysis.normalize();
		config.analysis.validate()?;
		config.engine.validate()?;
		Ok(config)
	}

	/// Loads configuration from a file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		let config = Self::from_toml_str(&input)?;
		tracing::debug!(path = %path.display(), "config.loaded");
		Ok(config)
	}

	/// Loads the default config file, falling back to defaults if it does not exist.
	pub fn load_default() -> Result<Self> {
		match default_path() {
			Some(path) if path.exists() => Self::load(path),
			_ => Ok(Self::default()),
		}
	}
}

/// Returns `$XDG_CONFIG_HOME/proofline/config.toml` (platform equivalent).
pub fn default_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("proofline").join("config.toml"))
}
