//! Engine tuning: thresholds, timers, cache sizes and worker pools.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Size and lifetime of one result cache tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheTierConfig {
	pub capacity: usize,
	pub ttl_secs: u64,
}

impl CacheTierConfig {
	pub const fn ttl(&self) -> Duration {
		Duration::from_secs(self.ttl_secs)
	}
}

/// Delays between the blocking steps of clipboard-based mutation strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MutationTimingConfig {
	pub activate_delay_ms: u64,
	pub paste_delay_ms: u64,
	pub clipboard_restore_delay_ms: u64,
}

impl Default for MutationTimingConfig {
	fn default() -> Self {
		Self {
			activate_delay_ms: 40,
			paste_delay_ms: 80,
			clipboard_restore_delay_ms: 120,
		}
	}
}

impl MutationTimingConfig {
	/// No delays; used by in-process surfaces and tests.
	pub const ZERO: Self = Self {
		activate_delay_ms: 0,
		paste_delay_ms: 0,
		clipboard_restore_delay_ms: 0,
	};

	pub const fn activate_delay(&self) -> Duration {
		Duration::from_millis(self.activate_delay_ms)
	}

	pub const fn paste_delay(&self) -> Duration {
		Duration::from_millis(self.paste_delay_ms)
	}

	pub const fn clipboard_restore_delay(&self) -> Duration {
		Duration::from_millis(self.clipboard_restore_delay_ms)
	}
}

/// Engine tuning knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
	/// Buffers shorter than this (in chars) always take the full fast path.
	pub size_threshold_chars: usize,
	/// An edit changing more chars than this is significant.
	pub significant_change_chars: usize,
	/// An edit changing more than this fraction of the previous length is significant.
	pub significant_change_ratio: f64,
	pub semantic_debounce_ms: u64,
	pub settle_window_ms: u64,
	pub geometry_poll_ms: u64,
	pub mutation_grace_ms: u64,
	pub fast_workers: usize,
	pub slow_workers: usize,
	pub fast_cache: CacheTierConfig,
	pub slow_cache: CacheTierConfig,
	pub mutation: MutationTimingConfig,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			size_threshold_chars: 10_000,
			significant_change_chars: 100,
			significant_change_ratio: 0.10,
			semantic_debounce_ms: 1_500,
			settle_window_ms: 250,
			geometry_poll_ms: 50,
			mutation_grace_ms: 600,
			fast_workers: 2,
			slow_workers: 1,
			fast_cache: CacheTierConfig {
				capacity: 256,
				ttl_secs: 300,
			},
			slow_cache: CacheTierConfig {
				capacity: 64,
				ttl_secs: 1_800,
			},
			mutation: MutationTimingConfig::default(),
		}
	}
}

impl EngineConfig {
	pub const fn semantic_debounce(&self) -> Duration {
		Duration::from_millis(self.semantic_debounce_ms)
	}

	pub const fn settle_window(&self) -> Duration {
		Duration::from_millis(self.settle_window_ms)
	}

	pub const fn geometry_poll(&self) -> Duration {
		Duration::from_millis(self.geometry_poll_ms)
	}

	pub const fn mutation_grace(&self) -> Duration {
		Duration::from_millis(self.mutation_grace_ms)
	}

	/// Rejects values the engine cannot operate with.
	pub fn validate(&self) -> Result<()> {
		if !(0.0..=1.0).contains(&self.significant_change_ratio) {
			return Err(ConfigError::Invalid {
				field: "engine.significant_change_ratio",
				reason: format!("{} is outside [0, 1]", self.significant_change_ratio),
			});
		}
		if self.fast_workers == 0 || self.slow_workers == 0 {
			return Err(ConfigError::Invalid {
				field: "engine.*_workers",
				reason: "worker pools need at least one worker".into(),
			});
		}
		if self.fast_cache.capacity == 0 || self.slow_cache.capacity == 0 {
			return Err(ConfigError::Invalid {
				field: "engine.*_cache.capacity",
				reason: "cache capacity must be > 0".into(),
			});
		}
		if self.geometry_poll_ms == 0 {
			return Err(ConfigError::Invalid {
				field: "engine.geometry_poll_ms",
				reason: "poll interval must be > 0".into(),
			});
		}
		Ok(())
	}
}
