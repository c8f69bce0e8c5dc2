//! Engine counters.
//!
//! [`EngineMetrics`] is shared between the coordinator task and its handle.
//! Counters use relaxed ordering; exact interleaving does not matter, totals do.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::analyzer::AnalysisTier;

#[derive(Debug, Default)]
pub struct EngineMetrics {
	/// Edit events that changed the text.
	pub edits_accepted: AtomicU64,
	/// Edit events with text identical to the last seen.
	pub edits_unchanged: AtomicU64,
	/// Edit events produced by our own mutations.
	pub edits_self_inflicted: AtomicU64,
	pub fast_dispatched: AtomicU64,
	pub slow_dispatched: AtomicU64,
	pub cache_hits: AtomicU64,
	pub cache_misses: AtomicU64,
	/// Completions discarded for carrying a superseded generation.
	pub stale_discarded: AtomicU64,
	/// Completions discarded inside a mutation grace window.
	pub grace_discarded: AtomicU64,
	pub analyzer_failures: AtomicU64,
	/// Findings dropped for ranges outside the snapshot.
	pub invalid_ranges: AtomicU64,
	pub mutations_applied: AtomicU64,
	pub mutations_failed: AtomicU64,
	pub render_panics: AtomicU64,
}

/// Point-in-time copy of [`EngineMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
	pub edits_accepted: u64,
	pub edits_unchanged: u64,
	pub edits_self_inflicted: u64,
	pub fast_dispatched: u64,
	pub slow_dispatched: u64,
	pub cache_hits: u64,
	pub cache_misses: u64,
	pub stale_discarded: u64,
	pub grace_discarded: u64,
	pub analyzer_failures: u64,
	pub invalid_ranges: u64,
	pub mutations_applied: u64,
	pub mutations_failed: u64,
	pub render_panics: u64,
}

fn bump(counter: &AtomicU64) {
	counter.fetch_add(1, Ordering::Relaxed);
}

impl EngineMetrics {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn inc_dispatched(&self, tier: AnalysisTier) {
		match tier {
			AnalysisTier::Fast => bump(&self.fast_dispatched),
			AnalysisTier::Slow => bump(&self.slow_dispatched),
		}
	}

	pub fn inc_cache(&self, hit: bool) {
		bump(if hit { &self.cache_hits } else { &self.cache_misses });
	}

	pub fn add_invalid_ranges(&self, count: usize) {
		if count > 0 {
			self.invalid_ranges.fetch_add(count as u64, Ordering::Relaxed);
		}
	}

	pub fn inc_edit(&self) {
		bump(&self.edits_accepted);
	}

	pub fn inc_unchanged(&self) {
		bump(&self.edits_unchanged);
	}

	pub fn inc_self_inflicted(&self) {
		bump(&self.edits_self_inflicted);
	}

	pub fn inc_stale(&self) {
		bump(&self.stale_discarded);
	}

	pub fn inc_grace_discarded(&self) {
		bump(&self.grace_discarded);
	}

	pub fn inc_analyzer_failure(&self) {
		bump(&self.analyzer_failures);
	}

	pub fn inc_mutation(&self, applied: bool) {
		bump(if applied { &self.mutations_applied } else { &self.mutations_failed });
	}

	pub fn inc_render_panic(&self) {
		bump(&self.render_panics);
	}

	pub fn snapshot(&self) -> MetricsSnapshot {
		let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
		MetricsSnapshot {
			edits_accepted: load(&self.edits_accepted),
			edits_unchanged: load(&self.edits_unchanged),
			edits_self_inflicted: load(&self.edits_self_inflicted),
			fast_dispatched: load(&self.fast_dispatched),
			slow_dispatched: load(&self.slow_dispatched),
			cache_hits: load(&self.cache_hits),
			cache_misses: load(&self.cache_misses),
			stale_discarded: load(&self.stale_discarded),
			grace_discarded: load(&self.grace_discarded),
			analyzer_failures: load(&self.analyzer_failures),
			invalid_ranges: load(&self.invalid_ranges),
			mutations_applied: load(&self.mutations_applied),
			mutations_failed: load(&self.mutations_failed),
			render_panics: load(&self.render_panics),
		}
	}

	/// Logs the current totals at debug level.
	pub fn emit(&self) {
		let m = self.snapshot();
		tracing::debug!(
			edits = m.edits_accepted,
			unchanged = m.edits_unchanged,
			self_inflicted = m.edits_self_inflicted,
			fast = m.fast_dispatched,
			slow = m.slow_dispatched,
			cache_hits = m.cache_hits,
			cache_misses = m.cache_misses,
			stale = m.stale_discarded,
			failures = m.analyzer_failures,
			mutations = m.mutations_applied,
			"engine.metrics"
		);
	}
}
