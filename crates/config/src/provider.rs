//! Pull-based access to the analysis settings in effect.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::analysis::AnalysisConfig;

/// Supplies the current analysis settings.
///
/// The engine reads this once when it dispatches an analysis cycle and keeps
/// the returned snapshot for the whole cycle.
pub trait ConfigProvider: Send + Sync {
	fn analysis(&self) -> Arc<AnalysisConfig>;
}

/// Lock-free, replaceable configuration cell.
#[derive(Debug)]
pub struct SharedConfig {
	inner: ArcSwap<AnalysisConfig>,
}

impl SharedConfig {
	pub fn new(config: AnalysisConfig) -> Self {
		Self {
			inner: ArcSwap::from_pointee(config.normalized()),
		}
	}

	/// Replaces the settings. Cycles already dispatched keep their old snapshot.
	pub fn store(&self, config: AnalysisConfig) {
		tracing::debug!("config.analysis.replaced");
		self.inner.store(Arc::new(config.normalized()));
	}

	/// Applies `f` to a copy of the current settings and stores the result.
	pub fn update(&self, f: impl FnOnce(&mut AnalysisConfig)) {
		let mut next = AnalysisConfig::clone(&self.inner.load());
		f(&mut next);
		self.store(next);
	}
}

impl Default for SharedConfig {
	fn default() -> Self {
		Self::new(AnalysisConfig::default())
	}
}

impl ConfigProvider for SharedConfig {
	fn analysis(&self) -> Arc<AnalysisConfig> {
		self.inner.load_full()
	}
}
