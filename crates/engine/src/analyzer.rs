//! Analyzer seam and the job/completion records that cross the worker boundary.

use std::sync::Arc;
use std::time::{Duration, Instant};

use proofline_config::{AnalysisConfig, AnalyzerParams};
use proofline_primitives::{Finding, Generation, SurfaceId};

use crate::cache::CacheKey;
use crate::error::AnalyzerError;

/// Which analyzer produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisTier {
	/// Grammar and spelling, run on every edit.
	Fast,
	/// Style and meaning, debounced and gated on sentence shape.
	Slow,
}

impl AnalysisTier {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Fast => "fast",
			Self::Slow => "slow",
		}
	}
}

/// A text analyzer. Implementations are synchronous and run on a worker pool.
///
/// Offsets in returned findings are char offsets into `text`.
pub trait Analyzer: Send + Sync {
	fn name(&self) -> &str;

	fn analyze(&self, text: &str, params: &AnalyzerParams) -> Result<Vec<Finding>, AnalyzerError>;
}

/// One analysis request, tagged with the generation it was captured at.
#[derive(Debug, Clone)]
pub struct AnalysisJob {
	pub surface: SurfaceId,
	pub tier: AnalysisTier,
	pub generation: Generation,
	pub text: Arc<str>,
	pub key: CacheKey,
	pub params: AnalyzerParams,
	/// Settings snapshot taken when the cycle started. Filtering of this
	/// result uses it even if the live config changes meanwhile.
	pub config: Arc<AnalysisConfig>,
}

impl AnalysisJob {
	/// Runs `analyzer` inline and wraps the outcome.
	pub fn run(self, analyzer: &dyn Analyzer) -> AnalysisCompletion {
		let started = Instant::now();
		let result = analyzer.analyze(&self.text, &self.params);
		self.complete(result, started.elapsed())
	}

	pub fn complete(self, result: Result<Vec<Finding>, AnalyzerError>, elapsed: Duration) -> AnalysisCompletion {
		AnalysisCompletion {
			surface: self.surface,
			tier: self.tier,
			generation: self.generation,
			key: self.key,
			config: self.config,
			result,
			elapsed,
			from_cache: false,
		}
	}
}

/// Result of an [`AnalysisJob`], still tagged with its capture generation.
#[derive(Debug, Clone)]
pub struct AnalysisCompletion {
	pub surface: SurfaceId,
	pub tier: AnalysisTier,
	pub generation: Generation,
	pub key: CacheKey,
	pub config: Arc<AnalysisConfig>,
	pub result: Result<Vec<Finding>, AnalyzerError>,
	pub elapsed: Duration,
	/// Served from the result cache without running the analyzer.
	pub from_cache: bool,
}
