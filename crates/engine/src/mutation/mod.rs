//! Writes accepted suggestions back into the live surface.
//!
//! A [`MutationChain`] tries its strategies in order until one succeeds:
//! direct range replace, clipboard paste over a selection, and whole-buffer
//! rebuild for surfaces whose range edits cannot be trusted. The chain runs
//! on the mutation pool; the engine patches its own state once the outcome is
//! back on the coordinator.

use proofline_config::MutationTimingConfig;
use proofline_primitives::{Finding, SurfaceId};

use crate::error::{BackendError, MutationError};

mod backend;
mod memory;
mod strategy;

pub use backend::{MutationBackend, SurfaceCapabilities};
pub use memory::MemoryBackend;
pub use strategy::{BufferRebuild, ClipboardPaste, DirectReplace, MutationStrategy, StrategyKind};

/// Identifies one accepted suggestion from request to outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MutationTicket(pub u64);

/// A suggestion to write into a surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRequest {
	pub surface: SurfaceId,
	pub finding: Finding,
	pub suggestion: String,
	/// Text the finding covered when it was computed.
	pub original: String,
}

/// Record of a strategy that did not apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyAttempt {
	Skipped { strategy: StrategyKind, reason: &'static str },
	Failed { strategy: StrategyKind, error: BackendError },
}

/// A successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
	pub strategy: StrategyKind,
	/// Strategies tried before the one that worked.
	pub attempts: Vec<StrategyAttempt>,
}

pub type MutationOutcome = Result<Applied, MutationError>;

/// Ordered list of strategies, first success wins.
pub struct MutationChain {
	strategies: Vec<Box<dyn MutationStrategy>>,
	timing: MutationTimingConfig,
}

impl MutationChain {
	/// Direct replace, then clipboard paste, then buffer rebuild.
	pub fn new(timing: MutationTimingConfig) -> Self {
		Self::with_strategies(vec![Box::new(DirectReplace), Box::new(ClipboardPaste), Box::new(BufferRebuild)], timing)
	}

	pub fn with_strategies(strategies: Vec<Box<dyn MutationStrategy>>, timing: MutationTimingConfig) -> Self {
		Self { strategies, timing }
	}

	pub fn apply(&self, backend: &dyn MutationBackend, request: &MutationRequest) -> MutationOutcome {
		let caps = backend.capabilities(request.surface)?;
		let mut attempts = Vec::new();

		for strategy in &self.strategies {
			let kind = strategy.kind();
			if let Err(reason) = strategy.precondition(&caps) {
				tracing::trace!(strategy = kind.as_str(), reason, "mutation.strategy.skipped");
				attempts.push(StrategyAttempt::Skipped { strategy: kind, reason });
				continue;
			}
			match strategy.try_apply(backend, request, &self.timing) {
				Ok(()) => {
					tracing::debug!(surface = %request.surface, strategy = kind.as_str(), "mutation.strategy.applied");
					return Ok(Applied { strategy: kind, attempts });
				}
				Err(error) => {
					tracing::warn!(surface = %request.surface, strategy = kind.as_str(), %error, "mutation.strategy.failed");
					attempts.push(StrategyAttempt::Failed { strategy: kind, error });
				}
			}
		}

		Err(MutationError::AllStrategiesFailed { attempts })
	}
}

/// Carries findings computed on the pre-mutation text over to the text after
/// `applied` was replaced by `replacement_len` chars.
///
/// The applied finding is removed, findings starting at or after its end are
/// shifted by the length difference, findings entirely before it are kept
/// and findings overlapping it are dropped.
pub fn reconcile(findings: &mut Vec<Finding>, applied: &Finding, replacement_len: usize) {
	let delta = replacement_len as isize - applied.len() as isize;
	let mut removed = false;
	findings.retain_mut(|f| {
		if !removed && f.same_report(applied) {
			removed = true;
			return false;
		}
		if f.start >= applied.end {
			f.shift(delta);
			return true;
		}
		f.end <= applied.start
	});
}
