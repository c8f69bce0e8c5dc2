use proofline_primitives::{Generation, SurfaceId};
use thiserror::Error;

use crate::mutation::StrategyAttempt;

/// Failure reported by an analyzer. The previous canonical findings are kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyzerError {
	/// The analyzer cannot run at all right now (missing model, offline service).
	#[error("analyzer unavailable: {0}")]
	Unavailable(String),
	#[error("analysis failed: {0}")]
	Failed(String),
}

/// The observed surface cannot be read or measured.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
	#[error("{0} is not accessible")]
	Unavailable(SurfaceId),
}

/// A single primitive operation on a surface failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
	#[error("operation not supported: {0}")]
	Unsupported(&'static str),
	#[error("surface rejected {op}: {reason}")]
	Rejected { op: &'static str, reason: String },
	#[error("clipboard unavailable: {0}")]
	Clipboard(String),
	#[error(transparent)]
	Surface(#[from] SurfaceError),
}

/// Why an accepted suggestion was not written into the surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
	/// The finding is not part of the surface's current canonical set.
	#[error("finding is not in the current canonical set")]
	UnknownFinding,
	/// The finding was computed against an older snapshot.
	#[error("finding belongs to {finding_revision}, surface is at {current}")]
	StaleFinding { finding_revision: Generation, current: Generation },
	#[error("finding range {start}..{end} does not fit the current text")]
	InvalidRange { start: usize, end: usize },
	/// Another mutation on the same surface has not resolved yet.
	#[error("a mutation is already in flight on this surface")]
	Busy,
	#[error(transparent)]
	Surface(#[from] SurfaceError),
	#[error("every mutation strategy failed ({} attempted)", attempts.len())]
	AllStrategiesFailed { attempts: Vec<StrategyAttempt> },
	/// The mutation job never ran to completion.
	#[error("mutation worker failed: {0}")]
	Worker(String),
}

/// The coordinator actor is gone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
	#[error("coordinator is shut down")]
	Closed,
}
