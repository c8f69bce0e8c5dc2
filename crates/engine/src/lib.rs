//! Orchestration core for continuous text analysis.
//!
//! The [`Engine`] is the single writer of per-surface state: generations,
//! snapshots, canonical findings, presentation phase and pending mutations.
//! It is a synchronous state machine that turns [`EngineEvent`]s into
//! [`Effect`]s. The [`Coordinator`] wraps it in a tokio actor, runs analyzer
//! and mutation jobs on bounded worker pools and feeds their completions back
//! as events.
//!
//! Data flow per edit:
//!
//! 1. The observer reports new text. Unchanged text is a no-op.
//! 2. The surface generation is bumped and a snapshot captured.
//! 3. Fast analysis is dispatched (or served from cache); semantic analysis
//!    is debounced behind a sentence-shape gate.
//! 4. Completions for superseded generations are discarded.
//! 5. Current raw findings are merged and run through the filter pipeline.
//! 6. The presentation state machine decides what, if anything, is painted.

pub mod analyzer;
pub mod cache;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod mutation;
pub mod pipeline;
pub mod presentation;
pub mod scheduler;
pub mod staleness;
pub mod zones;

pub use analyzer::{AnalysisCompletion, AnalysisJob, AnalysisTier, Analyzer};
pub use cache::{CacheKey, ResultCache};
pub use coordinator::{Coordinator, CoordinatorDeps, CoordinatorHandle};
pub use engine::{Completion, Effect, Engine, EngineEvent, SurfaceView};
pub use error::{AnalyzerError, BackendError, CoordinatorError, MutationError, SurfaceError};
pub use metrics::{EngineMetrics, MetricsSnapshot};
pub use mutation::{MemoryBackend, MutationBackend, MutationChain, MutationOutcome, SurfaceCapabilities};
pub use pipeline::{DismissalLedger, Rejection, RejectionReason};
pub use presentation::{GeometryProbe, PresentationState, RenderFrame, Renderer, SurfaceEvent};
pub use zones::{BacktickZones, NoZones, ZoneProvider};

#[cfg(test)]
pub(crate) mod test_support;
