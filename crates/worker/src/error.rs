use thiserror::Error;

/// Failure to run a job on a [`crate::WorkerPool`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkerError {
	/// The pool was closed before the job could start.
	#[error("worker pool `{0}` is closed")]
	Closed(&'static str),
	/// The job panicked. The pool itself keeps running.
	#[error("job on `{pool}` panicked: {message}")]
	Panicked { pool: &'static str, message: String },
	/// The blocking task was cancelled by runtime shutdown.
	#[error("job on `{0}` was cancelled")]
	Cancelled(&'static str),
}
