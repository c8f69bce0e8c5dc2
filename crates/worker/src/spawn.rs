use std::future::Future;

use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::TaskClass;

fn class_span(class: TaskClass) -> tracing::Span {
	tracing::debug_span!("worker", class = class.as_str())
}

/// Spawns `fut` on the current runtime inside a span tagged with `class`.
///
/// Panics outside a tokio runtime, like [`tokio::spawn`].
pub fn spawn<F>(class: TaskClass, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	tokio::spawn(fut.instrument(class_span(class)))
}

/// Runs `f` on tokio's blocking pool inside a span tagged with `class`.
pub fn spawn_blocking<F, R>(class: TaskClass, f: F) -> JoinHandle<R>
where
	F: FnOnce() -> R + Send + 'static,
	R: Send + 'static,
{
	let span = class_span(class);
	tokio::task::spawn_blocking(move || span.in_scope(f))
}
