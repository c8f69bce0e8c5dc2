use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::{TaskClass, WorkerError, spawn_blocking};

/// Bounded pool for blocking jobs of one [`TaskClass`].
///
/// At most `size` jobs run at once; further callers wait for a permit. Jobs
/// are never preempted: dropping the future returned by [`WorkerPool::run`]
/// after the job started only abandons its result.
#[derive(Debug, Clone)]
pub struct WorkerPool {
	name: &'static str,
	class: TaskClass,
	size: usize,
	permits: Arc<Semaphore>,
}

impl WorkerPool {
	pub fn new(class: TaskClass, size: usize) -> Self {
		let size = size.max(1);
		Self {
			name: class.as_str(),
			class,
			size,
			permits: Arc::new(Semaphore::new(size)),
		}
	}

	pub fn class(&self) -> TaskClass {
		self.class
	}

	pub fn size(&self) -> usize {
		self.size
	}

	/// Runs `f` on the blocking pool once a permit is available.
	pub async fn run<F, R>(&self, f: F) -> Result<R, WorkerError>
	where
		F: FnOnce() -> R + Send + 'static,
		R: Send + 'static,
	{
		let permit = Arc::clone(&self.permits)
			.acquire_owned()
			.await
			.map_err(|_| WorkerError::Closed(self.name))?;

		let handle = spawn_blocking(self.class, move || {
			let _permit = permit;
			f()
		});

		match handle.await {
			Ok(value) => Ok(value),
			Err(err) if err.is_panic() => {
				let payload = err.into_panic();
				let message = payload
					.downcast_ref::<&str>()
					.map(|s| (*s).to_string())
					.or_else(|| payload.downcast_ref::<String>().cloned())
					.unwrap_or_else(|| "non-string panic payload".to_string());
				tracing::warn!(pool = self.name, %message, "worker.pool.panic");
				Err(WorkerError::Panicked { pool: self.name, message })
			}
			Err(_) => Err(WorkerError::Cancelled(self.name)),
		}
	}

	/// Stops admitting new jobs. Running jobs finish normally.
	pub fn close(&self) {
		self.permits.close();
	}
}
