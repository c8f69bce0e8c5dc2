//! Worker runtime primitives for the analysis engine.
//!
//! Every spawned task carries a [`TaskClass`] so traces show which pool did
//! the work. [`WorkerPool`] caps how many blocking jobs of one class run at
//! once; analyzers and mutation strategies are synchronous and run there.

mod class;
mod error;
mod pool;
mod spawn;

pub use class::TaskClass;
pub use error::WorkerError;
pub use pool::WorkerPool;
pub use spawn::{spawn, spawn_blocking};
