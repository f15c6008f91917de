//! Per-service resource pools.
//!
//! * [`ObjectPool`] holds the engine instances of a service. Acquiring an
//!   instance waits while all are busy, which is what pushes back on
//!   upstream publishers.
//! * [`WorkerPool`] runs a fixed number of tasks draining a bounded queue.

mod object_pool;
mod worker_pool;

pub use object_pool::{ObjectPool, Pooled, PooledAll};
pub use worker_pool::WorkerPool;
