//! Durable storage for run records.
//!
//! The engine treats storage as an opaque collaborator: one atomic insert
//! per terminated run, plus a liveness probe for the health cache.

mod memory;

pub use memory::{MemoryRunStore, StoredRun};

use crate::core::PipelineRun;
use crate::errors::PersistenceError;
use async_trait::async_trait;

/// Identifier assigned to a persisted run record.
pub type RunId = i64;

/// Trait for run-record stores.
#[async_trait]
pub trait RunStore: Send + Sync {
    /// Records a terminated run as a single durable record.
    ///
    /// Must be atomic: either the whole record (including the full results
    /// collection) is written, or nothing is.
    async fn insert_run(&self, run: &PipelineRun) -> Result<RunId, PersistenceError>;

    /// Cheap liveness probe for health checks.
    async fn ping(&self) -> Result<(), PersistenceError>;
}
