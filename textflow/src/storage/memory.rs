//! In-process run store.

use super::{RunId, RunStore};
use crate::core::PipelineRun;
use crate::errors::PersistenceError;
use crate::utils::{now_utc, Timestamp};
use async_trait::async_trait;
use parking_lot::Mutex;

/// A persisted run record with its assigned id.
#[derive(Debug, Clone)]
pub struct StoredRun {
    /// The assigned run id.
    pub id: RunId,
    /// The run record as handed to the store.
    pub run: PipelineRun,
    /// When the record was written.
    pub created_at: Timestamp,
}

/// An in-process [`RunStore`] keeping records in a vec.
///
/// Used by tests and demos; the insert is atomic because the record is
/// cloned in full under one lock acquisition.
#[derive(Debug, Default)]
pub struct MemoryRunStore {
    records: Mutex<Vec<StoredRun>>,
}

impl MemoryRunStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all stored records in insertion order.
    #[must_use]
    pub fn runs(&self) -> Vec<StoredRun> {
        self.records.lock().clone()
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns true if nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl RunStore for MemoryRunStore {
    async fn insert_run(&self, run: &PipelineRun) -> Result<RunId, PersistenceError> {
        let mut records = self.records.lock();
        let id = records.len() as RunId + 1;
        records.push(StoredRun {
            id,
            run: run.clone(),
            created_at: now_utc(),
        });
        Ok(id)
    }

    async fn ping(&self) -> Result<(), PersistenceError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = MemoryRunStore::new();
        assert!(store.is_empty());

        let first = store.insert_run(&PipelineRun::new(1, "a")).await.unwrap();
        let second = store.insert_run(&PipelineRun::new(2, "b")).await.unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.runs()[1].run.input_text, "b");
    }

    #[tokio::test]
    async fn test_ping_succeeds() {
        let store = MemoryRunStore::new();
        assert!(store.ping().await.is_ok());
    }
}
