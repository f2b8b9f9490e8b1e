//! Mock collaborators for testing.

use crate::backend::{TextStream, TransformBackend};
use crate::core::{PipelineRun, StepKind};
use crate::errors::{BackendError, PersistenceError};
use crate::storage::{RunId, RunStore};
use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// The scripted behavior of one backend call.
#[derive(Debug, Clone)]
pub struct ScriptedCall {
    fragments: Vec<String>,
    error: Option<BackendError>,
    delay: Option<Duration>,
}

impl ScriptedCall {
    /// A call that succeeds with a single fragment.
    #[must_use]
    pub fn output(text: impl Into<String>) -> Self {
        Self {
            fragments: vec![text.into()],
            error: None,
            delay: None,
        }
    }

    /// A call that succeeds, emitting the given fragments in order.
    #[must_use]
    pub fn fragments(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(ToString::to_string).collect(),
            error: None,
            delay: None,
        }
    }

    /// A call that fails outright.
    #[must_use]
    pub fn failure(error: BackendError) -> Self {
        Self {
            fragments: Vec::new(),
            error: Some(error),
            delay: None,
        }
    }

    /// A streaming call that emits some fragments, then fails mid-stream.
    /// In buffered mode the call fails outright (no partial success).
    #[must_use]
    pub fn failure_after(fragments: &[&str], error: BackendError) -> Self {
        Self {
            fragments: fragments.iter().map(ToString::to_string).collect(),
            error: Some(error),
            delay: None,
        }
    }

    /// Pauses before each fragment (and before a buffered result), so a
    /// test can observe the call genuinely in flight.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// A mock backend that replays a queued script, one entry per call, and
/// records every call it receives.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    script: Mutex<VecDeque<ScriptedCall>>,
    calls: Mutex<Vec<(StepKind, String)>>,
    healthy: AtomicBool,
    ping_count: AtomicUsize,
}

impl ScriptedBackend {
    /// Creates a healthy backend with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            healthy: AtomicBool::new(true),
            ping_count: AtomicUsize::new(0),
        }
    }

    /// Queues the next scripted call.
    pub fn push(&self, call: ScriptedCall) {
        self.script.lock().push_back(call);
    }

    /// Returns the recorded `(kind, input)` of every transformation call.
    #[must_use]
    pub fn calls(&self) -> Vec<(StepKind, String)> {
        self.calls.lock().clone()
    }

    /// Returns the number of transformation calls received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Sets whether `ping` succeeds.
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Returns the number of liveness probes received.
    #[must_use]
    pub fn ping_count(&self) -> usize {
        self.ping_count.load(Ordering::SeqCst)
    }

    fn next_call(&self, kind: StepKind, input: &str) -> ScriptedCall {
        self.calls.lock().push((kind, input.to_string()));
        self.script.lock().pop_front().unwrap_or_else(|| {
            ScriptedCall::failure(BackendError::transport("script exhausted"))
        })
    }
}

#[async_trait]
impl TransformBackend for ScriptedBackend {
    async fn run_buffered(&self, kind: StepKind, input: &str) -> Result<String, BackendError> {
        let call = self.next_call(kind, input);
        if let Some(delay) = call.delay {
            tokio::time::sleep(delay).await;
        }
        match call.error {
            Some(err) => Err(err),
            None => Ok(call.fragments.concat()),
        }
    }

    async fn run_streaming(&self, kind: StepKind, input: &str) -> Result<TextStream, BackendError> {
        let call = self.next_call(kind, input);
        let delay = call.delay;
        let mut items: Vec<Result<String, BackendError>> =
            call.fragments.into_iter().map(Ok).collect();
        if let Some(err) = call.error {
            items.push(Err(err));
        }
        let stream = futures::stream::iter(items).then(move |item| async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            item
        });
        Ok(stream.boxed())
    }

    async fn ping(&self) -> Result<(), BackendError> {
        self.ping_count.fetch_add(1, Ordering::SeqCst);
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BackendError::transport("backend offline"))
        }
    }
}

/// A mock store with togglable failure modes and full call recording.
#[derive(Debug, Default)]
pub struct MockRunStore {
    records: Mutex<Vec<PipelineRun>>,
    healthy: AtomicBool,
    reject_inserts: AtomicBool,
    ping_count: AtomicUsize,
}

impl MockRunStore {
    /// Creates a healthy, accepting store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            healthy: AtomicBool::new(true),
            reject_inserts: AtomicBool::new(false),
            ping_count: AtomicUsize::new(0),
        }
    }

    /// Sets whether `ping` succeeds.
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Sets whether inserts fail.
    pub fn set_reject_inserts(&self, reject: bool) {
        self.reject_inserts.store(reject, Ordering::SeqCst);
    }

    /// Returns every run handed to the store.
    #[must_use]
    pub fn inserted(&self) -> Vec<PipelineRun> {
        self.records.lock().clone()
    }

    /// Returns the number of stored runs.
    #[must_use]
    pub fn insert_count(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns the number of liveness probes received.
    #[must_use]
    pub fn ping_count(&self) -> usize {
        self.ping_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RunStore for MockRunStore {
    async fn insert_run(&self, run: &PipelineRun) -> Result<RunId, PersistenceError> {
        if self.reject_inserts.load(Ordering::SeqCst) {
            return Err(PersistenceError::new("insert rejected"));
        }
        let mut records = self.records.lock();
        records.push(run.clone());
        Ok(records.len() as RunId)
    }

    async fn ping(&self) -> Result<(), PersistenceError> {
        self.ping_count.fetch_add(1, Ordering::SeqCst);
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(PersistenceError::new("storage offline"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_backend_replays_in_order() {
        let backend = ScriptedBackend::new();
        backend.push(ScriptedCall::output("first"));
        backend.push(ScriptedCall::failure(BackendError::transport("down")));

        let out = backend.run_buffered(StepKind::CleanText, "in").await;
        assert_eq!(out.unwrap(), "first");

        let out = backend.run_buffered(StepKind::Summarize, "first").await;
        assert!(out.is_err());

        assert_eq!(backend.call_count(), 2);
        assert_eq!(backend.calls()[1], (StepKind::Summarize, "first".to_string()));
    }

    #[tokio::test]
    async fn test_scripted_backend_streams_fragments_then_error() {
        let backend = ScriptedBackend::new();
        backend.push(ScriptedCall::failure_after(
            &["a", "b"],
            BackendError::transport("cut off"),
        ));

        let stream = backend
            .run_streaming(StepKind::Summarize, "in")
            .await
            .unwrap();
        let items: Vec<_> = stream.collect().await;

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap(), "a");
        assert_eq!(items[1].as_ref().unwrap(), "b");
        assert!(items[2].is_err());
    }

    #[tokio::test]
    async fn test_exhausted_script_fails() {
        let backend = ScriptedBackend::new();
        let out = backend.run_buffered(StepKind::CleanText, "in").await;
        assert!(out.is_err());
    }

    #[tokio::test]
    async fn test_mock_store_toggles() {
        let store = MockRunStore::new();
        assert!(store.ping().await.is_ok());

        store.set_healthy(false);
        assert!(store.ping().await.is_err());
        assert_eq!(store.ping_count(), 2);

        store.set_reject_inserts(true);
        let err = store.insert_run(&PipelineRun::new(1, "x")).await;
        assert!(err.is_err());
        assert_eq!(store.insert_count(), 0);
    }
}
