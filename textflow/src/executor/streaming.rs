//! Streaming execution with incremental event emission.

use super::finalize_output;
use crate::backend::TransformBackend;
use crate::core::{PipelineRun, StepResult, WorkflowId, WorkflowStep};
use crate::events::ExecutionEvent;
use crate::storage::RunStore;
use futures::channel::mpsc::{self, UnboundedSender};
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Drives a run in streaming mode, emitting ordered [`ExecutionEvent`]s and
/// persisting the run record before the terminal event.
///
/// Events within one run are strictly ordered as produced. Independent runs
/// share nothing but the store's own concurrency guarantees.
pub struct StreamingRunEmitter {
    backend: Arc<dyn TransformBackend>,
    store: Arc<dyn RunStore>,
}

/// What became of one streamed step.
enum StepOutcome {
    /// The fragment stream was exhausted; output has the trim rule applied.
    Completed(String),
    /// The backend failed, either opening the stream or mid-stream.
    Failed(String),
    /// The caller went away mid-stream; the step produces no result.
    Abandoned,
}

impl StreamingRunEmitter {
    /// Creates a new emitter over a backend and a run store.
    #[must_use]
    pub fn new(backend: Arc<dyn TransformBackend>, store: Arc<dyn RunStore>) -> Self {
        Self { backend, store }
    }

    /// Starts a run and returns its ordered event stream.
    ///
    /// The run executes on a spawned task; dropping the returned stream
    /// stops further backend calls as soon as practical, but whatever
    /// results were accumulated are still persisted. The terminal event
    /// (`RunCompleted` or `RunFailed`) is emitted only after the durable
    /// write returned, so receiving it proves the run's persistence state.
    ///
    /// Must be called from within a tokio runtime.
    pub fn stream(
        &self,
        pipeline_id: WorkflowId,
        steps: Vec<WorkflowStep>,
        seed_input: impl Into<String>,
    ) -> impl Stream<Item = ExecutionEvent> {
        let (tx, rx) = mpsc::unbounded();
        let backend = Arc::clone(&self.backend);
        let store = Arc::clone(&self.store);
        let seed_input = seed_input.into();

        tokio::spawn(async move {
            drive_run(backend, store, pipeline_id, steps, seed_input, tx).await;
        });

        rx
    }
}

/// Sends an event, reporting whether the caller is still listening.
fn send(tx: &UnboundedSender<ExecutionEvent>, event: ExecutionEvent) -> bool {
    tx.unbounded_send(event).is_ok()
}

async fn drive_run(
    backend: Arc<dyn TransformBackend>,
    store: Arc<dyn RunStore>,
    pipeline_id: WorkflowId,
    steps: Vec<WorkflowStep>,
    seed_input: String,
    tx: UnboundedSender<ExecutionEvent>,
) {
    let stream_id = Uuid::new_v4();
    let mut run = PipelineRun::new(pipeline_id, seed_input.clone());
    let mut current_input = seed_input;
    let mut connected = true;

    info!(%stream_id, pipeline_id, steps = steps.len(), "starting streaming run");

    for (index, step) in steps.iter().enumerate() {
        let step_number = u32::try_from(index).unwrap_or(u32::MAX).saturating_add(1);

        connected &= send(
            &tx,
            ExecutionEvent::StepStarted {
                step_number,
                step_name: step.name.clone(),
                step_kind: step.kind,
            },
        );
        if !connected {
            debug!(%stream_id, step_number, "caller disconnected, not starting step");
            break;
        }

        let outcome = drive_step(
            backend.as_ref(),
            step,
            step_number,
            &current_input,
            &tx,
            &mut connected,
        )
        .await;

        match outcome {
            StepOutcome::Completed(output) => {
                debug!(%stream_id, step_number, "step completed");
                run.push_result(StepResult::success(
                    step_number,
                    step,
                    current_input.clone(),
                    output.clone(),
                ));
                connected &= send(
                    &tx,
                    ExecutionEvent::StepCompleted {
                        step_number,
                        output: output.clone(),
                    },
                );
                current_input = output;
            }
            StepOutcome::Failed(message) => {
                warn!(%stream_id, step_number, error = %message, "step failed, stopping run");
                run.push_result(StepResult::failure(
                    step_number,
                    step,
                    current_input.clone(),
                    message.clone(),
                ));
                send(
                    &tx,
                    ExecutionEvent::StepFailed {
                        step_number,
                        error: message,
                    },
                );
                break;
            }
            StepOutcome::Abandoned => {
                debug!(%stream_id, step_number, "caller disconnected mid-step");
                break;
            }
        }

        if !connected {
            break;
        }
    }

    // Persist exactly once, after step processing and before the terminal
    // event. A short-circuited run is still a completed run here.
    match store.insert_run(&run).await {
        Ok(run_id) => {
            info!(%stream_id, run_id, results = run.results.len(), "run record persisted");
            send(
                &tx,
                ExecutionEvent::RunCompleted {
                    pipeline_id,
                    results: run.results,
                },
            );
        }
        Err(err) => {
            error!(%stream_id, error = %err, "failed to persist run record");
            send(
                &tx,
                ExecutionEvent::RunFailed {
                    error: err.to_string(),
                },
            );
        }
    }
}

async fn drive_step(
    backend: &dyn TransformBackend,
    step: &WorkflowStep,
    step_number: u32,
    input: &str,
    tx: &UnboundedSender<ExecutionEvent>,
    connected: &mut bool,
) -> StepOutcome {
    let mut fragments = match backend.run_streaming(step.kind, input).await {
        Ok(fragments) => fragments,
        Err(err) => return StepOutcome::Failed(err.to_string()),
    };

    let mut assembled = String::new();
    while let Some(item) = fragments.next().await {
        match item {
            Ok(fragment) => {
                assembled.push_str(&fragment);
                *connected &= send(
                    tx,
                    ExecutionEvent::Chunk {
                        step_number,
                        fragment,
                    },
                );
                if !*connected {
                    return StepOutcome::Abandoned;
                }
            }
            Err(err) => return StepOutcome::Failed(err.to_string()),
        }
    }

    StepOutcome::Completed(finalize_output(step.kind, assembled))
}
