//! Pipeline execution.
//!
//! Two variants over the same chaining semantics:
//! - [`PipelineExecutor`] runs every step buffered and returns the results.
//! - [`StreamingRunEmitter`] surfaces the run as an ordered event stream
//!   and persists the run record before the terminal event.

mod streaming;

pub use streaming::StreamingRunEmitter;

use crate::backend::TransformBackend;
use crate::core::{StepKind, StepResult, WorkflowStep};
use std::sync::Arc;
use tracing::{debug, warn};

/// Applies the post-processing rule to assembled step output.
///
/// Label-producing kinds get surrounding whitespace trimmed; everything
/// else passes through untouched.
pub(crate) fn finalize_output(kind: StepKind, raw: String) -> String {
    if kind.trims_output() {
        raw.trim().to_string()
    } else {
        raw
    }
}

/// Runs a workflow's steps in order, buffered, chaining output to input.
pub struct PipelineExecutor {
    backend: Arc<dyn TransformBackend>,
}

impl PipelineExecutor {
    /// Creates a new executor over a backend.
    #[must_use]
    pub fn new(backend: Arc<dyn TransformBackend>) -> Self {
        Self { backend }
    }

    /// Executes the steps against the seed input.
    ///
    /// Each step's output becomes the next step's input. On the first
    /// failure the remaining steps are not attempted; the failure is
    /// captured as a [`StepResult`] rather than propagated, so this never
    /// fails itself. An empty step list yields an empty result sequence
    /// with no backend calls.
    pub async fn execute(&self, steps: &[WorkflowStep], seed_input: &str) -> Vec<StepResult> {
        let mut results = Vec::with_capacity(steps.len());
        let mut current_input = seed_input.to_string();

        for (index, step) in steps.iter().enumerate() {
            let step_number = u32::try_from(index).unwrap_or(u32::MAX).saturating_add(1);
            debug!(step = %step.kind, number = step_number, "executing step");

            match self.backend.run_buffered(step.kind, &current_input).await {
                Ok(raw) => {
                    let output = finalize_output(step.kind, raw);
                    results.push(StepResult::success(
                        step_number,
                        step,
                        current_input.clone(),
                        output.clone(),
                    ));
                    current_input = output;
                }
                Err(err) => {
                    warn!(step = %step.kind, number = step_number, error = %err, "step failed, stopping run");
                    results.push(StepResult::failure(
                        step_number,
                        step,
                        current_input.clone(),
                        err.to_string(),
                    ));
                    break;
                }
            }
        }

        results
    }
}
