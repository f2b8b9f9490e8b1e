//! The run record built up during execution and persisted once.

use super::{StepResult, WorkflowId};
use crate::utils::{now_utc, Timestamp};
use serde::{Deserialize, Serialize};

/// One execution of a workflow against a specific input text.
///
/// Constructed in memory by the executing task, which owns it exclusively
/// until it reaches a terminal state (all steps succeeded, or one failed)
/// and is handed to the store as a single durable record. `results` is
/// always a strict prefix of the workflow's step list: once step *k* fails,
/// no result for a later step is ever appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    /// The workflow this run executed.
    pub pipeline_id: WorkflowId,
    /// The seed input text.
    pub input_text: String,
    /// Ordered, possibly-partial step results.
    pub results: Vec<StepResult>,
    /// When execution started.
    pub started_at: Timestamp,
}

impl PipelineRun {
    /// Creates an empty run record for a workflow and seed input.
    #[must_use]
    pub fn new(pipeline_id: WorkflowId, input_text: impl Into<String>) -> Self {
        Self {
            pipeline_id,
            input_text: input_text.into(),
            results: Vec::new(),
            started_at: now_utc(),
        }
    }

    /// Appends the result of the next attempted step.
    pub fn push_result(&mut self, result: StepResult) {
        self.results.push(result);
    }

    /// Returns true if any attempted step failed.
    #[must_use]
    pub fn failed(&self) -> bool {
        self.results.iter().any(|r| !r.is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{StepKind, WorkflowStep};

    #[test]
    fn test_run_accumulates_results() {
        let step = WorkflowStep::new(StepKind::CleanText, "Clean");
        let mut run = PipelineRun::new(7, "hello");

        run.push_result(StepResult::success(1, &step, "hello", "hello"));
        assert!(!run.failed());

        run.push_result(StepResult::failure(2, &step, "hello", "boom"));
        assert!(run.failed());
        assert_eq!(run.results.len(), 2);
    }
}
