//! Caller-visible execution events.
//!
//! The streaming executor surfaces a run as an ordered sequence of these
//! events. Each variant serializes to one typed wire message, and the
//! terminal [`ExecutionEvent::RunCompleted`] carries the complete ordered
//! results so a consumer that only observes the final message can still
//! reconstruct the full run outcome.

use crate::core::{StepKind, StepResult, WorkflowId};
use serde::{Deserialize, Serialize};

/// One event in a run's ordered event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutionEvent {
    /// A step is about to execute.
    StepStarted {
        /// 1-based step position.
        step_number: u32,
        /// The step's display name.
        step_name: String,
        /// The transformation the step performs.
        step_kind: StepKind,
    },
    /// One backend fragment, in emission order. Zero or more per step.
    Chunk {
        /// The step the fragment belongs to.
        step_number: u32,
        /// The raw text fragment.
        fragment: String,
    },
    /// A step finished; `output` has the trim rule already applied.
    StepCompleted {
        /// The completed step.
        step_number: u32,
        /// Final step output.
        output: String,
    },
    /// A step failed. Always the last per-step event of a run that stops
    /// early.
    StepFailed {
        /// The failed step.
        step_number: u32,
        /// The failure message.
        error: String,
    },
    /// Terminal event: the run record is durably persisted and these are
    /// the complete ordered results.
    RunCompleted {
        /// The workflow that ran.
        pipeline_id: WorkflowId,
        /// Ordered, possibly-partial step results.
        results: Vec<StepResult>,
    },
    /// Terminal event: an error outside step execution (persistence)
    /// prevented the run record from being written.
    RunFailed {
        /// The failure message.
        error: String,
    },
}

impl ExecutionEvent {
    /// Returns true for the terminal events of a stream.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::RunCompleted { .. } | Self::RunFailed { .. })
    }

    /// Returns the step this event belongs to, if it is a per-step event.
    #[must_use]
    pub fn step_number(&self) -> Option<u32> {
        match self {
            Self::StepStarted { step_number, .. }
            | Self::Chunk { step_number, .. }
            | Self::StepCompleted { step_number, .. }
            | Self::StepFailed { step_number, .. } => Some(*step_number),
            Self::RunCompleted { .. } | Self::RunFailed { .. } => None,
        }
    }
}
