//! Per-step execution results.

use super::{StepKind, WorkflowStep};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The outcome of one attempted step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// The step produced output.
    Success,
    /// The step failed; no output exists.
    Failed,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// The record of one attempted step, produced exactly once per attempt,
/// in step order.
///
/// Invariant: `output` is present iff `status` is [`StepStatus::Success`];
/// `error` is present iff `status` is [`StepStatus::Failed`]. The
/// constructors are the only way the engine builds these, which keeps the
/// invariant by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    /// 1-based, contiguous step position.
    pub step_number: u32,
    /// The transformation the step performed.
    pub step_kind: StepKind,
    /// The step's display name.
    pub step_name: String,
    /// The text the step was given.
    pub input: String,
    /// The text the step produced, post trim rule. Present iff successful.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Whether the step succeeded.
    pub status: StepStatus,
    /// The failure message. Present iff failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepResult {
    /// Creates a successful step result.
    #[must_use]
    pub fn success(
        step_number: u32,
        step: &WorkflowStep,
        input: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            step_number,
            step_kind: step.kind,
            step_name: step.name.clone(),
            input: input.into(),
            output: Some(output.into()),
            status: StepStatus::Success,
            error: None,
        }
    }

    /// Creates a failed step result capturing the attempted input.
    #[must_use]
    pub fn failure(
        step_number: u32,
        step: &WorkflowStep,
        input: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            step_number,
            step_kind: step.kind,
            step_name: step.name.clone(),
            input: input.into(),
            output: None,
            status: StepStatus::Failed,
            error: Some(error.into()),
        }
    }

    /// Returns true if the step succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == StepStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step() -> WorkflowStep {
        WorkflowStep::new(StepKind::Summarize, "Summarize")
    }

    #[test]
    fn test_success_invariant() {
        let result = StepResult::success(1, &step(), "in", "out");
        assert!(result.is_success());
        assert_eq!(result.output.as_deref(), Some("out"));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_failure_invariant() {
        let result = StepResult::failure(2, &step(), "in", "boom");
        assert!(!result.is_success());
        assert!(result.output.is_none());
        assert_eq!(result.error.as_deref(), Some("boom"));
        assert_eq!(result.input, "in");
    }

    #[test]
    fn test_serialize_omits_absent_fields() {
        let result = StepResult::failure(1, &step(), "in", "boom");
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("output").is_none());
        assert_eq!(json["status"], "failed");
        assert_eq!(json["step_kind"], "summarize");
    }
}
