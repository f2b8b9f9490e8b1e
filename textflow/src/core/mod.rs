//! Core domain model types for textflow.
//!
//! This module contains the fundamental types used throughout the engine:
//! - Step kind and status enums
//! - Workflow definitions and their steps
//! - Per-step results and the run record they roll up into

mod result;
mod run;
mod step;

pub use result::{StepResult, StepStatus};
pub use run::PipelineRun;
pub use step::{StepKind, Workflow, WorkflowId, WorkflowStep, MAX_STEPS, MIN_STEPS};
