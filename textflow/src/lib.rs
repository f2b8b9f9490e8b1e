//! # Textflow
//!
//! A streaming text-transformation pipeline engine.
//!
//! Textflow runs a short, ordered list of text-transformation steps
//! (clean, summarize, extract key points, categorize, sentiment, simplify)
//! against a pluggable backend, chaining each step's output into the next
//! step's input:
//!
//! - **Buffered execution**: [`executor::PipelineExecutor`] runs every step
//!   to completion and returns the ordered step results, stopping at the
//!   first failure.
//! - **Streaming execution**: [`executor::StreamingRunEmitter`] surfaces the
//!   same run as an ordered event stream, one chunk per backend fragment,
//!   and persists the run record before emitting the terminal event.
//! - **Health caching**: [`health::HealthCache`] memoizes the combined
//!   storage/backend liveness probe behind a TTL.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use textflow::prelude::*;
//!
//! let backend = Arc::new(GeminiBackend::from_env()?);
//! let store = Arc::new(MemoryRunStore::new());
//!
//! let steps = vec![
//!     WorkflowStep::new(StepKind::CleanText, "Clean"),
//!     WorkflowStep::new(StepKind::Summarize, "Summarize"),
//! ];
//!
//! let executor = PipelineExecutor::new(backend);
//! let results = executor.execute(&steps, "  hello   world  ").await;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod backend;
pub mod core;
pub mod errors;
pub mod events;
pub mod executor;
pub mod health;
pub mod observability;
pub mod storage;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::backend::{TextStream, TransformBackend};
    pub use crate::core::{
        PipelineRun, StepKind, StepResult, StepStatus, Workflow, WorkflowId,
        WorkflowStep,
    };
    pub use crate::errors::{
        BackendError, EngineError, PersistenceError, UnknownStepKindError,
        WorkflowValidationError,
    };
    pub use crate::events::ExecutionEvent;
    pub use crate::executor::{PipelineExecutor, StreamingRunEmitter};
    pub use crate::health::{HealthCache, HealthStatus, OverallHealth, ProbeState};
    pub use crate::storage::{MemoryRunStore, RunId, RunStore};
    pub use crate::utils::{iso_timestamp, now_utc, Timestamp};

    #[cfg(feature = "gemini")]
    pub use crate::backend::{GeminiBackend, GeminiConfig};
}
