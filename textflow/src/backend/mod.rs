//! The pluggable text-transformation capability.
//!
//! A [`TransformBackend`] executes one step kind against input text, either
//! buffered (one full result) or streaming (a lazy, single-pass sequence of
//! text fragments whose concatenation equals the buffered result).

mod prompt;

#[cfg(feature = "gemini")]
mod gemini;

pub use prompt::{prompt_for, PROBE_PROMPT};

#[cfg(feature = "gemini")]
pub use gemini::{GeminiBackend, GeminiConfig};

use crate::core::StepKind;
use crate::errors::BackendError;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// A lazy, finite, single-pass sequence of text fragments in emission
/// order. Not restartable: each executor owns exactly one of these per
/// in-flight step.
pub type TextStream = BoxStream<'static, Result<String, BackendError>>;

/// Trait for text-transformation backends.
///
/// Implementations must not partially succeed in buffered mode, and the
/// fragments of a streaming call must concatenate to what the buffered call
/// would have returned for the same inputs.
#[async_trait]
pub trait TransformBackend: Send + Sync {
    /// Runs one step kind against input text, returning the full output.
    async fn run_buffered(&self, kind: StepKind, input: &str) -> Result<String, BackendError>;

    /// Runs one step kind against input text, returning a fragment stream.
    ///
    /// A failure opening the stream and a failure mid-stream both fail the
    /// step the same way.
    async fn run_streaming(&self, kind: StepKind, input: &str) -> Result<TextStream, BackendError>;

    /// Cheap liveness probe for health checks.
    async fn ping(&self) -> Result<(), BackendError>;
}
