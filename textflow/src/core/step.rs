//! Step kinds and workflow definitions.

use crate::errors::{UnknownStepKindError, WorkflowValidationError};
use crate::utils::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier for a stored workflow definition.
pub type WorkflowId = i64;

/// Minimum number of steps in a workflow.
pub const MIN_STEPS: usize = 1;

/// Maximum number of steps in a workflow.
pub const MAX_STEPS: usize = 4;

/// The kind of text transformation a step performs.
///
/// This is a closed enumeration: every kind the engine can dispatch is
/// listed here, so exhaustive matches are checked at compile time and an
/// unrecognized kind is rejected when a definition is parsed, never deep
/// inside a backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Normalize whitespace, fix typos, improve readability.
    CleanText,
    /// Condense the text into 2-3 sentences.
    Summarize,
    /// Pull out the key points as a bullet list.
    ExtractKeyPoints,
    /// Assign a single category label.
    TagCategory,
    /// Classify sentiment as a single word.
    SentimentAnalysis,
    /// Rewrite in simple, easy-to-understand language.
    TranslateToSimple,
}

impl StepKind {
    /// All step kinds, in a stable order.
    pub const ALL: [Self; 6] = [
        Self::CleanText,
        Self::Summarize,
        Self::ExtractKeyPoints,
        Self::TagCategory,
        Self::SentimentAnalysis,
        Self::TranslateToSimple,
    ];

    /// Returns the wire name of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CleanText => "clean_text",
            Self::Summarize => "summarize",
            Self::ExtractKeyPoints => "extract_key_points",
            Self::TagCategory => "tag_category",
            Self::SentimentAnalysis => "sentiment_analysis",
            Self::TranslateToSimple => "translate_to_simple",
        }
    }

    /// Returns true if the assembled output must have surrounding
    /// whitespace trimmed before it becomes step output.
    ///
    /// Category and sentiment labels are expected to be single tokens.
    #[must_use]
    pub fn trims_output(&self) -> bool {
        matches!(self, Self::TagCategory | Self::SentimentAnalysis)
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepKind {
    type Err = UnknownStepKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clean_text" => Ok(Self::CleanText),
            "summarize" => Ok(Self::Summarize),
            "extract_key_points" => Ok(Self::ExtractKeyPoints),
            "tag_category" => Ok(Self::TagCategory),
            "sentiment_analysis" => Ok(Self::SentimentAnalysis),
            "translate_to_simple" => Ok(Self::TranslateToSimple),
            other => Err(UnknownStepKindError::new(other)),
        }
    }
}

/// One step of a workflow: a transformation kind plus a display name.
///
/// Immutable once part of a defined workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// The transformation this step performs.
    pub kind: StepKind,
    /// Human-readable step name.
    pub name: String,
}

impl WorkflowStep {
    /// Creates a new workflow step.
    #[must_use]
    pub fn new(kind: StepKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

/// A stored workflow definition: an ordered, bounded list of steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    /// Identifier assigned by the definition store.
    pub id: WorkflowId,
    /// Workflow name.
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The ordered steps, 1 to [`MAX_STEPS`] of them.
    pub steps: Vec<WorkflowStep>,
    /// When the definition was created.
    pub created_at: Timestamp,
}

impl Workflow {
    /// Creates a workflow definition, validating the step list.
    pub fn new(
        id: WorkflowId,
        name: impl Into<String>,
        steps: Vec<WorkflowStep>,
    ) -> Result<Self, WorkflowValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(WorkflowValidationError::new("workflow name is required"));
        }
        Self::validate_steps(&steps)?;

        Ok(Self {
            id,
            name,
            description: None,
            steps,
            created_at: crate::utils::now_utc(),
        })
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Validates a step list against the definition-time bounds.
    pub fn validate_steps(steps: &[WorkflowStep]) -> Result<(), WorkflowValidationError> {
        if steps.len() < MIN_STEPS {
            return Err(WorkflowValidationError::new(
                "at least one step is required",
            ));
        }
        if steps.len() > MAX_STEPS {
            return Err(WorkflowValidationError::new(format!(
                "maximum {MAX_STEPS} steps allowed, got {}",
                steps.len()
            )));
        }
        Ok(())
    }
}
