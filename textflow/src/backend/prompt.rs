//! Canonical prompts, one per step kind.

use crate::core::StepKind;

/// Prompt used by liveness probes.
pub const PROBE_PROMPT: &str = "Say \"OK\" if you can read this.";

/// Returns the canonical prompt for a step kind and input text.
#[must_use]
pub fn prompt_for(kind: StepKind, text: &str) -> String {
    match kind {
        StepKind::CleanText => format!(
            "Clean and normalize this text. Remove extra whitespace, fix common typos, \
             and make it more readable. Return only the cleaned text without explanations:\n\n{text}"
        ),
        StepKind::Summarize => format!(
            "Summarize the following text in 2-3 sentences. Be concise and capture \
             the main points:\n\n{text}"
        ),
        StepKind::ExtractKeyPoints => format!(
            "Extract the key points from this text as a bullet list. Return only \
             the bullet points:\n\n{text}"
        ),
        StepKind::TagCategory => format!(
            "Analyze this text and assign it to ONE category from: Technology, Business, \
             Health, Education, Entertainment, Sports, Politics, Science, or Other. \
             Return only the category name:\n\n{text}"
        ),
        StepKind::SentimentAnalysis => format!(
            "Analyze the sentiment of this text. Respond with only one word: \
             Positive, Negative, or Neutral:\n\n{text}"
        ),
        StepKind::TranslateToSimple => format!(
            "Rewrite this text in simple, easy-to-understand language suitable \
             for a 10-year-old:\n\n{text}"
        ),
    }
}
