//! Google generative-language backend adapter.
//!
//! Talks to the `generateContent` / `streamGenerateContent` REST endpoints.
//! The streaming endpoint is consumed as server-sent events, one `data:`
//! payload per fragment.

use super::prompt::{prompt_for, PROBE_PROMPT};
use super::{TextStream, TransformBackend};
use crate::core::StepKind;
use crate::errors::BackendError;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Gemini backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key for the generative-language API.
    pub api_key: String,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
}

fn default_model() -> String {
    "gemma-3-1b-it".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout() -> f64 {
    30.0
}

impl GeminiConfig {
    /// Creates a config with defaults for everything but the API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: default_model(),
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }

    /// Loads the config from `GEMINI_API_KEY` and optional `GEMINI_MODEL`.
    pub fn from_env() -> Result<Self, BackendError> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
            BackendError::Configuration("GEMINI_API_KEY is not set".to_string())
        })?;
        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            if !model.is_empty() {
                config.model = model;
            }
        }
        Ok(config)
    }
}

/// A [`TransformBackend`] backed by the Gemini REST API.
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    /// Creates a new backend from a config.
    pub fn new(config: GeminiConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs_f64(config.timeout_seconds))
            .build()
            .map_err(|err| BackendError::Configuration(err.to_string()))?;
        Ok(Self { client, config })
    }

    /// Creates a new backend from environment variables.
    pub fn from_env() -> Result<Self, BackendError> {
        Self::new(GeminiConfig::from_env()?)
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{method}",
            self.config.base_url, self.config.model
        )
    }

    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let response = self
            .client
            .post(self.endpoint("generateContent"))
            .query(&[("key", self.config.api_key.as_str())])
            .json(&GenerateRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(|err| BackendError::transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::rejected(format!("HTTP {status}: {body}")));
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|err| BackendError::invalid_response(err.to_string()))?;

        payload
            .text()
            .ok_or_else(|| BackendError::invalid_response("response contained no text"))
    }
}

#[async_trait]
impl TransformBackend for GeminiBackend {
    async fn run_buffered(&self, kind: StepKind, input: &str) -> Result<String, BackendError> {
        self.generate(&prompt_for(kind, input)).await
    }

    async fn run_streaming(&self, kind: StepKind, input: &str) -> Result<TextStream, BackendError> {
        let response = self
            .client
            .post(self.endpoint("streamGenerateContent"))
            .query(&[
                ("alt", "sse"),
                ("key", self.config.api_key.as_str()),
            ])
            .json(&GenerateRequest::from_prompt(&prompt_for(kind, input)))
            .send()
            .await
            .map_err(|err| BackendError::transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::rejected(format!("HTTP {status}: {body}")));
        }

        let bytes = response
            .bytes_stream()
            .map(|item| match item {
                Ok(chunk) => Ok(chunk.to_vec()),
                Err(err) => Err(BackendError::transport(err.to_string())),
            })
            .boxed();

        Ok(sse_text_stream(bytes))
    }

    async fn ping(&self) -> Result<(), BackendError> {
        self.generate(PROBE_PROMPT).await.map(|_| ())
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

impl GenerateRequest {
    fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateResponse {
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .map(|part| part.text.as_str())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

struct SseState {
    inner: BoxStream<'static, Result<Vec<u8>, BackendError>>,
    buf: String,
    done: bool,
}

/// Converts an SSE byte stream into a stream of text fragments.
fn sse_text_stream(inner: BoxStream<'static, Result<Vec<u8>, BackendError>>) -> TextStream {
    let state = SseState {
        inner,
        buf: String::new(),
        done: false,
    };

    futures::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(pos) = st.buf.find('\n') {
                let line: String = st.buf.drain(..=pos).collect();
                let line = line.trim();
                if let Some(data) = line.strip_prefix("data:") {
                    let data = data.trim();
                    if data.is_empty() || data == "[DONE]" {
                        continue;
                    }
                    match extract_fragment(data) {
                        Ok(Some(text)) => return Some((Ok(text), st)),
                        Ok(None) => continue,
                        Err(err) => {
                            st.done = true;
                            st.buf.clear();
                            return Some((Err(err), st));
                        }
                    }
                }
                continue;
            }

            if st.done {
                return None;
            }

            match st.inner.next().await {
                Some(Ok(chunk)) => st.buf.push_str(&String::from_utf8_lossy(&chunk)),
                Some(Err(err)) => {
                    st.done = true;
                    st.buf.clear();
                    return Some((Err(err), st));
                }
                None => {
                    st.done = true;
                    // Flush a trailing line that arrived without a newline.
                    if !st.buf.is_empty() && !st.buf.ends_with('\n') {
                        st.buf.push('\n');
                    }
                }
            }
        }
    })
    .boxed()
}

fn extract_fragment(data: &str) -> Result<Option<String>, BackendError> {
    let payload: GenerateResponse = serde_json::from_str(data)
        .map_err(|err| BackendError::invalid_response(format!("bad stream chunk: {err}")))?;
    Ok(payload.text())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sse_input(events: &[&str]) -> BoxStream<'static, Result<Vec<u8>, BackendError>> {
        let joined = events
            .iter()
            .map(|e| format!("data: {e}\n\n"))
            .collect::<String>();
        futures::stream::iter(vec![Ok(joined.into_bytes())]).boxed()
    }

    fn chunk_json(text: &str) -> String {
        serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": text}]}}]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_sse_stream_yields_fragments_in_order() {
        let input = sse_input(&[&chunk_json("Hello"), &chunk_json(" world")]);
        let fragments: Vec<_> = sse_text_stream(input).collect().await;

        let texts: Vec<String> = fragments.into_iter().map(Result::unwrap).collect();
        assert_eq!(texts, vec!["Hello".to_string(), " world".to_string()]);
    }

    #[tokio::test]
    async fn test_sse_stream_skips_empty_payloads() {
        let payload = serde_json::json!({"candidates": []}).to_string();
        let input = sse_input(&[&payload, &chunk_json("only")]);
        let fragments: Vec<_> = sse_text_stream(input).collect().await;

        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].as_ref().unwrap(), "only");
    }

    #[tokio::test]
    async fn test_sse_stream_split_across_byte_chunks() {
        let line = format!("data: {}\n", chunk_json("split"));
        let (head, tail) = line.split_at(10);
        let input = futures::stream::iter(vec![
            Ok(head.as_bytes().to_vec()),
            Ok(tail.as_bytes().to_vec()),
        ])
        .boxed();

        let fragments: Vec<_> = sse_text_stream(input).collect().await;
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].as_ref().unwrap(), "split");
    }

    #[tokio::test]
    async fn test_sse_stream_surfaces_transport_error_and_ends() {
        let input = futures::stream::iter(vec![
            Ok(format!("data: {}\n", chunk_json("ok")).into_bytes()),
            Err(BackendError::transport("connection reset")),
        ])
        .boxed();

        let fragments: Vec<_> = sse_text_stream(input).collect().await;
        assert_eq!(fragments.len(), 2);
        assert!(fragments[0].is_ok());
        assert!(fragments[1].is_err());
    }

    #[tokio::test]
    async fn test_sse_stream_flushes_trailing_line() {
        // No trailing newline on the final event.
        let input = futures::stream::iter(vec![Ok(format!(
            "data: {}",
            chunk_json("tail")
        )
        .into_bytes())])
        .boxed();

        let fragments: Vec<_> = sse_text_stream(input).collect().await;
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].as_ref().unwrap(), "tail");
    }

    #[test]
    fn test_config_defaults() {
        let config = GeminiConfig::new("secret");
        assert_eq!(config.model, "gemma-3-1b-it");
        assert!(config.base_url.contains("generativelanguage"));
    }

    #[test]
    fn test_buffered_response_text_joins_parts() {
        let payload: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"a"},{"text":"b"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(payload.text().as_deref(), Some("ab"));
    }
}
