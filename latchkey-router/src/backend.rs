//! The inference backend contract, an HTTP client for a local
//! Ollama-compatible server, and an in-memory mock for tests.

use crate::error::{map_reqwest_error, RouterError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// A single chat turn, in the role/content shape every backend speaks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `"system"`, `"user"`, or `"assistant"`.
    pub role: String,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Convenience constructor for a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }

    /// Convenience constructor for a system prompt.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }
}

/// Token accounting reported by a backend, when it reports one at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenUsage {
    /// Tokens in the prompt.
    pub input_tokens: u64,
    /// Tokens generated.
    pub output_tokens: u64,
}

/// A completed, non-streamed chat response.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// The assistant's reply text.
    pub content: String,
    /// Token usage, if the backend reported one.
    pub usage: Option<TokenUsage>,
}

/// What every local or remote model backend must support.
///
/// `start`/`stop` are advisory lifecycle hints — a backend is free to
/// treat them as no-ops when it has no warm/cold distinction to make.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Warm up `model_id`, or no-op if it's already warm.
    async fn start(&self, model_id: &str) -> Result<(), RouterError>;

    /// Send a non-streaming chat completion request.
    async fn chat(&self, model_id: &str, messages: &[ChatMessage]) -> Result<ChatResponse, RouterError>;

    /// Start a streaming chat completion, returning the receiving end of
    /// a bounded channel fed by a background task. Each item is a text
    /// delta; the channel closes when generation finishes or errors.
    async fn stream(
        &self,
        model_id: &str,
        messages: &[ChatMessage],
    ) -> Result<mpsc::Receiver<Result<String, RouterError>>, RouterError>;

    /// Advisory hint that `model_id` can be unloaded. Not guaranteed to
    /// take effect immediately, or at all.
    async fn stop(&self, model_id: &str) -> Result<(), RouterError>;
}

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

/// HTTP client against a local model server exposing an
/// Ollama-compatible `/api/chat` endpoint.
pub struct OllamaBackend {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaBackend {
    /// Point at the default local Ollama endpoint (`localhost:11434`).
    pub fn new() -> Self {
        Self { client: reqwest::Client::new(), base_url: DEFAULT_OLLAMA_URL.to_string() }
    }

    /// Point at a custom base URL — a remote host, or a mock HTTP server in tests.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into() }
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceBackend for OllamaBackend {
    async fn start(&self, model_id: &str) -> Result<(), RouterError> {
        self.chat(model_id, &[ChatMessage::user("")]).await.map(|_| ())
    }

    async fn chat(&self, model_id: &str, messages: &[ChatMessage]) -> Result<ChatResponse, RouterError> {
        let body = OllamaChatRequest { model: model_id, messages, stream: false };
        let response = self.client.post(self.chat_url()).json(&body).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RouterError::BackendStatus { status: status.as_u16(), body: text });
        }

        let parsed: OllamaChatResponse =
            response.json().await.map_err(|e| RouterError::InvalidResponse(e.to_string()))?;

        let usage = match (parsed.prompt_eval_count, parsed.eval_count) {
            (Some(i), Some(o)) => Some(TokenUsage { input_tokens: i, output_tokens: o }),
            _ => None,
        };

        Ok(ChatResponse { content: parsed.message.content, usage })
    }

    async fn stream(
        &self,
        model_id: &str,
        messages: &[ChatMessage],
    ) -> Result<mpsc::Receiver<Result<String, RouterError>>, RouterError> {
        use futures_util::StreamExt;

        let body = OllamaChatRequest { model: model_id, messages, stream: true };
        let response = self.client.post(self.chat_url()).json(&body).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RouterError::BackendStatus { status: status.as_u16(), body: text });
        }

        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut buf = String::new();
            while let Some(chunk) = byte_stream.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        let _ = tx.send(Err(map_reqwest_error(e))).await;
                        return;
                    }
                };
                buf.push_str(&String::from_utf8_lossy(&chunk));
                while let Some(pos) = buf.find('\n') {
                    let line: String = buf.drain(..=pos).collect();
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<OllamaChatResponse>(line) {
                        Ok(parsed) if !parsed.message.content.is_empty() => {
                            if tx.send(Ok(parsed.message.content)).await.is_err() {
                                return;
                            }
                        }
                        Ok(_) => {}
                        Err(e) => {
                            let _ = tx.send(Err(RouterError::InvalidResponse(e.to_string()))).await;
                            return;
                        }
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn stop(&self, _model_id: &str) -> Result<(), RouterError> {
        Ok(())
    }
}

/// Scripted, in-memory backend for deterministic tests.
pub struct MockBackend {
    responses: Mutex<HashMap<String, String>>,
    default_response: String,
}

impl MockBackend {
    /// A mock whose `chat` always returns `default_response` regardless
    /// of model or messages.
    pub fn with_default(default_response: impl Into<String>) -> Self {
        Self { responses: Mutex::new(HashMap::new()), default_response: default_response.into() }
    }

    /// Script a specific reply for a given model id.
    pub fn set_response(&self, model_id: &str, response: impl Into<String>) {
        self.responses.lock().unwrap().insert(model_id.to_string(), response.into());
    }
}

#[async_trait]
impl InferenceBackend for MockBackend {
    async fn start(&self, _model_id: &str) -> Result<(), RouterError> {
        Ok(())
    }

    async fn chat(&self, model_id: &str, _messages: &[ChatMessage]) -> Result<ChatResponse, RouterError> {
        let content = self.responses.lock().unwrap().get(model_id).cloned().unwrap_or_else(|| self.default_response.clone());
        Ok(ChatResponse { content, usage: Some(TokenUsage { input_tokens: 1, output_tokens: 1 }) })
    }

    async fn stream(
        &self,
        model_id: &str,
        _messages: &[ChatMessage],
    ) -> Result<mpsc::Receiver<Result<String, RouterError>>, RouterError> {
        let content = self.responses.lock().unwrap().get(model_id).cloned().unwrap_or_else(|| self.default_response.clone());
        let (tx, rx) = mpsc::channel(4);
        tokio::spawn(async move {
            let _ = tx.send(Ok(content)).await;
        });
        Ok(rx)
    }

    async fn stop(&self, _model_id: &str) -> Result<(), RouterError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_backend_returns_scripted_response() {
        let backend = MockBackend::with_default("fallback");
        backend.set_response("llama3.2", "hi there");
        let resp = backend.chat("llama3.2", &[ChatMessage::user("hello")]).await.unwrap();
        assert_eq!(resp.content, "hi there");
    }

    #[tokio::test]
    async fn mock_backend_falls_back_to_default_for_unknown_model() {
        let backend = MockBackend::with_default("fallback");
        let resp = backend.chat("unknown-model", &[]).await.unwrap();
        assert_eq!(resp.content, "fallback");
    }

    #[tokio::test]
    async fn mock_backend_streams_single_chunk() {
        let backend = MockBackend::with_default("streamed");
        let mut rx = backend.stream("m", &[]).await.unwrap();
        let first = rx.recv().await.unwrap().unwrap();
        assert_eq!(first, "streamed");
    }

    #[test]
    fn ollama_backend_chat_url_includes_path() {
        let backend = OllamaBackend::with_base_url("http://localhost:9999");
        assert_eq!(backend.chat_url(), "http://localhost:9999/api/chat");
    }
}
