//! OpenAI-compatible chat completion adapter.
//!
//! Sends each prompt as a single user message to `<base_url>/v1/chat/completions`
//! and maps HTTP failures onto [`ModelError`]: rate limits, timeouts, server
//! errors and connection problems are transient, everything else is fatal.

use crate::config::FileModelConfig;
use async_trait::async_trait;
use mods_application::ports::language_model::{LanguageModel, ModelError};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// [`LanguageModel`] over any server speaking the OpenAI chat API.
pub struct OpenAiCompatibleModel {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
}

impl OpenAiCompatibleModel {
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ModelError::Fatal(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            model: model.into(),
            temperature: 0.0,
        })
    }

    pub fn from_config(config: &FileModelConfig) -> Result<Self, ModelError> {
        Ok(Self::new(
            &config.base_url,
            config.model.clone(),
            config.resolve_api_key(),
            Duration::from_secs(config.timeout_seconds),
        )?
        .with_temperature(config.temperature))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

fn classify_send_error(error: reqwest::Error) -> ModelError {
    if error.is_timeout() || error.is_connect() || error.is_request() {
        ModelError::Transient(format!("request failed: {}", error))
    } else {
        ModelError::Fatal(format!("request failed: {}", error))
    }
}

#[async_trait]
impl LanguageModel for OpenAiCompatibleModel {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(classify_send_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = format!("{} returned {}: {}", self.endpoint, status, body.trim());
            return Err(if is_transient_status(status) {
                ModelError::Transient(message)
            } else {
                ModelError::Fatal(message)
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Fatal(format!("malformed completion body: {}", e)))?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ModelError::Fatal("completion has no message content".to_string()))?;

        debug!("{} returned {} chars", self.model, content.len());
        Ok(content)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and hand back the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });
        (format!("http://{}", addr), handle)
    }

    fn model(base_url: &str) -> OpenAiCompatibleModel {
        OpenAiCompatibleModel::new(base_url, "test-model", Some("secret".to_string()), Duration::from_secs(5))
            .unwrap()
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"choices": [{"message": {"role": "assistant", "content": "Topic A"}}]}"#,
        )
        .await;
        let reply = model(&url).complete("Plan topics").await.unwrap();
        assert_eq!(reply, "Topic A");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1/chat/completions"));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer secret"));
        assert!(request.contains(r#""content":"Plan topics""#));
        assert!(request.contains(r#""model":"test-model""#));
    }

    #[tokio::test]
    async fn test_rate_limit_is_transient() {
        let (url, _server) = serve_once("429 Too Many Requests", r#"{"error": "slow down"}"#).await;
        let error = model(&url).complete("hi").await.unwrap_err();
        assert!(error.is_transient());
    }

    #[tokio::test]
    async fn test_bad_request_is_fatal() {
        let (url, _server) = serve_once("400 Bad Request", r#"{"error": "nope"}"#).await;
        let error = model(&url).complete("hi").await.unwrap_err();
        assert!(!error.is_transient());
    }

    #[tokio::test]
    async fn test_missing_content_is_fatal() {
        let (url, _server) = serve_once("200 OK", r#"{"choices": []}"#).await;
        let error = model(&url).complete("hi").await.unwrap_err();
        assert!(matches!(error, ModelError::Fatal(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transient() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        let error = model(&url).complete("hi").await.unwrap_err();
        assert!(error.is_transient());
    }

    #[test]
    fn test_endpoint_and_status_classes() {
        assert_eq!(
            model("http://localhost:8000/").endpoint(),
            "http://localhost:8000/v1/chat/completions"
        );
        assert!(is_transient_status(StatusCode::BAD_GATEWAY));
        assert!(is_transient_status(StatusCode::REQUEST_TIMEOUT));
        assert!(!is_transient_status(StatusCode::UNAUTHORIZED));
    }
}
