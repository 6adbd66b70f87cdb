// src/generation/gemini.rs

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::client::{ChunkStream, GenerationBackend, GenerationError};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// HTTP client for the Gemini `generateContent` / `streamGenerateContent`
/// REST endpoints.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    fn request_body<'a>(prompt: &'a str) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GenerationError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            Err(GenerationError::ModelNotFound(body))
        } else {
            Err(GenerationError::Unavailable(format!("{}: {}", status, body)))
        }
    }

    fn map_transport_error(err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout(err.to_string())
        } else {
            GenerationError::Unavailable(err.to_string())
        }
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .timeout(self.timeout)
            .json(&Self::request_body(prompt))
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let response = Self::check_status(response).await?;

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Unavailable(e.to_string()))?;

        match joined_text(&parsed) {
            Some(text) => Ok(text),
            None => Err(GenerationError::Unavailable(
                "response contained no text".to_string(),
            )),
        }
    }

    async fn stream(&self, model: &str, prompt: &str) -> Result<ChunkStream, GenerationError> {
        let url = format!("{}/models/{}:streamGenerateContent", self.base_url, model);

        let response = self
            .http
            .post(&url)
            .query(&[("alt", "sse"), ("key", self.api_key.as_str())])
            .timeout(self.timeout)
            .json(&Self::request_body(prompt))
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let response = Self::check_status(response).await?;
        let body = response.bytes_stream().boxed();

        // Fold the byte stream into SSE "data:" payloads, yielding the text
        // of each chunk as it arrives. The sequence ends when the provider
        // closes the channel.
        let chunks = futures::stream::unfold((body, String::new()), |(mut body, mut buf)| async move {
            loop {
                if let Some(payload) = next_data_payload(&mut buf) {
                    match chunk_text(&payload) {
                        Some(text) if !text.is_empty() => {
                            return Some((Ok(text), (body, buf)));
                        }
                        _ => continue,
                    }
                }

                match body.next().await {
                    Some(Ok(bytes)) => buf.push_str(&String::from_utf8_lossy(&bytes)),
                    Some(Err(err)) => {
                        return Some((Err(Self::map_transport_error(err)), (body, buf)));
                    }
                    None => return None,
                }
            }
        });

        Ok(Box::pin(chunks))
    }
}

/// Joins the text parts of the first candidate, if any.
fn joined_text(response: &GenerateContentResponse) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;
    let text: String = content
        .parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect();
    if text.is_empty() { None } else { Some(text) }
}

/// Pops the next complete `data:` payload out of the line buffer.
/// Non-data lines (comments, blank keep-alives) are discarded.
fn next_data_payload(buf: &mut String) -> Option<String> {
    while let Some(pos) = buf.find('\n') {
        let line: String = buf.drain(..=pos).collect();
        let line = line.trim();
        if let Some(data) = line.strip_prefix("data:") {
            let data = data.trim();
            if !data.is_empty() {
                return Some(data.to_string());
            }
        }
    }
    None
}

/// Extracts the chunk text from one streamed response payload.
fn chunk_text(payload: &str) -> Option<String> {
    let parsed: GenerateContentResponse = serde_json::from_str(payload).ok()?;
    joined_text(&parsed)
}
