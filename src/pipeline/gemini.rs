//! Gemini inference client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;

/// A single model call, classified. The orchestrator decides what is
/// retryable; this layer only reports what the endpoint said.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model endpoint signalled resource exhaustion: {body}")]
    RateLimited { body: String },

    #[error("Model endpoint rejected the request: {0}")]
    InvalidRequest(String),

    #[error("Model endpoint returned error (status {status}): {body}")]
    Remote { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}

/// Inference endpoint abstraction (allows mocking).
pub trait ModelClient {
    fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

/// HTTP client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl GeminiClient {
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(config::REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            client,
        }
    }

    /// Client for the hosted endpoint with the configured model.
    pub fn from_env() -> Result<Self, config::MissingApiKey> {
        let key = config::api_key()?;
        Ok(Self::new(config::API_BASE_URL, &config::model_name(), &key))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Trivial generate round-trip to confirm the key and endpoint work
    /// before the user sits through uploads.
    pub fn test_connection(&self) -> bool {
        match self.generate("Hello, please respond with 'Connection successful'") {
            Ok(text) => !text.is_empty(),
            Err(e) => {
                tracing::warn!(error = %e, "API connection test failed");
                false
            }
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl ModelClient for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::HttpClient(format!(
                        "Request timed out after {}s",
                        config::REQUEST_TIMEOUT.as_secs()
                    ))
                } else {
                    ModelError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(match status.as_u16() {
                429 => ModelError::RateLimited { body },
                400 => ModelError::InvalidRequest(body),
                code => ModelError::Remote { status: code, body },
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| ModelError::ResponseParsing(e.to_string()))?;

        let text = parsed
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(ModelError::ResponseParsing(
                "response contained no candidate text".into(),
            ));
        }

        Ok(text)
    }
}

/// Mock model client for testing — returns a configurable response.
pub struct MockModelClient {
    response: String,
}

impl MockModelClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
        }
    }
}

impl ModelClient for MockModelClient {
    fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
        Ok(self.response.clone())
    }
}
