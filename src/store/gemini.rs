//! Gemini Files API implementation of the document store.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use super::{validate_local_file, DocumentStore, FileMetadata, FileState, StoreError};
use crate::config;
use crate::pipeline::backoff::{
    suggested_retry_interval, RetryPolicy, Sleeper, ThreadSleeper,
};

/// Interval between processing-state polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

pub struct GeminiFileStore {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
    policy: RetryPolicy,
    sleeper: Box<dyn Sleeper + Send + Sync>,
}

impl GeminiFileStore {
    pub fn new(
        base_url: &str,
        api_key: &str,
        policy: RetryPolicy,
        sleeper: Box<dyn Sleeper + Send + Sync>,
    ) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(config::REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
            policy,
            sleeper,
        }
    }

    /// Store client for the hosted endpoint with env-derived retry policy.
    pub fn from_env() -> Result<Self, config::MissingApiKey> {
        let key = config::api_key()?;
        Ok(Self::new(
            config::API_BASE_URL,
            &key,
            RetryPolicy::from_env(),
            Box::new(ThreadSleeper),
        ))
    }

    /// One upload transmission, no retry. Returns the remote file record.
    fn transmit(&self, path: &Path, label: &str) -> Result<RemoteFile, StoreError> {
        let bytes = std::fs::read(path)?;
        let metadata = serde_json::json!({ "file": { "display_name": label } });

        let form = reqwest::blocking::multipart::Form::new()
            .part(
                "metadata",
                reqwest::blocking::multipart::Part::text(metadata.to_string())
                    .mime_str("application/json")
                    .map_err(|e| StoreError::HttpClient(e.to_string()))?,
            )
            .part(
                "file",
                reqwest::blocking::multipart::Part::bytes(bytes)
                    .file_name(
                        path.file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_else(|| "document".into()),
                    )
                    .mime_str(mime_for(path))
                    .map_err(|e| StoreError::HttpClient(e.to_string()))?,
            );

        let url = format!("{}/upload/v1beta/files?uploadType=multipart", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .multipart(form)
            .send()
            .map_err(|e| StoreError::HttpClient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StoreError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: UploadEnvelope = response
            .json()
            .map_err(|e| StoreError::ResponseParsing(e.to_string()))?;
        Ok(envelope.file)
    }

    /// Poll by remote name until the state is terminal.
    fn wait_until_ready(&self, mut file: RemoteFile, label: &str) -> Result<RemoteFile, StoreError> {
        while FileState::from_remote(&file.state) == FileState::Processing {
            self.sleeper.sleep(POLL_INTERVAL);
            file = self.fetch_file(&file.name)?;
        }

        if FileState::from_remote(&file.state) == FileState::Failed {
            return Err(StoreError::ProcessingFailed {
                label: label.to_string(),
            });
        }
        Ok(file)
    }

    fn fetch_file(&self, name: &str) -> Result<RemoteFile, StoreError> {
        let url = format!("{}/v1beta/{}", self.base_url, name);
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .map_err(|e| StoreError::HttpClient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StoreError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .map_err(|e| StoreError::ResponseParsing(e.to_string()))
    }
}

/// `files/<id>` resource name for a stored handle. Handles are URIs; the
/// resource id is their last path segment.
fn resource_name(handle: &str) -> String {
    let id = handle.rsplit('/').next().unwrap_or(handle);
    format!("files/{id}")
}

fn mime_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[derive(Deserialize)]
struct UploadEnvelope {
    file: RemoteFile,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RemoteFile {
    name: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    mime_type: String,
    /// int64 serialized as a string by the API.
    #[serde(default)]
    size_bytes: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    uri: String,
}

impl RemoteFile {
    fn into_metadata(self) -> FileMetadata {
        let state = FileState::from_remote(&self.state);
        FileMetadata {
            name: self.name,
            display_name: self.display_name,
            mime_type: self.mime_type,
            size_bytes: self.size_bytes.parse().unwrap_or(0),
            state,
            uri: self.uri,
        }
    }
}

impl DocumentStore for GeminiFileStore {
    fn upload(&self, path: &Path, label: &str) -> Result<String, StoreError> {
        validate_local_file(path)?;

        let max_attempts = self.policy.max_attempts;
        for attempt in 0..max_attempts {
            match self.transmit(path, label) {
                Ok(file) => {
                    let file = self.wait_until_ready(file, label)?;
                    tracing::info!(label, handle = %file.uri, "Uploaded");
                    return Ok(file.uri);
                }
                Err(StoreError::Remote { status: 429, body }) => {
                    if attempt + 1 >= max_attempts {
                        tracing::error!(label, attempts = max_attempts, "Upload rate limited, giving up");
                        return Err(StoreError::RateLimitExceeded {
                            attempts: max_attempts,
                        });
                    }
                    let delay = self
                        .policy
                        .rate_limit_delay(attempt, suggested_retry_interval(&body));
                    tracing::warn!(
                        label,
                        attempt = attempt + 1,
                        max_attempts,
                        delay_secs = delay.as_secs(),
                        "Upload rate limited, backing off"
                    );
                    self.sleeper.sleep(delay);
                }
                Err(other) => return Err(other),
            }
        }

        Err(StoreError::RateLimitExceeded {
            attempts: max_attempts,
        })
    }

    fn delete(&self, handle: &str) -> bool {
        let name = resource_name(handle);
        let url = format!("{}/v1beta/{}", self.base_url, name);
        let result = self
            .client
            .delete(&url)
            .header("x-goog-api-key", &self.api_key)
            .send();

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(%name, "Deleted uploaded file");
                true
            }
            Ok(response) => {
                tracing::warn!(%name, status = %response.status(), "Could not delete file");
                false
            }
            Err(e) => {
                tracing::warn!(%name, error = %e, "Could not delete file");
                false
            }
        }
    }

    fn info(&self, handle: &str) -> Result<FileMetadata, StoreError> {
        self.fetch_file(&resource_name(handle)).map(RemoteFile::into_metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_name_from_uri_handle() {
        assert_eq!(
            resource_name("https://generativelanguage.googleapis.com/v1beta/files/abc123"),
            "files/abc123"
        );
        assert_eq!(resource_name("abc123"), "files/abc123");
    }

    #[test]
    fn mime_detection() {
        assert_eq!(mime_for(Path::new("site.pdf")), "application/pdf");
        assert_eq!(mime_for(Path::new("site.PDF")), "application/pdf");
        assert_eq!(mime_for(Path::new("notes.txt")), "application/octet-stream");
    }

    #[test]
    fn remote_file_metadata_conversion() {
        let raw = r#"{
            "name": "files/abc123",
            "displayName": "Site Plan - site.pdf",
            "mimeType": "application/pdf",
            "sizeBytes": "204800",
            "state": "ACTIVE",
            "uri": "https://generativelanguage.googleapis.com/v1beta/files/abc123"
        }"#;
        let file: RemoteFile = serde_json::from_str(raw).unwrap();
        let meta = file.into_metadata();
        assert_eq!(meta.size_bytes, 204_800);
        assert_eq!(meta.state, FileState::Ready);
        assert_eq!(meta.display_name, "Site Plan - site.pdf");
    }

    #[test]
    fn upload_envelope_deserializes() {
        let raw = r#"{"file": {"name": "files/x", "state": "PROCESSING", "uri": "u"}}"#;
        let envelope: UploadEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(
            FileState::from_remote(&envelope.file.state),
            FileState::Processing
        );
    }
}
