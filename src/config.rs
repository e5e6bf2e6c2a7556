use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Archopinion";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "archopinion=info,warn".to_string()
}

/// Gemini model used for analysis unless overridden.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

/// Base URL for the Generative Language API.
pub const API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// HTTP timeout for a single inference call. Multimodal review of several
/// PDFs can legitimately take minutes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// API key, required for every remote call.
pub fn api_key() -> Result<String, MissingApiKey> {
    std::env::var("GEMINI_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or(MissingApiKey)
}

#[derive(Debug, thiserror::Error)]
#[error("GEMINI_API_KEY not found in environment variables")]
pub struct MissingApiKey;

/// Model name, overridable via GEMINI_MODEL.
pub fn model_name() -> String {
    std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string())
}

/// Directory reports are written to. Created on demand by the renderer.
pub fn output_dir() -> PathBuf {
    std::env::var("OUTPUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./reports"))
}

/// Maximum attempts for the analysis and upload retry loops.
pub fn max_retries() -> usize {
    std::env::var("MAX_RETRIES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3)
}

/// Base delay for exponential backoff after a rate-limit response.
pub fn rate_limit_delay() -> Duration {
    let secs = std::env::var("RATE_LIMIT_DELAY")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);
    Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_archopinion() {
        assert_eq!(APP_NAME, "Archopinion");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn default_output_dir_is_reports() {
        // Only meaningful when OUTPUT_DIR is unset in the test environment.
        if std::env::var("OUTPUT_DIR").is_err() {
            assert_eq!(output_dir(), PathBuf::from("./reports"));
        }
    }

    #[test]
    fn default_model_is_flash() {
        assert!(DEFAULT_MODEL.starts_with("gemini-"));
    }
}
