pub mod backoff;
pub mod gemini;
pub mod orchestrator;
pub mod parser;
pub mod prompt;

pub use backoff::*;
pub use gemini::*;
pub use orchestrator::*;
pub use parser::*;
pub use prompt::*;

use thiserror::Error;

/// Terminal failures of the analysis loop. Transient classes are retried
/// inside the orchestrator and never surface here.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Rate limit exceeded after {attempts} attempts. {guidance}")]
    RateLimitExceeded { attempts: usize, guidance: String },

    #[error("Invalid request rejected by the model endpoint: {0}")]
    InvalidRequest(String),

    #[error("No valid JSON found in response after {attempts} attempts: {last_error}")]
    NoParsableResponse { attempts: usize, last_error: String },

    #[error("Model call failed after {attempts} attempts: {source}")]
    Transport {
        attempts: usize,
        #[source]
        source: gemini::ModelError,
    },
}
