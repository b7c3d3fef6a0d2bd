pub mod confidence;
pub mod legacy;
pub mod mapper;
pub mod ollama;
pub mod ollama_types;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod types;
pub mod validate;

pub use confidence::*;
pub use legacy::*;
pub use mapper::*;
pub use ollama::*;
pub use orchestrator::*;
pub use parser::*;
pub use prompt::*;
pub use types::*;
pub use validate::*;

use thiserror::Error;

/// Failures the extraction pipeline can produce. Provider and parse failures
/// are expected outcomes — the orchestrator converts them into a
/// PartialFailure envelope rather than letting them escape to the caller.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Vision provider timed out after {0} seconds")]
    ProviderTimeout(u64),

    #[error("Vision provider returned error (status {status}): {body}")]
    ProviderError { status: u16, body: String },

    #[error("Vision provider is unreachable at {0}")]
    ProviderUnavailable(String),

    #[error("Model response could not be parsed: {0}")]
    ParseFailure(String),

    #[error("Provider endpoint must be localhost, got {0}")]
    NonLocalEndpoint(String),

    #[error("Invalid image payload: {0}")]
    InvalidImage(String),
}

impl ExtractionError {
    /// Taxonomy label carried on the PartialFailure envelope.
    pub fn kind(&self) -> types::ErrorKind {
        match self {
            Self::ProviderTimeout(_) => types::ErrorKind::ProviderTimeout,
            Self::ProviderError { .. } => types::ErrorKind::ProviderError,
            Self::ProviderUnavailable(_) | Self::NonLocalEndpoint(_) => {
                types::ErrorKind::ProviderUnavailable
            }
            Self::ParseFailure(_) | Self::InvalidImage(_) => types::ErrorKind::ParseFailure,
        }
    }
}
