use reqwest::StatusCode;
use thiserror::Error;

use crate::model::Platform;

/// Errors that can occur while turning a request into platform posts
#[derive(Error, Debug)]
pub enum ChopError {
    /// Request body was neither multipart form data nor JSON
    #[error("Expected multipart/form-data or application/json")]
    UnsupportedMediaType(String),

    /// Source text was missing or only whitespace
    #[error("Missing or empty text content")]
    EmptyText,

    /// None of the requested platforms is supported
    #[error("No valid platforms specified. Allowed: {}", Platform::allowed_list())]
    NoValidPlatforms,

    /// Request body could not be decoded at all
    #[error("Malformed request body: {0}")]
    MalformedRequest(String),

    /// Transport-level failure talking to an external service
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("{provider} API error {status}: {body}")]
    ProviderStatus {
        provider: String,
        status: u16,
        body: String,
    },

    /// Provider answered without any content text
    #[error("{0} returned no valid content")]
    EmptyContent(String),

    /// Provider content did not contain a `results` array
    #[error("{0} response did not contain valid results array")]
    MissingResults(String),

    /// Provider results contained nothing usable for the requested platforms
    #[error("no valid results")]
    NoValidResults,

    /// A cascade was started with nothing to try
    #[error("No model candidates configured for {0}")]
    NoModelCandidates(String),

    /// Provider is enabled but has no key
    #[error("{0} not set")]
    MissingApiKey(&'static str),

    /// An attached document could not be read
    #[error("Failed to parse document: {0}")]
    DocumentParse(String),

    /// Invalid builder usage
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    /// Local file access failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChopError {
    /// HTTP status reported to the caller for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ChopError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ChopError::EmptyText | ChopError::NoValidPlatforms => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the error is a caller mistake rather than a server fault.
    pub fn is_validation(&self) -> bool {
        self.status().is_client_error()
    }
}
