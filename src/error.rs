//! Error types for the resolver, the composer and the export pipeline

use thiserror::Error;

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving avatars or composing frames
#[derive(Error, Debug)]
pub enum Error {
    /// The request itself is malformed (missing parameter, unknown platform,
    /// unusable username)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The account does not exist or has no public avatar
    #[error("Not found: {0}")]
    NotFound(String),

    /// The platform answered with something we could not use
    #[error("Upstream error: {0}")]
    UpstreamError(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Failed to decode or paint a layer
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Capture or file save produced nothing usable
    #[error("Export failed: {0}")]
    ExportError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// HTTP status the resolver endpoint answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidRequest(_) => 400,
            Error::NotFound(_) => 404,
            Error::UpstreamError(_) | Error::NetworkError(_) => 502,
            _ => 500,
        }
    }

    /// Whether the caller sent something malformed, as opposed to the lookup
    /// failing on the platform side.
    pub fn is_malformed_request(&self) -> bool {
        matches!(self, Error::InvalidRequest(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::NetworkError(err.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::RenderError(err.to_string())
    }
}
