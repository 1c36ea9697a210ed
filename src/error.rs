//! Custom error types for image-from-url.

use thiserror::Error;

/// Main error type for the image-from-url library.
#[derive(Error, Debug)]
pub enum Error {
    /// The URL could not be parsed or does not use an HTTP scheme.
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HTTP client failed (DNS, TLS, connection reset, timeout, ...).
    #[error("failed to fetch image from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("failed to fetch image from {url}: HTTP status {status}")]
    HttpStatus { url: String, status: u16 },

    /// The response body could not be decoded as an image.
    #[error("failed to decode image: {source}")]
    Decode {
        #[source]
        source: image::ImageError,
    },

    /// The container was recognised but its structure is broken.
    #[error("malformed image container: {reason}")]
    MalformedContainer { reason: String },

    /// The container decoded to zero frames.
    #[error("image container holds no frames")]
    EmptyContainer,

    /// Shape mismatch in tensor operations.
    #[error("tensor shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The two failure kinds surfaced to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request could not be issued or did not succeed.
    Fetch,
    /// The bytes could not be turned into tensors.
    Decode,
}

impl Error {
    /// Classify this error as a fetch or a decode failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl { .. }
            | Self::Fetch { .. }
            | Self::HttpStatus { .. }
            | Self::InvalidParameter { .. } => ErrorKind::Fetch,
            Self::Decode { .. }
            | Self::MalformedContainer { .. }
            | Self::EmptyContainer
            | Self::ShapeMismatch { .. }
            | Self::Io(_) => ErrorKind::Decode,
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(source: image::ImageError) -> Self {
        Self::Decode { source }
    }
}

/// Result type alias for image-from-url operations.
pub type Result<T> = std::result::Result<T, Error>;
