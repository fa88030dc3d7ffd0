//! Error taxonomy for the request executor.
//!
//! # Design
//! `ApiError` is the closed set of failures `HttpExecutor::execute` can
//! return. Six variants describe network-phase outcomes; `Validation`
//! wraps a `ValidationError` and is only ever produced before any socket
//! is opened. Callers branch on the variant (or on `ErrorKind`), never on
//! message text.

use thiserror::Error;

/// Boxed lower-level cause carried by transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A request descriptor failed its pre-flight check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid URL: url must not be blank")]
    BlankUrl,

    #[error("invalid URL: {0:?} must start with http:// or https://")]
    MissingScheme(String),

    #[error("invalid timeout: {0} ms, must be greater than zero")]
    NonPositiveTimeout(u64),
}

/// Errors returned by `HttpExecutor` and the response decoding helpers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request descriptor was rejected before any I/O.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// DNS resolution, connect, or any other transport-level failure.
    #[error("connection failure: {message}")]
    ConnectionFailure {
        message: String,
        #[source]
        source: BoxError,
    },

    /// Connecting or reading exceeded the request's `timeout_ms`.
    #[error("timeout: {message}")]
    Timeout { message: String },

    /// The TLS handshake with an `https` host failed.
    #[error("TLS failure: {message}")]
    TlsFailure {
        message: String,
        #[source]
        source: BoxError,
    },

    /// The URL could not be parsed or uses an unsupported scheme.
    #[error("invalid URL: {message}")]
    InvalidUrl { message: String },

    /// The server answered with a status of 400 or above.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The body could not be read as the format the caller asked for.
    #[error("decoding failure: {message}")]
    DecodingFailure { message: String },
}

/// Fieldless discriminant of `ApiError`, convenient for matching and for
/// mapping onto foreign error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    ConnectionFailure,
    Timeout,
    TlsFailure,
    InvalidUrl,
    HttpStatus,
    DecodingFailure,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::ConnectionFailure { .. } => ErrorKind::ConnectionFailure,
            ApiError::Timeout { .. } => ErrorKind::Timeout,
            ApiError::TlsFailure { .. } => ErrorKind::TlsFailure,
            ApiError::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            ApiError::HttpStatus { .. } => ErrorKind::HttpStatus,
            ApiError::DecodingFailure { .. } => ErrorKind::DecodingFailure,
        }
    }

    /// Status code of an `HttpStatus` error, `None` for every other kind.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn connection(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        ApiError::ConnectionFailure {
            message: message.into(),
            source: source.into(),
        }
    }

    pub(crate) fn tls(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        ApiError::TlsFailure {
            message: message.into(),
            source: source.into(),
        }
    }

    pub(crate) fn timeout(message: impl Into<String>) -> Self {
        ApiError::Timeout {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_url(message: impl Into<String>) -> Self {
        ApiError::InvalidUrl {
            message: message.into(),
        }
    }

    pub(crate) fn decoding(message: impl Into<String>) -> Self {
        ApiError::DecodingFailure {
            message: message.into(),
        }
    }
}
