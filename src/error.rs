//! Error types for the Kusto client
//!
//! Every failure surfaced by the library is a [`KustoError`]. Each variant
//! carries a short description of the operation that failed together with the
//! identifier involved (endpoint, scope, parameter name, encoding).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, KustoError>;

#[derive(Debug, Error)]
pub enum KustoError {
    /// Empty or unparseable endpoint, bad client setup
    #[error("configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Metadata fetch or parse failure
    #[error("metadata resolution error: {message}")]
    Resolution {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Token acquisition failure, source is the credential provider's error untouched
    #[error("failed to acquire token for scope {scope}")]
    Authentication {
        scope: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: TransportError,
    },

    /// Unrecognized Content-Encoding or decompression failure
    #[error("encoding error: {message}")]
    Encoding {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Parameter type mismatch, unknown value kind, bad declaration
    #[error("validation error: {0}")]
    Validation(String),
}

/// Coarse error class, handy for matching without inspecting messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Resolution,
    Authentication,
    Transport,
    Encoding,
    Validation,
}

impl KustoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            KustoError::Config { .. } => ErrorKind::Config,
            KustoError::Resolution { .. } => ErrorKind::Resolution,
            KustoError::Authentication { .. } => ErrorKind::Authentication,
            KustoError::Transport { .. } => ErrorKind::Transport,
            KustoError::Encoding { .. } => ErrorKind::Encoding,
            KustoError::Validation(_) => ErrorKind::Validation,
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        KustoError::Config {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn config_with(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        KustoError::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub(crate) fn resolution(message: impl Into<String>) -> Self {
        KustoError::Resolution {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn resolution_with(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        KustoError::Resolution {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub(crate) fn transport(message: impl Into<String>, source: TransportError) -> Self {
        KustoError::Transport {
            message: message.into(),
            source,
        }
    }

    pub(crate) fn encoding(message: impl Into<String>, source: Option<std::io::Error>) -> Self {
        KustoError::Encoding {
            message: message.into(),
            source,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        KustoError::Validation(message.into())
    }
}

/// Failure reported by an [`HttpTransport`](crate::api::transport::HttpTransport)
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not reach the host (DNS, connect, TLS)
    #[error("connection failed: {0}")]
    Connect(String),

    /// A single attempt exceeded its time budget
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

impl TransportError {
    /// Transient failures are worth another attempt, everything else is final
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::Connect(_) | TransportError::Timeout(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportError::Timeout(std::time::Duration::ZERO)
        } else if error.is_connect() {
            TransportError::Connect(error.to_string())
        } else if error.is_body() || error.is_decode() {
            TransportError::Body(error.to_string())
        } else {
            TransportError::Request(error.to_string())
        }
    }
}
