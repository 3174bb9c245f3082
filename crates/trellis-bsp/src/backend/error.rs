//! Failures reported by backends.

use std::error::Error as StdError;

use thiserror::Error;

use crate::error::ErrorCode;

type BoxedSource = Box<dyn StdError + Send + Sync>;

/// A backend operation failed.
///
/// The message, and the code when present, are forwarded to the client
/// unchanged. Without a code the reply uses [`ErrorCode::REQUEST_FAILED`].
#[derive(Debug, Error)]
#[error("{message}")]
pub struct BackendError {
    message: String,
    code: Option<ErrorCode>,
    #[source]
    source: Option<BoxedSource>,
}

impl BackendError {
    /// Builds an error carrying only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            source: None,
        }
    }

    /// Builds an error that wraps an underlying source.
    #[must_use]
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxedSource>) -> Self {
        Self {
            message: message.into(),
            code: None,
            source: Some(source.into()),
        }
    }

    /// Sets the JSON-RPC code forwarded to the client.
    #[must_use]
    pub const fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Human-readable description.
    #[must_use]
    pub const fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Code chosen by the backend, if any.
    #[must_use]
    pub const fn code(&self) -> Option<ErrorCode> {
        self.code
    }
}
