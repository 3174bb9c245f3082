//! Error types for structured value decoding and typed conversion.

use thiserror::Error;

/// Raised when raw bytes cannot be decoded into an [`AnyValue`](crate::AnyValue).
#[derive(Debug, Error)]
#[error("structured value cannot be decoded: {source}")]
pub struct DecodeError {
    #[source]
    source: serde_json::Error,
}

impl DecodeError {
    pub(crate) const fn new(source: serde_json::Error) -> Self {
        Self { source }
    }

    /// One-based line of the input where decoding stopped.
    #[must_use]
    pub fn line(&self) -> usize {
        self.source.line()
    }

    /// One-based column of the input where decoding stopped.
    #[must_use]
    pub fn column(&self) -> usize {
        self.source.column()
    }
}

/// Errors raised by the serde bridge between typed records and [`AnyValue`](crate::AnyValue).
#[derive(Debug, Error)]
pub enum CodecError {
    /// The typed value could not be represented as a structured value.
    #[error("failed to encode typed value: {0}")]
    Encode(#[source] serde_json::Error),

    /// The structured value does not match the requested type.
    #[error("failed to decode typed value: {0}")]
    Decode(#[source] serde_json::Error),
}
