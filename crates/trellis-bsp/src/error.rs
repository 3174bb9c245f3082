//! Error types surfaced by the build-server adapter.

use std::fmt;

use thiserror::Error;
use trellis_value::{AnyCodable, AnyMap, AnyValue, optional_field, required_field};

use crate::backend::BackendError;

/// JSON-RPC error code carried in an error reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(pub i64);

impl ErrorCode {
    /// The payload was not valid JSON.
    pub const PARSE_ERROR: Self = Self(-32_700);
    /// The payload was not a valid request object.
    pub const INVALID_REQUEST: Self = Self(-32_600);
    /// No handler exists for the requested method.
    pub const METHOD_NOT_FOUND: Self = Self(-32_601);
    /// The parameters did not match the method's schema.
    pub const INVALID_PARAMS: Self = Self(-32_602);
    /// The server failed while handling the request.
    pub const INTERNAL_ERROR: Self = Self(-32_603);
    /// The request was valid but could not be served in the current state.
    pub const REQUEST_FAILED: Self = Self(-32_803);

    /// Returns the numeric code.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Error object delivered to the client in place of a result.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} (code: {code})")]
pub struct ResponseError {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable description.
    pub message: String,
    /// Optional structured detail.
    pub data: Option<AnyValue>,
}

impl ResponseError {
    /// Builds an error with the given code and message.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Reply for a method the adapter does not serve.
    #[must_use]
    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            ErrorCode::METHOD_NOT_FOUND,
            format!("method not found: {method}"),
        )
    }

    /// Reply for parameters that could not be decoded.
    #[must_use]
    pub fn invalid_params(method: &str, detail: &impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::INVALID_PARAMS,
            format!("invalid params for {method}: {detail}"),
        )
    }

    /// Reply for an internal failure.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::INTERNAL_ERROR, message)
    }

    /// Reply for a request that arrives after shutdown.
    #[must_use]
    pub fn shutting_down(method: &str) -> Self {
        Self::new(
            ErrorCode::REQUEST_FAILED,
            format!("build server is shutting down; rejected {method}"),
        )
    }

    /// Attaches structured detail.
    #[must_use]
    pub fn with_data(mut self, data: AnyValue) -> Self {
        self.data = Some(data);
        self
    }
}

impl From<BackendError> for ResponseError {
    fn from(error: BackendError) -> Self {
        let code = error.code().unwrap_or(ErrorCode::REQUEST_FAILED);
        Self::new(code, error.to_string())
    }
}

impl AnyCodable for ResponseError {
    fn from_map(map: &AnyMap) -> Option<Self> {
        Some(Self {
            code: ErrorCode(required_field(map, "code")?),
            message: required_field(map, "message")?,
            data: optional_field(map, "data")?,
        })
    }

    fn to_any(&self) -> AnyValue {
        let mut map = AnyMap::new();
        map.insert(String::from("code"), AnyValue::Int(self.code.value()));
        map.insert(String::from("message"), self.message.to_any());
        if let Some(data) = &self.data {
            map.insert(String::from("data"), data.clone());
        }
        AnyValue::Map(map)
    }
}

/// Errors raised while constructing an adapter.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The selected backend could not be started.
    #[error("failed to start {kind} backend: {source}")]
    BackendStartup {
        /// Name of the backend kind.
        kind: String,
        /// The underlying backend failure.
        #[source]
        source: BackendError,
    },
}
