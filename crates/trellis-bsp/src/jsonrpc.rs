//! JSON-RPC 2.0 envelopes exchanged with the client.
//!
//! Envelopes are read and written through [`AnyValue`], so payloads keep the
//! exact shape the peer sent until a handler asks for a typed view.

use std::fmt;

use thiserror::Error;
use trellis_value::{AnyCodable, AnyMap, AnyValue, DecodeError, optional_field, required_field};

use crate::error::ResponseError;

/// Protocol version stamped on every outbound envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// Identifier correlating a request with its reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestId {
    /// Numeric identifier.
    Number(i64),
    /// String identifier.
    String(String),
}

impl fmt::Display for RequestId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(formatter, "{number}"),
            Self::String(text) => write!(formatter, "{text:?}"),
        }
    }
}

impl From<i64> for RequestId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl AnyCodable for RequestId {
    fn from_map(_map: &AnyMap) -> Option<Self> {
        None
    }

    fn to_any(&self) -> AnyValue {
        match self {
            Self::Number(number) => AnyValue::Int(*number),
            Self::String(text) => AnyValue::String(text.clone()),
        }
    }

    fn from_any(value: &AnyValue) -> Option<Self> {
        match value {
            AnyValue::Int(number) => Some(Self::Number(*number)),
            AnyValue::String(text) => Some(Self::String(text.clone())),
            _ => None,
        }
    }
}

/// A request expecting exactly one reply.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcRequest {
    /// Correlation identifier.
    pub id: RequestId,
    /// Method name.
    pub method: String,
    /// Parameters; [`AnyValue::Null`] when omitted.
    pub params: AnyValue,
}

impl JsonRpcRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(id: impl Into<RequestId>, method: impl Into<String>, params: AnyValue) -> Self {
        Self {
            id: id.into(),
            method: method.into(),
            params,
        }
    }
}

impl AnyCodable for JsonRpcRequest {
    fn from_map(map: &AnyMap) -> Option<Self> {
        Some(Self {
            id: required_field(map, "id")?,
            method: required_field(map, "method")?,
            params: map.get("params").cloned().unwrap_or_default(),
        })
    }

    fn to_any(&self) -> AnyValue {
        let mut map = envelope();
        map.insert(String::from("id"), self.id.to_any());
        map.insert(String::from("method"), self.method.to_any());
        if !self.params.is_null() {
            map.insert(String::from("params"), self.params.clone());
        }
        AnyValue::Map(map)
    }
}

/// A one-way message.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcNotification {
    /// Method name.
    pub method: String,
    /// Parameters; [`AnyValue::Null`] when omitted.
    pub params: AnyValue,
}

impl JsonRpcNotification {
    /// Creates a notification.
    #[must_use]
    pub fn new(method: impl Into<String>, params: AnyValue) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

impl AnyCodable for JsonRpcNotification {
    fn from_map(map: &AnyMap) -> Option<Self> {
        Some(Self {
            method: required_field(map, "method")?,
            params: map.get("params").cloned().unwrap_or_default(),
        })
    }

    fn to_any(&self) -> AnyValue {
        let mut map = envelope();
        map.insert(String::from("method"), self.method.to_any());
        if !self.params.is_null() {
            map.insert(String::from("params"), self.params.clone());
        }
        AnyValue::Map(map)
    }
}

/// The reply to a request.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcResponse {
    /// Identifier of the request being answered. `None` when the peer could
    /// not determine it.
    pub id: Option<RequestId>,
    /// Success payload or error object.
    pub result: Result<AnyValue, ResponseError>,
}

impl JsonRpcResponse {
    /// Creates a reply for `id`.
    #[must_use]
    pub const fn new(id: RequestId, result: Result<AnyValue, ResponseError>) -> Self {
        Self {
            id: Some(id),
            result,
        }
    }
}

impl AnyCodable for JsonRpcResponse {
    fn from_map(map: &AnyMap) -> Option<Self> {
        let id = optional_field(map, "id")?;
        let result = match (map.get("result"), map.get("error")) {
            (_, Some(error)) if !error.is_null() => Err(ResponseError::from_any(error)?),
            (Some(result), _) => Ok(result.clone()),
            (None, _) => return None,
        };
        Some(Self { id, result })
    }

    fn to_any(&self) -> AnyValue {
        let mut map = envelope();
        map.insert(String::from("id"), self.id.to_any());
        match &self.result {
            Ok(result) => map.insert(String::from("result"), result.clone()),
            Err(error) => map.insert(String::from("error"), error.to_any()),
        };
        AnyValue::Map(map)
    }
}

/// Any inbound or outbound envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonRpcMessage {
    /// A request expecting a reply.
    Request(JsonRpcRequest),
    /// A one-way notification.
    Notification(JsonRpcNotification),
    /// A reply to an earlier request.
    Response(JsonRpcResponse),
}

/// Reasons a frame could not be read as an envelope.
#[derive(Debug, Error)]
pub enum MessageError {
    /// The frame was not valid JSON.
    #[error("malformed JSON payload: {0}")]
    Decode(#[from] DecodeError),
    /// The frame was JSON but not an object.
    #[error("JSON-RPC message must be an object")]
    NotAnObject,
    /// The `jsonrpc` member was missing or not `"2.0"`.
    #[error("unsupported JSON-RPC version")]
    UnsupportedVersion,
    /// The object did not match any envelope shape.
    #[error("message is not a request, notification or response")]
    Unrecognised,
}

impl JsonRpcMessage {
    /// Parses a frame payload into an envelope.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError`] when the payload is not JSON or does not have
    /// the shape of a JSON-RPC 2.0 envelope.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MessageError> {
        let value = trellis_value::decode(bytes)?;
        Self::classify(&value)
    }

    fn classify(value: &AnyValue) -> Result<Self, MessageError> {
        let map = value.as_map().ok_or(MessageError::NotAnObject)?;
        if map.get("jsonrpc").and_then(AnyValue::as_str) != Some(JSONRPC_VERSION) {
            return Err(MessageError::UnsupportedVersion);
        }
        let has_method = map.contains_key("method");
        let has_id = map.get("id").is_some_and(|id| !id.is_null());
        let message = match (has_method, has_id) {
            (true, true) => JsonRpcRequest::from_map(map).map(Self::Request),
            (true, false) => JsonRpcNotification::from_map(map).map(Self::Notification),
            (false, _) => JsonRpcResponse::from_map(map).map(Self::Response),
        };
        message.ok_or(MessageError::Unrecognised)
    }

    /// Serialises the envelope to JSON bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        trellis_value::encode(&self.to_any())
    }

    /// Returns the structured form of the envelope.
    #[must_use]
    pub fn to_any(&self) -> AnyValue {
        match self {
            Self::Request(request) => request.to_any(),
            Self::Notification(notification) => notification.to_any(),
            Self::Response(response) => response.to_any(),
        }
    }
}

fn envelope() -> AnyMap {
    AnyMap::from([(
        String::from("jsonrpc"),
        AnyValue::from(JSONRPC_VERSION),
    )])
}
