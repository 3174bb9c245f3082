//! Recording doubles shared by the adapter suites.

mod backend;
mod connection;

use std::str::FromStr;

use lsp_types::Uri;
use trellis_value::AnyValue;

pub use backend::{BackendCall, RecordingBackend};
pub use connection::RecordingConnection;

use crate::jsonrpc::{JsonRpcNotification, JsonRpcRequest, RequestId};
use crate::protocol::BuildTargetIdentifier;

/// How long any test waits for asynchronous work before failing.
pub const PATIENCE: std::time::Duration = std::time::Duration::from_secs(5);

/// Parses `text` as JSON into a structured value.
pub fn json(text: &str) -> AnyValue {
    trellis_value::decode(text.as_bytes()).expect("test JSON is valid")
}

/// Builds a request with a numeric id.
pub fn request(id: i64, method: &str, params: &str) -> JsonRpcRequest {
    JsonRpcRequest::new(RequestId::Number(id), method, json(params))
}

/// Builds a notification.
pub fn notification(method: &str, params: &str) -> JsonRpcNotification {
    JsonRpcNotification::new(method, json(params))
}

/// Builds a target identifier from a URI literal.
pub fn target(uri: &str) -> BuildTargetIdentifier {
    BuildTargetIdentifier::new(Uri::from_str(uri).expect("valid target uri"))
}

/// Parameters naming `targets` by URI, as sent by prepare and sources requests.
pub fn targets_params(targets: &[&str]) -> String {
    let list: Vec<String> = targets
        .iter()
        .map(|uri| format!(r#"{{"uri":"{uri}"}}"#))
        .collect();
    format!(r#"{{"targets":[{}]}}"#, list.join(","))
}
