//! Exactly-once delivery of request replies.

use std::fmt;
use std::sync::Arc;

use tracing::warn;
use trellis_value::AnyValue;

use super::ADAPTER_TARGET;
use crate::connection::ClientConnection;
use crate::error::ResponseError;
use crate::jsonrpc::RequestId;

type ReplySink = Box<dyn FnOnce(RequestId, Result<AnyValue, ResponseError>) + Send>;

/// Obligation to answer one request.
///
/// [`ReplyHandle::send`] consumes the handle. A handle dropped without a reply,
/// for example because its job panicked, answers with an internal error so the
/// client is never left waiting.
pub struct ReplyHandle {
    id: RequestId,
    sink: Option<ReplySink>,
}

impl ReplyHandle {
    /// Creates a handle that passes the reply to `sink`.
    #[must_use]
    pub fn new<F>(id: RequestId, sink: F) -> Self
    where
        F: FnOnce(RequestId, Result<AnyValue, ResponseError>) + Send + 'static,
    {
        Self {
            id,
            sink: Some(Box::new(sink)),
        }
    }

    /// Creates a handle that replies through `connection`.
    #[must_use]
    pub fn for_connection(id: RequestId, connection: Arc<dyn ClientConnection>) -> Self {
        Self::new(id, move |reply_id, result| {
            connection.send_response(reply_id, result);
        })
    }

    /// Identifier of the request being answered.
    #[must_use]
    pub const fn id(&self) -> &RequestId {
        &self.id
    }

    /// Delivers `result`.
    pub fn send(mut self, result: Result<AnyValue, ResponseError>) {
        if let Some(sink) = self.sink.take() {
            sink(self.id.clone(), result);
        }
    }
}

impl Drop for ReplyHandle {
    fn drop(&mut self) {
        if let Some(sink) = self.sink.take() {
            warn!(
                target: ADAPTER_TARGET,
                id = %self.id,
                "request finished without a reply"
            );
            sink(
                self.id.clone(),
                Err(ResponseError::internal("request was abandoned before it completed")),
            );
        }
    }
}

impl fmt::Debug for ReplyHandle {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ReplyHandle")
            .field("id", &self.id)
            .field("pending", &self.sink.is_some())
            .finish()
    }
}
