//! Outbound channel to the client.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};
use trellis_value::{AnyValue, CodecError};

use crate::error::ResponseError;
use crate::jsonrpc::{JsonRpcMessage, JsonRpcNotification, JsonRpcResponse, RequestId};
use crate::protocol::BuildNotification;
use crate::transport::FrameWriter;

const CONNECTION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::connection");

/// Sink for messages the adapter sends to the client.
///
/// Implementations must tolerate calls from several threads and must treat
/// sends after [`ClientConnection::close`] as no-ops.
pub trait ClientConnection: Send + Sync {
    /// Delivers the reply to request `id`.
    fn send_response(&self, id: RequestId, result: Result<AnyValue, ResponseError>);

    /// Delivers a notification.
    fn send_notification(&self, method: &str, params: AnyValue);

    /// Closes the channel. Further sends are dropped.
    fn close(&self);
}

/// Typed handle backends use to push notifications to the client.
#[derive(Clone)]
pub struct NotificationSink {
    connection: Arc<dyn ClientConnection>,
}

impl NotificationSink {
    /// Wraps `connection`.
    #[must_use]
    pub const fn new(connection: Arc<dyn ClientConnection>) -> Self {
        Self { connection }
    }

    /// Sends notification `N` with `params`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] when the parameters cannot be encoded.
    pub fn notify<N: BuildNotification>(&self, params: &N::Params) -> Result<(), CodecError> {
        let encoded = AnyValue::from_typed(params)?;
        self.connection.send_notification(N::METHOD, encoded);
        Ok(())
    }
}

impl fmt::Debug for NotificationSink {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("NotificationSink").finish_non_exhaustive()
    }
}

/// [`ClientConnection`] writing `Content-Length` framed JSON-RPC to a stream.
pub struct FramedConnection<W> {
    writer: Mutex<Option<FrameWriter<W>>>,
}

impl<W: Write + Send> FramedConnection<W> {
    /// Frames messages onto `writer`.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(Some(FrameWriter::new(writer))),
        }
    }

    /// Whether [`ClientConnection::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock_writer().is_none()
    }

    fn lock_writer(&self) -> MutexGuard<'_, Option<FrameWriter<W>>> {
        self.writer
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    fn write(&self, message: &JsonRpcMessage) {
        let mut guard = self.lock_writer();
        let Some(writer) = guard.as_mut() else {
            debug!(target: CONNECTION_TARGET, "connection closed; dropping outbound message");
            return;
        };
        if let Err(error) = writer.write_frame(&message.to_bytes()) {
            warn!(target: CONNECTION_TARGET, %error, "failed to write outbound message");
        }
    }
}

impl<W: Write + Send> ClientConnection for FramedConnection<W> {
    fn send_response(&self, id: RequestId, result: Result<AnyValue, ResponseError>) {
        debug!(
            target: CONNECTION_TARGET,
            %id,
            success = result.is_ok(),
            "sending response"
        );
        self.write(&JsonRpcMessage::Response(JsonRpcResponse::new(id, result)));
    }

    fn send_notification(&self, method: &str, params: AnyValue) {
        debug!(target: CONNECTION_TARGET, method, "sending notification");
        self.write(&JsonRpcMessage::Notification(JsonRpcNotification::new(
            method, params,
        )));
    }

    fn close(&self) {
        let Some(writer) = self.lock_writer().take() else {
            return;
        };
        let mut inner = writer.into_inner();
        if let Err(error) = inner.flush() {
            warn!(target: CONNECTION_TARGET, %error, "failed to flush on close");
        }
        debug!(target: CONNECTION_TARGET, "connection closed");
    }
}

impl<W> fmt::Debug for FramedConnection<W> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("FramedConnection").finish_non_exhaustive()
    }
}
