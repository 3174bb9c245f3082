//! Inbound message loop.

use std::io::BufRead;

use tracing::{debug, info, warn};

use crate::adapter::BuildServerAdapter;
use crate::jsonrpc::JsonRpcMessage;
use crate::protocol::{BuildNotification, OnBuildExit};
use crate::transport::{FrameReader, TransportError};

const SERVER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::server");

/// Reads framed messages from `reader` and hands them to `adapter`.
///
/// Returns when the stream ends or once an exit notification has closed the
/// connection. Frames that are not valid JSON-RPC are logged and skipped.
///
/// # Errors
///
/// Returns [`TransportError`] when the stream fails or carries malformed
/// framing.
pub fn serve<R: BufRead>(reader: R, adapter: &BuildServerAdapter) -> Result<(), TransportError> {
    let mut frames = FrameReader::new(reader);
    while !adapter.is_closed() {
        let Some(payload) = frames.read_frame()? else {
            info!(target: SERVER_TARGET, "client closed the input stream");
            break;
        };
        let message = match JsonRpcMessage::from_bytes(&payload) {
            Ok(message) => message,
            Err(error) => {
                warn!(target: SERVER_TARGET, %error, "skipping undecodable message");
                continue;
            }
        };
        let is_exit = matches!(
            &message,
            JsonRpcMessage::Notification(notification)
                if notification.method == OnBuildExit::METHOD
        );
        adapter.handle_message(message);
        if is_exit {
            debug!(target: SERVER_TARGET, "exit received; draining queued messages");
            adapter.wait_until_idle();
        }
    }
    Ok(())
}
