//! Client connection double that records everything it is asked to send.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use trellis_value::AnyValue;

use crate::connection::ClientConnection;
use crate::error::ResponseError;
use crate::jsonrpc::RequestId;

/// A reply as seen by the client.
pub type Delivery = (RequestId, Result<AnyValue, ResponseError>);

#[derive(Default)]
struct Sent {
    responses: Vec<Delivery>,
    notifications: Vec<(String, AnyValue)>,
}

/// Records replies, notifications and close calls.
#[derive(Default)]
pub struct RecordingConnection {
    sent: Mutex<Sent>,
    arrived: Condvar,
    closes: AtomicUsize,
}

impl RecordingConnection {
    fn lock(&self) -> MutexGuard<'_, Sent> {
        self.sent.lock().expect("connection lock")
    }

    /// Waits until at least `count` replies have arrived and returns them all.
    pub fn wait_for_responses(&self, count: usize, timeout: Duration) -> Vec<Delivery> {
        let deadline = Instant::now() + timeout;
        let mut sent = self.lock();
        while sent.responses.len() < count {
            let remaining = deadline.saturating_duration_since(Instant::now());
            assert!(
                !remaining.is_zero(),
                "expected {count} responses, got {:?}",
                sent.responses
            );
            sent = self
                .arrived
                .wait_timeout(sent, remaining)
                .expect("connection lock")
                .0;
        }
        sent.responses.clone()
    }

    /// Waits for the reply to request `id`.
    pub fn wait_for_response(
        &self,
        id: i64,
        timeout: Duration,
    ) -> Result<AnyValue, ResponseError> {
        let deadline = Instant::now() + timeout;
        let wanted = RequestId::Number(id);
        let mut sent = self.lock();
        loop {
            if let Some((_, result)) = sent.responses.iter().find(|(seen, _)| *seen == wanted) {
                return result.clone();
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            assert!(!remaining.is_zero(), "no reply to request {id}");
            sent = self
                .arrived
                .wait_timeout(sent, remaining)
                .expect("connection lock")
                .0;
        }
    }

    /// Every reply so far, in delivery order.
    pub fn responses(&self) -> Vec<Delivery> {
        self.lock().responses.clone()
    }

    /// Ids of replies so far, in delivery order.
    pub fn response_ids(&self) -> Vec<RequestId> {
        self.lock()
            .responses
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Every notification so far.
    pub fn notifications(&self) -> Vec<(String, AnyValue)> {
        self.lock().notifications.clone()
    }

    /// Number of times `close` was called.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl ClientConnection for RecordingConnection {
    fn send_response(&self, id: RequestId, result: Result<AnyValue, ResponseError>) {
        self.lock().responses.push((id, result));
        self.arrived.notify_all();
    }

    fn send_notification(&self, method: &str, params: AnyValue) {
        self.lock()
            .notifications
            .push((method.to_owned(), params));
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}
