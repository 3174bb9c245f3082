//! One-shot completion signal for a queued item.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::error::QueueError;

/// Receives the result of a single queued job.
#[derive(Debug)]
pub struct Completion<T> {
    receiver: Receiver<T>,
}

impl<T> Completion<T> {
    pub(crate) const fn new(receiver: Receiver<T>) -> Self {
        Self { receiver }
    }

    /// Blocks until the job has finished and returns its result.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Abandoned`] when the job ended without a result.
    pub fn wait(self) -> Result<T, QueueError> {
        self.receiver.recv().map_err(|_| QueueError::Abandoned)
    }

    /// Waits up to `timeout` for the job to finish.
    ///
    /// Returns `Ok(None)` when the job is still pending or running.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Abandoned`] when the job ended without a result.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<Option<T>, QueueError> {
        match self.receiver.recv_timeout(timeout) {
            Ok(value) => Ok(Some(value)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(QueueError::Abandoned),
        }
    }
}
