//! Errors reported by queue completions.

use thiserror::Error;

/// Errors observed when waiting on a queued item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The job stopped without producing a result, typically because it
    /// panicked or its worker thread could not be started.
    #[error("queued job ended without producing a result")]
    Abandoned,
}
