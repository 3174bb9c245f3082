//! Adapter lifecycle.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Phase of the adapter's session with its client.
///
/// Phases are ordered; the adapter only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LifecyclePhase {
    /// No initialize request has completed. Traffic is still served.
    #[default]
    Uninitialized,
    /// The handshake completed.
    Initialized,
    /// A shutdown request was handled; further requests are refused.
    ShuttingDown,
    /// The connection is closed.
    Closed,
}

impl LifecyclePhase {
    /// Whether requests other than shutdown are refused in this phase.
    #[must_use]
    pub const fn refuses_requests(self) -> bool {
        matches!(self, Self::ShuttingDown | Self::Closed)
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
            Self::ShuttingDown => "shutting-down",
            Self::Closed => "closed",
        };
        formatter.write_str(label)
    }
}

/// Lets exactly one caller perform the close.
#[derive(Debug, Default)]
pub(crate) struct CloseGuard {
    closed: AtomicBool,
}

impl CloseGuard {
    /// Returns `true` for the first caller only.
    pub(crate) fn claim(&self) -> bool {
        self.closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn is_claimed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
