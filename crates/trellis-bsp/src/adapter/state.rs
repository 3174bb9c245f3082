//! State shared between the adapter handle and its queued jobs.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};

use super::ADAPTER_TARGET;
use super::lifecycle::{CloseGuard, LifecyclePhase};
use crate::backend::BuildBackend;
use crate::connection::ClientConnection;

pub(crate) struct AdapterState {
    backend: Arc<dyn BuildBackend>,
    connection: Arc<dyn ClientConnection>,
    phase: Mutex<LifecyclePhase>,
    close_guard: CloseGuard,
    server_version: String,
}

impl AdapterState {
    pub(crate) fn new(
        backend: Arc<dyn BuildBackend>,
        connection: Arc<dyn ClientConnection>,
        server_version: String,
    ) -> Self {
        Self {
            backend,
            connection,
            phase: Mutex::new(LifecyclePhase::Uninitialized),
            close_guard: CloseGuard::default(),
            server_version,
        }
    }

    pub(crate) fn backend(&self) -> &dyn BuildBackend {
        self.backend.as_ref()
    }

    pub(crate) const fn connection(&self) -> &Arc<dyn ClientConnection> {
        &self.connection
    }

    pub(crate) const fn server_version(&self) -> &str {
        self.server_version.as_str()
    }

    pub(crate) fn phase(&self) -> LifecyclePhase {
        *self.lock_phase()
    }

    /// Moves to `next` unless the adapter is already at or past it.
    pub(crate) fn advance_to(&self, next: LifecyclePhase) {
        let mut phase = self.lock_phase();
        if *phase < next {
            debug!(target: ADAPTER_TARGET, from = %*phase, to = %next, "lifecycle transition");
            *phase = next;
        }
    }

    /// Closes the connection on the first call; later calls do nothing.
    pub(crate) fn close(&self, reason: &'static str) {
        if !self.close_guard.claim() {
            debug!(target: ADAPTER_TARGET, reason, "connection already closed");
            return;
        }
        self.advance_to(LifecyclePhase::Closed);
        self.connection.close();
        info!(target: ADAPTER_TARGET, reason, "build server connection closed");
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.close_guard.is_claimed()
    }

    fn lock_phase(&self) -> MutexGuard<'_, LifecyclePhase> {
        self.phase
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}
