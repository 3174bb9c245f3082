//! The build-server adapter.
//!
//! [`BuildServerAdapter`] receives decoded JSON-RPC traffic, routes it through
//! a dispatch table keyed by method name, and schedules the resulting jobs on a
//! [`MessageQueue`]. Each job carries a [`MessageDependency`] so that
//! state-changing messages act as barriers while independent reads and
//! preparations of disjoint targets overlap.

mod dependency;
mod hooks;
mod lifecycle;
mod reply;
mod routes;
mod state;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use trellis_config::AdapterConfig;
use trellis_queue::MessageQueue;

pub use dependency::MessageDependency;
pub use hooks::AdapterHooks;
pub use lifecycle::LifecyclePhase;
pub use reply::ReplyHandle;

use routes::DispatchTable;
use state::AdapterState;

use crate::backend::{BackendDescriptor, BackendProvider, BuildBackend};
use crate::connection::{ClientConnection, NotificationSink};
use crate::error::{AdapterError, ResponseError};
use crate::jsonrpc::{JsonRpcMessage, JsonRpcNotification, JsonRpcRequest};
use crate::protocol::{BuildNotification, BuildRequest, OnBuildExit, ShutdownBuild};

/// Tracing target for adapter dispatch.
pub(crate) const ADAPTER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::adapter");

/// Fronts one backend as a build server.
///
/// The adapter owns its backend for its whole lifetime. Dropping the adapter
/// closes the client connection if the session has not already done so.
pub struct BuildServerAdapter {
    state: Arc<AdapterState>,
    queue: MessageQueue<MessageDependency>,
    routes: DispatchTable,
    hooks: AdapterHooks,
}

impl BuildServerAdapter {
    /// Constructs the backend named by `descriptor` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::BackendStartup`] when the backend cannot be
    /// constructed.
    pub fn new(
        descriptor: &BackendDescriptor,
        provider: &dyn BackendProvider,
        connection: Arc<dyn ClientConnection>,
        config: &AdapterConfig,
    ) -> Result<Self, AdapterError> {
        let notifications = NotificationSink::new(Arc::clone(&connection));
        let backend = descriptor
            .instantiate(provider, notifications)
            .map_err(|source| AdapterError::BackendStartup {
                kind: descriptor.kind().to_string(),
                source,
            })?;
        debug!(
            target: ADAPTER_TARGET,
            kind = %descriptor.kind(),
            root = %descriptor.project_root().display(),
            backend = backend.display_name(),
            "backend started"
        );
        Ok(Self::with_backend(backend, connection, config))
    }

    /// Wraps an already constructed backend.
    #[must_use]
    pub fn with_backend(
        backend: Arc<dyn BuildBackend>,
        connection: Arc<dyn ClientConnection>,
        config: &AdapterConfig,
    ) -> Self {
        Self {
            state: Arc::new(AdapterState::new(
                backend,
                connection,
                config.server_version().to_owned(),
            )),
            queue: MessageQueue::with_limit(config.queue_concurrency()),
            routes: DispatchTable::standard(),
            hooks: AdapterHooks::default(),
        }
    }

    /// Installs `hooks`.
    #[must_use]
    pub fn with_hooks(mut self, hooks: AdapterHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> LifecyclePhase {
        self.state.phase()
    }

    /// Whether the connection has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    /// Dispatches a decoded inbound message. Requests are answered through the
    /// client connection.
    pub fn handle_message(&self, message: JsonRpcMessage) {
        match message {
            JsonRpcMessage::Request(request) => {
                let connection = Arc::clone(self.state.connection());
                let reply = ReplyHandle::for_connection(request.id.clone(), connection);
                self.handle_request(request, reply);
            }
            JsonRpcMessage::Notification(notification) => self.handle_notification(notification),
            JsonRpcMessage::Response(response) => {
                debug!(
                    target: ADAPTER_TARGET,
                    id = ?response.id,
                    "ignoring response; the adapter sends no requests"
                );
            }
        }
    }

    /// Routes `request` and eventually answers through `reply`.
    ///
    /// Unknown methods and undecodable parameters are answered immediately
    /// without reaching the queue. Everything else is queued under the
    /// method's dependency key.
    pub fn handle_request(&self, request: JsonRpcRequest, reply: ReplyHandle) {
        let JsonRpcRequest { id, method, params } = request;
        self.hooks.before_request(&method, &params);
        debug!(target: ADAPTER_TARGET, %id, method = %method, "received request");

        let prepared = match self.routes.route_request(&method, params) {
            Some(Ok(prepared)) => prepared,
            Some(Err(error)) => {
                warn!(target: ADAPTER_TARGET, %id, method = %method, %error, "rejecting request");
                reply.send(Err(error));
                return;
            }
            None => {
                warn!(target: ADAPTER_TARGET, %id, method = %method, "unknown request method");
                reply.send(Err(ResponseError::method_not_found(&method)));
                return;
            }
        };

        let state = Arc::clone(&self.state);
        drop(self.queue.submit(prepared.dependency, move || {
            let result = if state.phase().refuses_requests() && method != ShutdownBuild::METHOD {
                Err(ResponseError::shutting_down(&method))
            } else {
                (prepared.job)(&*state)
            };
            if let Err(error) = &result {
                debug!(target: ADAPTER_TARGET, %id, method = %method, %error, "request failed");
            }
            reply.send(result);
        }));
    }

    /// Routes `notification`. Unknown or undecodable notifications are logged
    /// and dropped, as is everything except `build/exit` once shutdown has
    /// been handled.
    pub fn handle_notification(&self, notification: JsonRpcNotification) {
        let JsonRpcNotification { method, params } = notification;
        debug!(target: ADAPTER_TARGET, method = %method, "received notification");

        let job = match self.routes.route_notification(&method, params) {
            Some(Ok(job)) => job,
            Some(Err(error)) => {
                warn!(target: ADAPTER_TARGET, method = %method, %error, "dropping notification");
                return;
            }
            None => {
                warn!(target: ADAPTER_TARGET, method = %method, "ignoring unknown notification");
                return;
            }
        };

        let state = Arc::clone(&self.state);
        drop(self.queue.submit(MessageDependency::StateChange, move || {
            if state.phase().refuses_requests() && method != OnBuildExit::METHOD {
                debug!(
                    target: ADAPTER_TARGET,
                    method = %method,
                    phase = %state.phase(),
                    "dropping notification after shutdown"
                );
                return;
            }
            job(&*state);
        }));
    }

    /// Blocks until every queued message has been handled.
    pub fn wait_until_idle(&self) {
        self.queue.wait_until_idle();
    }

    /// Waits up to `timeout` for queued messages. Returns `true` when idle.
    #[must_use]
    pub fn wait_until_idle_timeout(&self, timeout: Duration) -> bool {
        self.queue.wait_until_idle_timeout(timeout)
    }

    /// Closes the client connection if nothing has closed it yet.
    pub fn close(&self) {
        self.state.close("owner teardown");
    }
}

impl Drop for BuildServerAdapter {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for BuildServerAdapter {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("BuildServerAdapter")
            .field("phase", &self.phase())
            .field("queue", &self.queue)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}
