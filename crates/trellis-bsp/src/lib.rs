//! Build Server Protocol facade over pluggable build-system backends.
//!
//! A [`BuildServerAdapter`] owns exactly one [`BuildBackend`], selected by a
//! [`BackendDescriptor`], and exposes it to a language-tooling client as a
//! build server. Inbound requests and notifications pass through a
//! dependency-aware queue: state changes (initialisation, watched-file
//! updates, shutdown) are serialised against everything else, while reads and
//! preparation of disjoint targets run concurrently. Replies are correlated
//! with their request ids and delivered through a [`ClientConnection`], which
//! the adapter closes exactly once.
//!
//! Concrete backends live outside this crate and plug in through the
//! [`BuildBackend`] trait, either via a [`BackendProvider`] or an injected
//! factory.

mod adapter;
mod backend;
mod connection;
mod error;
pub mod jsonrpc;
pub mod protocol;
mod server;
pub mod telemetry;
mod transport;

pub use adapter::{
    AdapterHooks, BuildServerAdapter, LifecyclePhase, MessageDependency, ReplyHandle,
};
pub use backend::{
    BackendDescriptor, BackendError, BackendKind, BackendKindParseError, BackendProvider,
    BuildBackend, InjectedBackendFactory,
};
pub use connection::{ClientConnection, FramedConnection, NotificationSink};
pub use error::{AdapterError, ErrorCode, ResponseError};
pub use server::serve;
pub use transport::{DEFAULT_MAX_FRAME_LEN, FrameReader, FrameWriter, TransportError};

#[cfg(test)]
mod tests;
