//! Settings consumed by the protocol adapter.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::defaults::{default_log_filter_string, default_server_version_string};
use crate::logging::LogFormat;

/// Adapter settings.
///
/// Every field has a default, so an empty document deserialises to
/// [`AdapterConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdapterConfig {
    /// `tracing` filter expression applied by telemetry.
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Output format for log events.
    pub log_format: LogFormat,
    /// Maximum number of queued messages executing at once. Unbounded when
    /// unset.
    pub queue_concurrency: Option<NonZeroUsize>,
    /// Version string reported in the initialize response.
    #[serde(default = "default_server_version_string")]
    pub server_version: String,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: LogFormat::default(),
            queue_concurrency: None,
            server_version: default_server_version_string(),
        }
    }
}

impl AdapterConfig {
    /// Returns the configured log filter.
    #[must_use]
    pub const fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the configured log format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the queue concurrency limit, if any.
    #[must_use]
    pub const fn queue_concurrency(&self) -> Option<NonZeroUsize> {
        self.queue_concurrency
    }

    /// Returns the version string reported during the handshake.
    #[must_use]
    pub const fn server_version(&self) -> &str {
        self.server_version.as_str()
    }

    /// Replaces the queue concurrency limit.
    #[must_use]
    pub const fn with_queue_concurrency(mut self, limit: Option<NonZeroUsize>) -> Self {
        self.queue_concurrency = limit;
        self
    }

    /// Replaces the reported server version.
    #[must_use]
    pub fn with_server_version(mut self, version: impl Into<String>) -> Self {
        self.server_version = version.into();
        self
    }
}
