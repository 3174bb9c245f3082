//! Shared configuration for the build-server bridge.
//!
//! The bridge is embedded by a host process that owns configuration loading.
//! This crate only defines the settings the bridge consumes, their defaults,
//! and their serde representation so hosts can read them from whichever
//! source they already use.

mod config;
mod defaults;
mod logging;

pub use config::AdapterConfig;
pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_SERVER_VERSION, default_log_filter, default_log_filter_string,
    default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};
