//! The interface between the adapter and a concrete build system.
//!
//! A backend answers questions about the workspace's targets and their
//! sources. It is shared between queue worker threads and synchronises its own
//! state; the adapter only guarantees that state-changing notifications are
//! delivered before any later read.

mod descriptor;
mod error;

use std::path::PathBuf;

use lsp_types::{FileEvent, FileSystemWatcher};

pub use descriptor::{
    BackendDescriptor, BackendKind, BackendKindParseError, BackendProvider,
    InjectedBackendFactory,
};
pub use error::BackendError;

use crate::protocol::{
    BuildTargetIdentifier, BuildTargetSourcesResult, SourceKitOptionsParams,
    SourceKitOptionsResult, WorkspaceBuildTargetsResult,
};

/// A build system the adapter can front.
///
/// Methods may block; the adapter calls them from queue worker threads.
pub trait BuildBackend: Send + Sync {
    /// Name reported to the client in the initialize reply.
    fn display_name(&self) -> &str;

    /// Whether the backend implements `prepare` and reports output paths.
    fn supports_preparation_and_output_paths(&self) -> bool;

    /// Location of the index database, if the backend maintains one.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the location cannot be determined.
    fn index_database_path(&self) -> Result<Option<PathBuf>, BackendError>;

    /// Location of the raw index store, if the backend produces one.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the location cannot be determined.
    fn index_store_path(&self) -> Result<Option<PathBuf>, BackendError>;

    /// Files whose changes the client should report back.
    fn file_watchers(&self) -> Vec<FileSystemWatcher>;

    /// Brings `targets` to a state where they can be indexed.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when preparation fails.
    fn prepare(&self, targets: &[BuildTargetIdentifier]) -> Result<(), BackendError>;

    /// Lists the sources of each of `targets`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the build graph cannot be read.
    fn build_target_sources(
        &self,
        targets: &[BuildTargetIdentifier],
    ) -> Result<BuildTargetSourcesResult, BackendError>;

    /// Compiler arguments for one document, or `None` when the backend has no
    /// settings for it.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the settings cannot be computed.
    fn source_kit_options(
        &self,
        params: &SourceKitOptionsParams,
    ) -> Result<Option<SourceKitOptionsResult>, BackendError>;

    /// Enumerates every target in the workspace.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the build graph cannot be read.
    fn build_targets(&self) -> Result<WorkspaceBuildTargetsResult, BackendError>;

    /// Blocks until every file change reported so far has been processed.
    fn wait_for_build_system_updates(&self);

    /// Records that watched files changed.
    fn did_change_watched_files(&self, changes: &[FileEvent]);
}
