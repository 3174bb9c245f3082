//! Backend double that records calls and can be told to block or fail.

use std::path::PathBuf;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use lsp_types::{FileEvent, FileSystemWatcher, GlobPattern, Uri, WatchKind};

use crate::backend::{BackendError, BuildBackend};
use crate::error::ErrorCode;
use crate::protocol::{
    BuildTarget, BuildTargetCapabilities, BuildTargetIdentifier, BuildTargetSourcesResult,
    SourceItem, SourceItemKind, SourceKitOptionsParams, SourceKitOptionsResult, SourcesItem,
    WorkspaceBuildTargetsResult,
};

/// A backend method invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    /// `index_database_path` or `index_store_path`.
    IndexPath,
    /// `prepare` with target URIs.
    Prepare(Vec<String>),
    /// `build_target_sources` with target URIs.
    Sources(Vec<String>),
    /// `source_kit_options` for a document URI.
    Options(String),
    /// `build_targets`.
    BuildTargets,
    /// `wait_for_build_system_updates`.
    WaitForUpdates,
    /// `did_change_watched_files` with the changed URIs.
    WatchedFilesChanged(Vec<String>),
}

#[derive(Default)]
struct Recorded {
    calls: Vec<BackendCall>,
    changed_files: Vec<Uri>,
    active_prepares: usize,
    peak_prepares: usize,
}

/// Prepare calls wait until this many have been seen running at once, or
/// until the timeout.
#[derive(Debug, Clone, Copy)]
struct Rendezvous {
    peers: usize,
    timeout: Duration,
}

/// Configurable [`BuildBackend`] that records every call.
pub struct RecordingBackend {
    display_name: String,
    supports_preparation: bool,
    index_paths: Option<(PathBuf, PathBuf)>,
    failing_index_paths: bool,
    watchers: Vec<FileSystemWatcher>,
    prepare_failure: Option<(String, Option<ErrorCode>)>,
    rendezvous: Option<Rendezvous>,
    recorded: Mutex<Recorded>,
    prepare_changed: Condvar,
}

impl RecordingBackend {
    /// A backend that supports preparation and knows its index locations.
    pub fn new(display_name: &str) -> Self {
        Self {
            display_name: display_name.to_owned(),
            supports_preparation: true,
            index_paths: Some((
                PathBuf::from("/build/index/db"),
                PathBuf::from("/build/index/store"),
            )),
            failing_index_paths: false,
            watchers: vec![FileSystemWatcher {
                glob_pattern: GlobPattern::String(String::from("**/compile_commands.json")),
                kind: Some(WatchKind::Create | WatchKind::Change | WatchKind::Delete),
            }],
            prepare_failure: None,
            rendezvous: None,
            recorded: Mutex::new(Recorded::default()),
            prepare_changed: Condvar::new(),
        }
    }

    /// Turns off preparation support.
    pub fn without_preparation(mut self) -> Self {
        self.supports_preparation = false;
        self
    }

    /// Makes both index path queries fail.
    pub fn with_failing_index_paths(mut self) -> Self {
        self.failing_index_paths = true;
        self
    }

    /// Makes `prepare` fail with `message` and optional `code`.
    pub fn with_prepare_failure(mut self, message: &str, code: Option<ErrorCode>) -> Self {
        self.prepare_failure = Some((message.to_owned(), code));
        self
    }

    /// Makes each `prepare` wait up to `timeout` for `peers` prepares to be
    /// running at once.
    pub fn with_prepare_rendezvous(mut self, peers: usize, timeout: Duration) -> Self {
        self.rendezvous = Some(Rendezvous { peers, timeout });
        self
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().expect("backend lock")
    }

    fn record(&self, call: BackendCall) {
        self.lock().calls.push(call);
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().calls.clone()
    }

    /// Largest number of prepares observed running at once.
    pub fn peak_prepares(&self) -> usize {
        self.lock().peak_prepares
    }

    fn index_path(
        &self,
        pick: fn(&(PathBuf, PathBuf)) -> &PathBuf,
    ) -> Result<Option<PathBuf>, BackendError> {
        self.record(BackendCall::IndexPath);
        if self.failing_index_paths {
            return Err(BackendError::new("index location unavailable"));
        }
        Ok(self.index_paths.as_ref().map(|paths| pick(paths).clone()))
    }

    fn meet_peers(&self) {
        let Some(rendezvous) = self.rendezvous else {
            return;
        };
        let deadline = Instant::now() + rendezvous.timeout;
        let mut recorded = self.lock();
        recorded.active_prepares += 1;
        recorded.peak_prepares = recorded.peak_prepares.max(recorded.active_prepares);
        self.prepare_changed.notify_all();
        while recorded.peak_prepares < rendezvous.peers {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            recorded = self
                .prepare_changed
                .wait_timeout(recorded, remaining)
                .expect("backend lock")
                .0;
        }
        recorded.active_prepares -= 1;
    }
}

fn uris(targets: &[BuildTargetIdentifier]) -> Vec<String> {
    targets
        .iter()
        .map(|target| target.uri.as_str().to_owned())
        .collect()
}

impl BuildBackend for RecordingBackend {
    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn supports_preparation_and_output_paths(&self) -> bool {
        self.supports_preparation
    }

    fn index_database_path(&self) -> Result<Option<PathBuf>, BackendError> {
        self.index_path(|paths| &paths.0)
    }

    fn index_store_path(&self) -> Result<Option<PathBuf>, BackendError> {
        self.index_path(|paths| &paths.1)
    }

    fn file_watchers(&self) -> Vec<FileSystemWatcher> {
        self.watchers.clone()
    }

    fn prepare(&self, targets: &[BuildTargetIdentifier]) -> Result<(), BackendError> {
        self.record(BackendCall::Prepare(uris(targets)));
        self.meet_peers();
        match &self.prepare_failure {
            Some((message, Some(code))) => Err(BackendError::new(message.clone()).with_code(*code)),
            Some((message, None)) => Err(BackendError::new(message.clone())),
            None => Ok(()),
        }
    }

    /// Every target reports the files changed so far as its sources.
    fn build_target_sources(
        &self,
        targets: &[BuildTargetIdentifier],
    ) -> Result<BuildTargetSourcesResult, BackendError> {
        let mut recorded = self.lock();
        recorded.calls.push(BackendCall::Sources(uris(targets)));
        let sources: Vec<SourceItem> = recorded
            .changed_files
            .iter()
            .map(|uri| SourceItem {
                uri: uri.clone(),
                kind: SourceItemKind::File,
                generated: false,
                data_kind: None,
                data: None,
            })
            .collect();
        Ok(BuildTargetSourcesResult {
            items: targets
                .iter()
                .map(|target| SourcesItem {
                    target: target.clone(),
                    sources: sources.clone(),
                    roots: None,
                })
                .collect(),
        })
    }

    /// Headers have no settings; everything else compiles with `-DTEST`.
    fn source_kit_options(
        &self,
        params: &SourceKitOptionsParams,
    ) -> Result<Option<SourceKitOptionsResult>, BackendError> {
        let document = params.text_document.uri.as_str().to_owned();
        self.record(BackendCall::Options(document.clone()));
        if document.ends_with(".h") {
            return Ok(None);
        }
        Ok(Some(SourceKitOptionsResult {
            compiler_arguments: vec![String::from("-DTEST"), document],
            working_directory: Some(String::from("/repo")),
            data: None,
        }))
    }

    fn build_targets(&self) -> Result<WorkspaceBuildTargetsResult, BackendError> {
        self.record(BackendCall::BuildTargets);
        Ok(WorkspaceBuildTargetsResult {
            targets: vec![BuildTarget {
                id: super::target("target://lib"),
                display_name: Some(String::from("lib")),
                base_directory: None,
                tags: Vec::new(),
                language_ids: vec![String::from("c")],
                dependencies: Vec::new(),
                capabilities: BuildTargetCapabilities::default(),
                data_kind: None,
                data: None,
            }],
        })
    }

    fn wait_for_build_system_updates(&self) {
        self.record(BackendCall::WaitForUpdates);
    }

    fn did_change_watched_files(&self, changes: &[FileEvent]) {
        let mut recorded = self.lock();
        recorded.calls.push(BackendCall::WatchedFilesChanged(
            changes
                .iter()
                .map(|change| change.uri.as_str().to_owned())
                .collect(),
        ));
        recorded
            .changed_files
            .extend(changes.iter().map(|change| change.uri.clone()));
    }
}
