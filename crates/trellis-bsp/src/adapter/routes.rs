//! Method dispatch table.
//!
//! Each route decodes its parameters, derives the message's dependency key,
//! and packages the handler into a job for the queue. Routes are generated
//! from the [`BuildRequest`] and [`BuildNotification`] marker types, so a
//! method name, its payload types and its handler cannot drift apart.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use trellis_value::{AnyCodable, AnyMap, AnyValue};

use super::state::AdapterState;
use super::{ADAPTER_TARGET, LifecyclePhase, MessageDependency};
use crate::backend::BackendError;
use crate::error::ResponseError;
use crate::protocol::{
    BSP_VERSION, BuildNotification, BuildRequest, BuildServerCapabilities, BuildTargetPrepare,
    BuildTargetPrepareParams, BuildTargetSources, BuildTargetSourcesParams,
    BuildTargetSourcesResult, InitializeBuild, InitializeBuildParams, InitializeBuildResult,
    OnBuildExit, OnBuildInitialized, OnWatchedFilesDidChange, SOURCE_KIT_DATA_KIND,
    ShutdownBuild, SourceKitInitializeBuildResponseData, SourceKitOptionsParams,
    SourceKitOptionsResult, TextDocumentSourceKitOptions, VoidParams, VoidResponse,
    WorkspaceBuildTargets, WorkspaceBuildTargetsResult, WorkspaceWaitForBuildSystemUpdates,
};

pub(super) type RequestJob =
    Box<dyn FnOnce(&AdapterState) -> Result<AnyValue, ResponseError> + Send>;
pub(super) type NotificationJob = Box<dyn FnOnce(&AdapterState) + Send>;

/// A request ready to be queued.
pub(super) struct PreparedRequest {
    pub(super) dependency: MessageDependency,
    pub(super) job: RequestJob,
}

type RequestRoute = Box<dyn Fn(AnyValue) -> Result<PreparedRequest, ResponseError> + Send + Sync>;
type NotificationRoute =
    Box<dyn Fn(AnyValue) -> Result<NotificationJob, ResponseError> + Send + Sync>;

/// Routes keyed by method name.
pub(super) struct DispatchTable {
    requests: HashMap<&'static str, RequestRoute>,
    notifications: HashMap<&'static str, NotificationRoute>,
}

impl DispatchTable {
    /// The adapter's routes.
    pub(super) fn standard() -> Self {
        let mut table = Self {
            requests: HashMap::new(),
            notifications: HashMap::new(),
        };
        table.request::<InitializeBuild>(|_| MessageDependency::StateChange, initialize);
        table.request::<ShutdownBuild>(|_| MessageDependency::StateChange, shutdown);
        table.request::<BuildTargetPrepare>(
            |params| MessageDependency::prepare(&params.targets),
            prepare,
        );
        table.request::<BuildTargetSources>(|_| MessageDependency::StateRead, sources);
        table.request::<TextDocumentSourceKitOptions>(
            |_| MessageDependency::StateRead,
            source_kit_options,
        );
        table.request::<WorkspaceBuildTargets>(|_| MessageDependency::StateRead, build_targets);
        table.request::<WorkspaceWaitForBuildSystemUpdates>(
            |_| MessageDependency::StateRead,
            wait_for_updates,
        );
        table.notification::<OnBuildInitialized>(initialized);
        table.notification::<OnBuildExit>(exit);
        table.notification::<OnWatchedFilesDidChange>(watched_files_changed);
        table
    }

    pub(super) fn route_request(
        &self,
        method: &str,
        params: AnyValue,
    ) -> Option<Result<PreparedRequest, ResponseError>> {
        self.requests.get(method).map(|route| route(params))
    }

    pub(super) fn route_notification(
        &self,
        method: &str,
        params: AnyValue,
    ) -> Option<Result<NotificationJob, ResponseError>> {
        self.notifications.get(method).map(|route| route(params))
    }

    #[cfg(test)]
    pub(super) fn request_methods(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.requests.keys().copied()
    }

    #[cfg(test)]
    pub(super) fn notification_methods(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.notifications.keys().copied()
    }

    fn request<R: BuildRequest + 'static>(
        &mut self,
        dependency_of: fn(&R::Params) -> MessageDependency,
        handler: fn(&AdapterState, &R::Params) -> Result<R::Response, ResponseError>,
    ) {
        let route: RequestRoute = Box::new(move |raw_params: AnyValue| {
            let params: R::Params = decode_params(R::METHOD, &raw_params)?;
            let dependency = dependency_of(&params);
            let job: RequestJob = Box::new(move |state: &AdapterState| {
                let response = handler(state, &params)?;
                AnyValue::from_typed(&response).map_err(|error| {
                    ResponseError::internal(format!(
                        "failed to encode {} response: {error}",
                        R::METHOD
                    ))
                })
            });
            Ok(PreparedRequest { dependency, job })
        });
        self.requests.insert(R::METHOD, route);
    }

    fn notification<N: BuildNotification + 'static>(&mut self, handler: fn(&AdapterState, &N::Params)) {
        let route: NotificationRoute = Box::new(move |raw_params: AnyValue| {
            let params: N::Params = decode_params(N::METHOD, &raw_params)?;
            let job: NotificationJob =
                Box::new(move |state: &AdapterState| handler(state, &params));
            Ok(job)
        });
        self.notifications.insert(N::METHOD, route);
    }
}

/// Decodes `params`, treating an omitted payload as an empty object.
fn decode_params<T: DeserializeOwned>(method: &str, params: &AnyValue) -> Result<T, ResponseError> {
    let decoded = if params.is_null() {
        AnyValue::Map(AnyMap::new()).to_typed()
    } else {
        params.to_typed()
    };
    decoded.map_err(|error| ResponseError::invalid_params(method, &error))
}

fn initialize(
    state: &AdapterState,
    params: &InitializeBuildParams,
) -> Result<InitializeBuildResult, ResponseError> {
    let backend = state.backend();
    info!(
        target: ADAPTER_TARGET,
        client = %params.display_name,
        backend = backend.display_name(),
        "initializing build server"
    );
    let supports_preparation = backend.supports_preparation_and_output_paths();
    let data = SourceKitInitializeBuildResponseData {
        index_database_path: path_or_log("index database path", backend.index_database_path()),
        index_store_path: path_or_log("index store path", backend.index_store_path()),
        output_paths_provider: supports_preparation,
        prepare_provider: supports_preparation,
        source_kit_options_provider: true,
        watchers: backend.file_watchers(),
    };
    state.advance_to(LifecyclePhase::Initialized);
    Ok(InitializeBuildResult {
        display_name: backend.display_name().to_owned(),
        version: state.server_version().to_owned(),
        bsp_version: BSP_VERSION.to_owned(),
        capabilities: BuildServerCapabilities::default(),
        data_kind: Some(SOURCE_KIT_DATA_KIND.to_owned()),
        data: Some(data.to_any()),
    })
}

fn path_or_log(what: &str, query: Result<Option<PathBuf>, BackendError>) -> Option<String> {
    query
        .unwrap_or_else(|error| {
            warn!(target: ADAPTER_TARGET, what, %error, "backend query failed; reporting null");
            None
        })
        .map(|path| path.to_string_lossy().into_owned())
}

fn shutdown(state: &AdapterState, _params: &VoidParams) -> Result<VoidResponse, ResponseError> {
    state.advance_to(LifecyclePhase::ShuttingDown);
    info!(target: ADAPTER_TARGET, "build server shutting down");
    Ok(VoidResponse {})
}

fn prepare(
    state: &AdapterState,
    params: &BuildTargetPrepareParams,
) -> Result<VoidResponse, ResponseError> {
    state.backend().prepare(&params.targets)?;
    Ok(VoidResponse {})
}

fn sources(
    state: &AdapterState,
    params: &BuildTargetSourcesParams,
) -> Result<BuildTargetSourcesResult, ResponseError> {
    state
        .backend()
        .build_target_sources(&params.targets)
        .map_err(ResponseError::from)
}

fn source_kit_options(
    state: &AdapterState,
    params: &SourceKitOptionsParams,
) -> Result<Option<SourceKitOptionsResult>, ResponseError> {
    state
        .backend()
        .source_kit_options(params)
        .map_err(ResponseError::from)
}

fn build_targets(
    state: &AdapterState,
    _params: &VoidParams,
) -> Result<WorkspaceBuildTargetsResult, ResponseError> {
    state.backend().build_targets().map_err(ResponseError::from)
}

fn wait_for_updates(
    state: &AdapterState,
    _params: &VoidParams,
) -> Result<VoidResponse, ResponseError> {
    state.backend().wait_for_build_system_updates();
    Ok(VoidResponse {})
}

fn initialized(_state: &AdapterState, _params: &VoidParams) {
    debug!(target: ADAPTER_TARGET, "client finished initialization");
}

fn exit(state: &AdapterState, _params: &VoidParams) {
    state.close("exit notification");
}

fn watched_files_changed(state: &AdapterState, params: &lsp_types::DidChangeWatchedFilesParams) {
    debug!(
        target: ADAPTER_TARGET,
        changes = params.changes.len(),
        "forwarding watched file changes"
    );
    state.backend().did_change_watched_files(&params.changes);
}
