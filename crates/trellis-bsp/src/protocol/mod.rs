//! Build Server Protocol messages understood by the adapter.
//!
//! Each message is a marker type implementing [`BuildRequest`] or
//! [`BuildNotification`], pairing a method name with its parameter and result
//! types. The adapter's dispatch table is keyed on these method names.

mod source_kit;
mod types;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use source_kit::{SOURCE_KIT_DATA_KIND, SourceKitInitializeBuildResponseData};
pub use types::{
    BuildClientCapabilities, BuildServerCapabilities, BuildTarget, BuildTargetCapabilities,
    BuildTargetEvent, BuildTargetEventKind, BuildTargetIdentifier, BuildTargetPrepareParams,
    BuildTargetSourcesParams, BuildTargetSourcesResult, InitializeBuildParams,
    InitializeBuildResult, OnBuildTargetDidChangeParams, SourceItem, SourceItemKind, SourcesItem,
    SourceKitOptionsParams, SourceKitOptionsResult, UnknownKind, VoidParams, VoidResponse,
    WorkspaceBuildTargetsResult,
};

/// Protocol revision announced during initialisation.
pub const BSP_VERSION: &str = "2.2.0";

/// A request method with typed parameters and result.
pub trait BuildRequest {
    /// Parameter payload.
    type Params: DeserializeOwned + Serialize + Send + 'static;
    /// Result payload.
    type Response: DeserializeOwned + Serialize + Send + 'static;
    /// Wire method name.
    const METHOD: &'static str;
}

/// A notification method with typed parameters.
pub trait BuildNotification {
    /// Parameter payload.
    type Params: DeserializeOwned + Serialize + Send + 'static;
    /// Wire method name.
    const METHOD: &'static str;
}

macro_rules! build_request {
    ($(#[$meta:meta])* $name:ident, $method:literal, $params:ty, $response:ty) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub enum $name {}

        impl BuildRequest for $name {
            type Params = $params;
            type Response = $response;
            const METHOD: &'static str = $method;
        }
    };
}

macro_rules! build_notification {
    ($(#[$meta:meta])* $name:ident, $method:literal, $params:ty) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub enum $name {}

        impl BuildNotification for $name {
            type Params = $params;
            const METHOD: &'static str = $method;
        }
    };
}

build_request!(
    /// `build/initialize`: handshake returning server capabilities.
    InitializeBuild,
    "build/initialize",
    InitializeBuildParams,
    InitializeBuildResult
);
build_request!(
    /// `build/shutdown`: stop accepting work ahead of `build/exit`.
    ShutdownBuild,
    "build/shutdown",
    VoidParams,
    VoidResponse
);
build_request!(
    /// `buildTarget/prepare`: bring targets to a state where they can be indexed.
    BuildTargetPrepare,
    "buildTarget/prepare",
    BuildTargetPrepareParams,
    VoidResponse
);
build_request!(
    /// `buildTarget/sources`: list the sources of each target.
    BuildTargetSources,
    "buildTarget/sources",
    BuildTargetSourcesParams,
    BuildTargetSourcesResult
);
build_request!(
    /// `textDocument/sourceKitOptions`: compiler arguments for one file.
    TextDocumentSourceKitOptions,
    "textDocument/sourceKitOptions",
    SourceKitOptionsParams,
    Option<SourceKitOptionsResult>
);
build_request!(
    /// `workspace/buildTargets`: enumerate the workspace's targets.
    WorkspaceBuildTargets,
    "workspace/buildTargets",
    VoidParams,
    WorkspaceBuildTargetsResult
);
build_request!(
    /// `workspace/waitForBuildSystemUpdates`: block until pending updates are applied.
    WorkspaceWaitForBuildSystemUpdates,
    "workspace/waitForBuildSystemUpdates",
    VoidParams,
    VoidResponse
);

build_notification!(
    /// `build/initialized`: the client processed the initialize reply.
    OnBuildInitialized,
    "build/initialized",
    VoidParams
);
build_notification!(
    /// `build/exit`: the client is done; the connection closes.
    OnBuildExit,
    "build/exit",
    VoidParams
);
build_notification!(
    /// `workspace/didChangeWatchedFiles`: files matching a watcher changed.
    OnWatchedFilesDidChange,
    "workspace/didChangeWatchedFiles",
    lsp_types::DidChangeWatchedFilesParams
);
build_notification!(
    /// `buildTarget/didChange`: pushed by the server when targets change.
    OnBuildTargetDidChange,
    "buildTarget/didChange",
    OnBuildTargetDidChangeParams
);
