//! Parameter and result payloads.

use std::fmt;

use lsp_types::{TextDocumentIdentifier, Uri};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use trellis_value::AnyValue;

/// Parameters of methods that take none.
///
/// Decodes from `{}`; an omitted or `null` params member is normalised to `{}`
/// before decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoidParams {}

/// Result of methods that only acknowledge; encodes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoidResponse {}

/// Opaque reference to a build target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildTargetIdentifier {
    /// Target URI.
    pub uri: Uri,
}

impl BuildTargetIdentifier {
    /// Wraps `uri`.
    #[must_use]
    pub const fn new(uri: Uri) -> Self {
        Self { uri }
    }
}

/// Capabilities the client announces during initialisation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildClientCapabilities {
    /// Languages the client can work with.
    pub language_ids: Vec<String>,
}

/// `build/initialize` parameters.
///
/// The adapter does not act on these, so every member is optional on input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitializeBuildParams {
    /// Client name.
    pub display_name: String,
    /// Client version.
    pub version: String,
    /// Protocol revision the client speaks.
    pub bsp_version: String,
    /// Workspace root.
    pub root_uri: Option<Uri>,
    /// Client capabilities.
    pub capabilities: BuildClientCapabilities,
    /// Kind tag for `data`.
    pub data_kind: Option<String>,
    /// Client-specific extension payload.
    pub data: Option<AnyValue>,
}

/// Capabilities the server announces. Everything is communicated through the
/// `sourceKit` extension payload, so this is empty on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildServerCapabilities {}

/// `build/initialize` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeBuildResult {
    /// Server name, taken from the backend.
    pub display_name: String,
    /// Server version.
    pub version: String,
    /// Protocol revision.
    pub bsp_version: String,
    /// Standard capabilities.
    pub capabilities: BuildServerCapabilities,
    /// Kind tag for `data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_kind: Option<String>,
    /// Extension payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<AnyValue>,
}

/// `buildTarget/prepare` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTargetPrepareParams {
    /// Targets to prepare.
    pub targets: Vec<BuildTargetIdentifier>,
    /// Client-chosen identifier echoed in progress reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_id: Option<String>,
}

/// `buildTarget/sources` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTargetSourcesParams {
    /// Targets whose sources are requested.
    pub targets: Vec<BuildTargetIdentifier>,
}

/// `buildTarget/sources` result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildTargetSourcesResult {
    /// One entry per requested target.
    pub items: Vec<SourcesItem>,
}

/// Sources belonging to one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcesItem {
    /// The target.
    pub target: BuildTargetIdentifier,
    /// Its sources.
    pub sources: Vec<SourceItem>,
    /// Source roots of the target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roots: Option<Vec<Uri>>,
}

/// A file or directory belonging to a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceItem {
    /// Location of the source.
    pub uri: Uri,
    /// Whether `uri` names a file or a directory.
    pub kind: SourceItemKind,
    /// Whether the source is produced by the build.
    pub generated: bool,
    /// Kind tag for `data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_kind: Option<String>,
    /// Extension payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<AnyValue>,
}

/// Integer code outside a protocol enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown {enumeration} value: {value}")]
pub struct UnknownKind {
    enumeration: &'static str,
    value: u8,
}

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$variant_meta:meta])* $variant:ident = $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "u8", into = "u8")]
        #[repr(u8)]
        pub enum $name {
            $($(#[$variant_meta])* $variant = $value),+
        }

        impl TryFrom<u8> for $name {
            type Error = UnknownKind;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok(Self::$variant),)+
                    _ => Err(UnknownKind {
                        enumeration: stringify!($name),
                        value,
                    }),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(kind: $name) -> Self {
                kind as Self
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, formatter)
            }
        }
    };
}

wire_enum!(
    /// Whether a source item is a file or a directory.
    SourceItemKind {
        /// A single file.
        File = 1,
        /// A directory whose contents all belong to the target.
        Directory = 2,
    }
);

wire_enum!(
    /// How a build target changed.
    BuildTargetEventKind {
        /// The target is new.
        Created = 1,
        /// The target's sources or settings changed.
        Changed = 2,
        /// The target was removed.
        Deleted = 3,
    }
);

/// `textDocument/sourceKitOptions` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceKitOptionsParams {
    /// Document whose options are requested.
    pub text_document: TextDocumentIdentifier,
    /// Target the document is compiled in.
    pub target: BuildTargetIdentifier,
    /// Language of the document.
    #[serde(default)]
    pub language: String,
}

/// `textDocument/sourceKitOptions` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceKitOptionsResult {
    /// Compiler arguments for the document.
    pub compiler_arguments: Vec<String>,
    /// Directory the arguments are relative to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
    /// Extension payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<AnyValue>,
}

/// Capabilities of a single target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildTargetCapabilities {
    /// The target can be compiled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_compile: Option<bool>,
    /// The target can be tested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_test: Option<bool>,
    /// The target can be run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_run: Option<bool>,
}

/// A unit of the workspace that the build system can prepare.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTarget {
    /// Target identity.
    pub id: BuildTargetIdentifier,
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Directory the target lives in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_directory: Option<Uri>,
    /// Free-form tags such as `test` or `dependency`.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Languages the target contains.
    #[serde(default)]
    pub language_ids: Vec<String>,
    /// Targets this one depends on.
    #[serde(default)]
    pub dependencies: Vec<BuildTargetIdentifier>,
    /// What the build system can do with the target.
    #[serde(default)]
    pub capabilities: BuildTargetCapabilities,
    /// Kind tag for `data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_kind: Option<String>,
    /// Extension payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<AnyValue>,
}

/// `workspace/buildTargets` result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceBuildTargetsResult {
    /// Every target in the workspace.
    pub targets: Vec<BuildTarget>,
}

/// One entry of a `buildTarget/didChange` notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTargetEvent {
    /// The target that changed.
    pub target: BuildTargetIdentifier,
    /// How it changed, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<BuildTargetEventKind>,
    /// Kind tag for `data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_kind: Option<String>,
    /// Extension payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<AnyValue>,
}

/// `buildTarget/didChange` parameters.
///
/// `None` asks the client to reload every target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnBuildTargetDidChangeParams {
    /// The changed targets.
    pub changes: Option<Vec<BuildTargetEvent>>,
}
