//! The `sourceKit` extension payload of the initialize reply.

use lsp_types::FileSystemWatcher;
use tracing::warn;
use trellis_value::{AnyCodable, AnyMap, AnyValue, optional_field};

use crate::adapter::ADAPTER_TARGET;

/// `dataKind` tag of [`SourceKitInitializeBuildResponseData`].
pub const SOURCE_KIT_DATA_KIND: &str = "sourceKit";

/// Server capabilities beyond the standard protocol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceKitInitializeBuildResponseData {
    /// Location of the index database, when the backend knows it.
    pub index_database_path: Option<String>,
    /// Location of the raw index store, when the backend knows it.
    pub index_store_path: Option<String>,
    /// The server reports output paths of targets.
    pub output_paths_provider: bool,
    /// The server implements `buildTarget/prepare`.
    pub prepare_provider: bool,
    /// The server implements `textDocument/sourceKitOptions`.
    pub source_kit_options_provider: bool,
    /// Files whose changes the client should forward.
    pub watchers: Vec<FileSystemWatcher>,
}

impl AnyCodable for SourceKitInitializeBuildResponseData {
    fn from_map(map: &AnyMap) -> Option<Self> {
        let watchers = match map.get("watchers") {
            None | Some(AnyValue::Null) => Vec::new(),
            Some(value) => value.to_typed().ok()?,
        };
        Some(Self {
            index_database_path: optional_field(map, "indexDatabasePath")?,
            index_store_path: optional_field(map, "indexStorePath")?,
            output_paths_provider: optional_field(map, "outputPathsProvider")?.unwrap_or(false),
            prepare_provider: optional_field(map, "prepareProvider")?.unwrap_or(false),
            source_kit_options_provider: optional_field(map, "sourceKitOptionsProvider")?
                .unwrap_or(false),
            watchers,
        })
    }

    fn to_any(&self) -> AnyValue {
        let watchers = AnyValue::from_typed(&self.watchers).unwrap_or_else(|error| {
            warn!(
                target: ADAPTER_TARGET,
                %error,
                "failed to encode file watchers; announcing none"
            );
            AnyValue::List(Vec::new())
        });
        AnyValue::from_iter([
            ("indexDatabasePath", self.index_database_path.to_any()),
            ("indexStorePath", self.index_store_path.to_any()),
            ("outputPathsProvider", self.output_paths_provider.to_any()),
            ("prepareProvider", self.prepare_provider.to_any()),
            (
                "sourceKitOptionsProvider",
                self.source_kit_options_provider.to_any(),
            ),
            ("watchers", watchers),
        ])
    }
}

#[cfg(test)]
mod tests {
    use lsp_types::{GlobPattern, WatchKind};
    use rstest::rstest;

    use super::*;

    fn sample() -> SourceKitInitializeBuildResponseData {
        SourceKitInitializeBuildResponseData {
            index_database_path: None,
            index_store_path: Some(String::from("/build/index/store")),
            output_paths_provider: true,
            prepare_provider: true,
            source_kit_options_provider: true,
            watchers: vec![FileSystemWatcher {
                glob_pattern: GlobPattern::String(String::from("**/compile_commands.json")),
                kind: Some(WatchKind::Create | WatchKind::Change | WatchKind::Delete),
            }],
        }
    }

    #[rstest]
    fn unknown_paths_are_written_as_null() {
        let value = sample().to_any();
        assert_eq!(value.get("indexDatabasePath"), Some(&AnyValue::Null));
        assert_eq!(
            value.get("indexStorePath").and_then(AnyValue::as_str),
            Some("/build/index/store")
        );
    }

    #[rstest]
    fn watchers_use_protocol_field_names() {
        let value = sample().to_any();
        let watcher = value
            .get("watchers")
            .and_then(AnyValue::as_list)
            .and_then(<[AnyValue]>::first)
            .expect("one watcher");

        assert_eq!(
            watcher.get("globPattern").and_then(AnyValue::as_str),
            Some("**/compile_commands.json")
        );
        assert_eq!(watcher.get("kind"), Some(&AnyValue::Int(7)));
    }

    #[rstest]
    fn reads_back_what_it_writes() {
        let data = sample();
        assert_eq!(
            SourceKitInitializeBuildResponseData::from_any(&data.to_any()),
            Some(data)
        );
    }

    #[rstest]
    fn missing_flags_default_to_false() {
        let data = SourceKitInitializeBuildResponseData::from_map(&AnyMap::new())
            .expect("every member is optional");
        assert_eq!(data, SourceKitInitializeBuildResponseData::default());
    }
}
