//! Selection and construction of the backend fronted by an adapter.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use super::{BackendError, BuildBackend};
use crate::connection::NotificationSink;

/// Factory for backends supplied by the embedding application.
///
/// Receives the project root and a sink for push notifications.
pub type InjectedBackendFactory = Arc<
    dyn Fn(&Path, NotificationSink) -> Result<Arc<dyn BuildBackend>, BackendError> + Send + Sync,
>;

/// Variety of build system behind an adapter.
#[derive(Clone)]
pub enum BackendKind {
    /// An external build server speaking the protocol itself.
    BuildServer,
    /// A `compile_commands.json` database.
    JsonCompilationDatabase,
    /// A `compile_flags.txt` file applying one set of flags to every file.
    FixedCompilationDatabase,
    /// The language's package manager.
    PackageManager,
    /// A backend built by an application-supplied factory.
    Injected(InjectedBackendFactory),
}

impl BackendKind {
    /// Stable kebab-case name of the kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BuildServer => "build-server",
            Self::JsonCompilationDatabase => "json-compilation-database",
            Self::FixedCompilationDatabase => "fixed-compilation-database",
            Self::PackageManager => "package-manager",
            Self::Injected(_) => "injected",
        }
    }

    /// Wraps `factory` as an injected kind.
    #[must_use]
    pub fn injected<F>(factory: F) -> Self
    where
        F: Fn(&Path, NotificationSink) -> Result<Arc<dyn BuildBackend>, BackendError>
            + Send
            + Sync
            + 'static,
    {
        Self::Injected(Arc::new(factory))
    }
}

impl fmt::Debug for BackendKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Injected(_) => formatter.write_str("Injected(..)"),
            other => formatter.write_str(other.name()),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

/// Error returned when parsing a backend kind fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported backend kind: {0}")]
pub struct BackendKindParseError(String);

impl BackendKindParseError {
    /// Returns the offending value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

/// Parses the built-in kinds. Injected backends carry a factory and cannot
/// be named.
impl FromStr for BackendKind {
    type Err = BackendKindParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "build-server" => Ok(Self::BuildServer),
            "json-compilation-database" => Ok(Self::JsonCompilationDatabase),
            "fixed-compilation-database" => Ok(Self::FixedCompilationDatabase),
            "package-manager" => Ok(Self::PackageManager),
            other => Err(BackendKindParseError(other.to_owned())),
        }
    }
}

/// Constructs built-in backends.
pub trait BackendProvider {
    /// Builds the backend described by `descriptor`.
    ///
    /// Only called for built-in kinds.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the backend cannot be started.
    fn create_backend(
        &self,
        descriptor: &BackendDescriptor,
        notifications: NotificationSink,
    ) -> Result<Arc<dyn BuildBackend>, BackendError>;
}

/// Which backend to construct, and where its project lives.
#[derive(Debug, Clone)]
pub struct BackendDescriptor {
    kind: BackendKind,
    project_root: PathBuf,
    config_path: PathBuf,
}

impl BackendDescriptor {
    /// Describes a backend of `kind` for the project at `project_root`,
    /// configured by the file at `config_path`.
    #[must_use]
    pub fn new(
        kind: BackendKind,
        project_root: impl Into<PathBuf>,
        config_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            kind,
            project_root: project_root.into(),
            config_path: config_path.into(),
        }
    }

    /// The backend kind.
    #[must_use]
    pub const fn kind(&self) -> &BackendKind {
        &self.kind
    }

    /// Root directory of the project.
    #[must_use]
    pub fn project_root(&self) -> &Path {
        self.project_root.as_path()
    }

    /// Build-system configuration file.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        self.config_path.as_path()
    }

    /// Constructs the described backend.
    ///
    /// Injected kinds call their own factory; built-in kinds go through
    /// `provider`.
    ///
    /// # Errors
    ///
    /// Propagates the factory's or provider's [`BackendError`].
    pub fn instantiate(
        &self,
        provider: &dyn BackendProvider,
        notifications: NotificationSink,
    ) -> Result<Arc<dyn BuildBackend>, BackendError> {
        match &self.kind {
            BackendKind::Injected(factory) => factory(self.project_root(), notifications),
            _ => provider.create_backend(self, notifications),
        }
    }
}
