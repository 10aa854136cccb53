//! Error types for configuration resolution

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

/// A module that could not be loaded, with the dependencies it was still waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StuckModule {
    pub name: String,
    pub missing: Vec<String>,
}

impl fmt::Display for StuckModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (missing: {})", self.name, self.missing.join(", "))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("external config source not found: {path}")]
    ExternalSourceMissing { path: String },

    #[error("unsupported external config format '{format}' for {path}")]
    ExternalSourceFormat { path: String, format: String },

    #[error("external source {source_path} does not provide key '{key}'")]
    KeyNotProvided { source_path: String, key: String },

    #[error("external source {source_path} does not contain '{key_path}' (for key '{key}')")]
    KeyNotFound { source_path: String, key: String, key_path: String },

    #[error(
        "external source {source_path}: segment '{segment}' of '{key_path}' (for key '{key}') \
         indexes into a non-mapping value"
    )]
    KeyPathMismatch { source_path: String, key: String, key_path: String, segment: String },

    #[error("key '{key}' not found in any external source listed in {chain}")]
    KeyNotFoundAnywhere { chain: String, key: String },

    #[error("required config option not set: {name}")]
    RequiredOptionUnset { name: String },

    #[error("'{referenced_by}' references '{name}', which has not been resolved yet")]
    UnresolvedName { name: String, referenced_by: String },

    #[error("no configuration value named '{name}'")]
    UnknownName { name: String },

    #[error("invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("failed to parse value of '{name}': {reason}")]
    Parse { name: String, reason: String },

    #[error("module dependencies cannot be satisfied: {}", format_stuck(.stuck))]
    DependencyDeadlock { stuck: Vec<StuckModule> },

    #[error("failed reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config document {}: {reason}", .path.display())]
    Document { path: PathBuf, reason: String },

    #[error("invalid settings: {0}")]
    Settings(#[from] Box<figment::Error>),
}

impl ConfigError {
    /// Per-source lookup failures that an `ExternalSourceChain` treats as "try the next source".
    pub fn is_key_miss(&self) -> bool {
        matches!(self, Self::KeyNotProvided { .. } | Self::KeyNotFound { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn document(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Document { path: path.into(), reason: reason.to_string() }
    }
}

fn format_stuck(stuck: &[StuckModule]) -> String {
    stuck.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}
