//! Domain-specific error types for the reconciliation engine.
//!
//! Internal modules return typed errors ([`DotError`], [`ConfigError`],
//! [`CacheError`]) while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! DotError                    aborts one dot, never the whole run
//! ├── MissingRequiredField    ┐
//! ├── InvalidField            ┘ ValidationError
//! ├── SourceNotFound          ┐
//! ├── SourceWrongType         ┘ SourceError
//! ├── MissingDirectory          MissingDirectoryError
//! ├── TargetExists              TargetExistsError
//! ├── UnexpectedFileState       UnexpectedFileStateError
//! ├── MissingLink               MissingLinkError
//! ├── Backup                    BackupError
//! ├── Filesystem                FilesystemError
//! └── Cache(CacheError)         CacheError
//!
//! ConfigError                 configuration document unusable
//! CacheError                  cache document unreadable or unwritable
//! ```

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::resources::DotKind;

/// Errors that abort processing of a single dot.
///
/// Every variant maps to one short error-kind tag ([`DotError::kind`]) and a
/// handful of free-text detail lines ([`DotError::details`]) that are handed
/// to the error-reporting interface.
#[derive(Error, Debug)]
pub enum DotError {
    /// A required field was absent from the declared entry.
    #[error("{} is missing required field '{field}'", describe_name(.name.as_deref()))]
    MissingRequiredField {
        /// Name of the missing field.
        field: &'static str,
        /// Name of the dot, when it was known at the time of failure.
        name: Option<String>,
    },

    /// A recognised field had the wrong type.
    #[error("dot '{name}': field '{field}' must be {expected}")]
    InvalidField {
        /// Name of the dot.
        name: String,
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable description of the expected type.
        expected: &'static str,
    },

    /// The declared source does not exist.
    #[error("dot '{name}': source {} does not exist", .path.display())]
    SourceNotFound {
        /// Name of the dot.
        name: String,
        /// Path of the missing source.
        path: PathBuf,
    },

    /// The declared source exists but has the wrong file type.
    #[error("dot '{name}': source {} is a {actual}, expected a {expected}", .path.display())]
    SourceWrongType {
        /// Name of the dot.
        name: String,
        /// Path of the source.
        path: PathBuf,
        /// Kind declared in the configuration.
        expected: DotKind,
        /// Kind found on disk.
        actual: DotKind,
    },

    /// The directory that should hold the link does not exist.
    #[error("dot '{name}': target directory {} does not exist", .path.display())]
    MissingDirectory {
        /// Name of the dot.
        name: String,
        /// The missing directory.
        path: PathBuf,
    },

    /// Something not managed by this engine already occupies the target path.
    #[error("dot '{name}': target {} already exists", .path.display())]
    TargetExists {
        /// Name of the dot.
        name: String,
        /// The occupied target path.
        path: PathBuf,
    },

    /// The cached target is no longer a symbolic link.
    #[error("dot '{name}': {} is not a symbolic link", .path.display())]
    UnexpectedFileState {
        /// Name of the dot.
        name: String,
        /// The cached target path.
        path: PathBuf,
    },

    /// The cached link no longer resolves to its source.
    #[error("dot '{name}': link {} no longer points at {}", .target.display(), .source_path.display())]
    MissingLink {
        /// Name of the dot.
        name: String,
        /// The cached target path.
        target: PathBuf,
        /// The cached source path.
        source_path: PathBuf,
    },

    /// A backup could not be restored.
    #[error("dot '{name}': cannot restore backup: {reason}")]
    Backup {
        /// Name of the dot.
        name: String,
        /// Why the restore was refused.
        reason: String,
    },

    /// An underlying operating-system call failed.
    #[error("filesystem error at {}: {source}", .path.display())]
    Filesystem {
        /// The path the failing call operated on.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The cache could not be persisted after a mutation.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

fn describe_name(name: Option<&str>) -> String {
    name.map_or_else(|| "dot entry".to_string(), |n| format!("dot '{n}'"))
}

impl DotError {
    /// Short error-kind tag handed to the reporting interface.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingRequiredField { .. } | Self::InvalidField { .. } => "ValidationError",
            Self::SourceNotFound { .. } | Self::SourceWrongType { .. } => "SourceError",
            Self::MissingDirectory { .. } => "MissingDirectoryError",
            Self::TargetExists { .. } => "TargetExistsError",
            Self::UnexpectedFileState { .. } => "UnexpectedFileStateError",
            Self::MissingLink { .. } => "MissingLinkError",
            Self::Backup { .. } => "BackupError",
            Self::Filesystem { .. } => "FilesystemError",
            Self::Cache(_) => "CacheError",
        }
    }

    /// Detail lines for the reporting interface: what failed, then how to
    /// fix it.
    #[must_use]
    pub fn details(&self) -> Vec<String> {
        let mut lines = vec![self.to_string()];
        match self {
            Self::MissingRequiredField { field, .. } => {
                lines.push(format!("Add '{field}' to the entry in your config file."));
            }
            Self::InvalidField { .. } => {
                lines.push("Please check your config file for accuracy.".to_string());
            }
            Self::SourceNotFound { .. } | Self::SourceWrongType { .. } => {
                lines.push(
                    "Verify the source in the repository and the `is_directory` setting."
                        .to_string(),
                );
            }
            Self::MissingDirectory { .. } => {
                lines.push(
                    "If you want the directories created for you, set `create_dirs = true`."
                        .to_string(),
                );
            }
            Self::TargetExists { .. } => {
                lines.push(
                    "If you want this file backed up and replaced, set `replace = true`."
                        .to_string(),
                );
            }
            Self::UnexpectedFileState { .. } | Self::MissingLink { .. } => {
                lines.push(
                    "The file was most likely changed outside of moar-dots. Please check it."
                        .to_string(),
                );
                lines.push("Run `moar-dots refresh-cache` to resync the cache.".to_string());
            }
            Self::Backup { .. } | Self::Filesystem { .. } | Self::Cache(_) => {}
        }
        lines
    }
}

/// Build a [`DotError::Filesystem`] for `path`.
pub(crate) fn fs_err(path: &Path, source: io::Error) -> DotError {
    DotError::Filesystem {
        path: path.to_path_buf(),
        source,
    }
}

/// Errors that arise from loading the configuration document.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("IO error reading config file {}: {source}", .path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The configuration file is not valid TOML or has the wrong shape.
    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        /// Path to the file.
        path: PathBuf,
        /// Underlying parse error.
        source: toml::de::Error,
    },

    /// An entry under `[dots]` is not a table.
    #[error("invalid config file {}: entry '{key}' must be a table", .path.display())]
    NotATable {
        /// Path to the file.
        path: PathBuf,
        /// Key of the offending entry.
        key: String,
    },

    /// Two entries declare the same dot name.
    #[error("invalid config file {}: dot name '{name}' is declared more than once", .path.display())]
    DuplicateName {
        /// Path to the file.
        path: PathBuf,
        /// The repeated name.
        name: String,
    },
}

/// Errors that arise from reading or persisting the cache document.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The cache file could not be read or written.
    #[error("IO error on cache file {}: {source}", .path.display())]
    Io {
        /// Path to the cache file (or its temporary sibling).
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The cache file is not a valid cache document.
    #[error("corrupt cache file {}: {source}", .path.display())]
    Parse {
        /// Path to the cache file.
        path: PathBuf,
        /// Underlying parse error.
        source: toml::de::Error,
    },

    /// The in-memory cache could not be serialised.
    #[error("cannot serialise cache: {0}")]
    Serialize(#[from] toml::ser::Error),
}
