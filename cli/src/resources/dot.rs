//! The validated dot descriptor.
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// What a dot's source is on disk.
///
/// Persisted as the `type` of a cache record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DotKind {
    /// A regular file; content equality is byte-for-byte.
    File,
    /// A directory; content equality is identity of the resolved directory.
    Directory,
}

impl DotKind {
    /// Map the `is_directory` flag onto a kind.
    #[must_use]
    pub const fn from_is_directory(is_directory: bool) -> Self {
        if is_directory {
            Self::Directory
        } else {
            Self::File
        }
    }

    /// Whether this kind is [`DotKind::Directory`].
    #[must_use]
    pub const fn is_directory(self) -> bool {
        matches!(self, Self::Directory)
    }
}

impl fmt::Display for DotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Directory => f.write_str("directory"),
        }
    }
}

/// One declared dot after validation.
///
/// Built once per entry by [`validate`](crate::config::validation::validate)
/// and never modified afterwards. Paths are already expanded: `source` is
/// absolute (joined onto the repository root) and a leading `~` has been
/// replaced in both `source` and `target_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotDescriptor {
    /// Unique identifier; the cache key.
    pub name: String,
    /// The real file or directory the link points at.
    pub source: PathBuf,
    /// Directory that receives the link (or the full link path, see
    /// [`resolve`](super::target::resolve)).
    pub target_dir: PathBuf,
    /// Override for the link's basename.
    pub filename: Option<String>,
    /// Whether the source is a directory.
    pub is_directory: bool,
    /// Prefix the link name with `.` when no `filename` is given.
    pub dotted: bool,
    /// Allow creating a missing target directory.
    pub create_dirs: bool,
    /// Allow backing up and replacing an unmanaged file at the target.
    pub replace: bool,
    /// Include this dot when installing everything.
    pub install: bool,
    /// Free text, carried into the cache but not used by any logic.
    pub description: Option<String>,
}

impl DotDescriptor {
    /// The dot's kind, derived from `is_directory`.
    #[must_use]
    pub const fn kind(&self) -> DotKind {
        DotKind::from_is_directory(self.is_directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_is_directory() {
        assert_eq!(DotKind::from_is_directory(true), DotKind::Directory);
        assert_eq!(DotKind::from_is_directory(false), DotKind::File);
        assert!(DotKind::Directory.is_directory());
        assert!(!DotKind::File.is_directory());
    }

    #[test]
    fn kind_display_is_lowercase() {
        assert_eq!(DotKind::File.to_string(), "file");
        assert_eq!(DotKind::Directory.to_string(), "directory");
    }
}
