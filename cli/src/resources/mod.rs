//! Filesystem-facing primitives: the dot descriptor, target resolution,
//! probing, and symlink creation/removal.
pub mod dot;
pub mod fs;
pub mod symlink;
pub mod target;

pub use dot::{DotDescriptor, DotKind};
pub use fs::{FileSystemOps, SystemFileSystemOps};
pub use target::{BACKUP_SUFFIX, ResolvedTarget};

use std::fmt;
use std::path::PathBuf;

/// Reconciliation state of one dot name.
///
/// # Examples
///
/// ```
/// use moar_dots::resources::DotState;
///
/// let drifted = DotState::Drifted { reason: "target is missing".into() };
/// assert_eq!(drifted.to_string(), "drifted (target is missing)");
/// assert_ne!(DotState::Installed, DotState::Removed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DotState {
    /// Never installed by this engine.
    Unmanaged,
    /// Cache and filesystem agree that the link is in place.
    Installed,
    /// The cache claims the dot is installed but the filesystem disagrees.
    Drifted {
        /// What the probe found instead.
        reason: String,
    },
    /// Previously installed and since removed.
    Removed,
}

impl fmt::Display for DotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unmanaged => f.write_str("unmanaged"),
            Self::Installed => f.write_str("installed"),
            Self::Drifted { reason } => write!(f, "drifted ({reason})"),
            Self::Removed => f.write_str("removed"),
        }
    }
}

/// Result of a successful engine operation on one dot.
///
/// # Examples
///
/// ```
/// use moar_dots::resources::DotChange;
///
/// assert!(DotChange::Removed.is_mutation());
/// assert!(!DotChange::Unchanged.is_mutation());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DotChange {
    /// A link was created; `backup` is set when a displaced file was preserved.
    Installed {
        /// Where the displaced file now lives, if one was displaced.
        backup: Option<PathBuf>,
    },
    /// A correct link was already on disk without a matching cache record;
    /// only the record was written.
    Adopted,
    /// Nothing needed to change.
    Unchanged,
    /// The link was removed.
    Removed,
    /// A backup was moved back into place.
    Restored,
}

impl DotChange {
    /// Whether this change touched the filesystem.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        matches!(self, Self::Installed { .. } | Self::Removed | Self::Restored)
    }
}
