//! Platform symlink primitives.
use std::io;
use std::path::Path;

use super::DotKind;

/// Create a symlink at `link` pointing to `source`.
///
/// On Windows the link flavour follows `kind`, since directory and file
/// symlinks are distinct object types there.
///
/// # Errors
///
/// Returns the underlying I/O error if the link cannot be created.
pub fn create_symlink(source: &Path, link: &Path, kind: DotKind) -> io::Result<()> {
    #[cfg(unix)]
    {
        let _ = kind;
        std::os::unix::fs::symlink(source, link)
    }

    #[cfg(windows)]
    {
        if kind.is_directory() {
            std::os::windows::fs::symlink_dir(source, link)
        } else {
            std::os::windows::fs::symlink_file(source, link)
        }
    }
}

/// Remove a symlink, handling platform differences.
///
/// On Windows, directory symlinks must be removed with `remove_dir` (not
/// `remove_file`). Rust's `symlink_metadata().is_dir()` returns `false` for
/// symlinks, so the raw `FILE_ATTRIBUTE_DIRECTORY` flag is checked instead.
///
/// # Errors
///
/// Returns the underlying I/O error if `path` cannot be inspected or removed.
pub fn remove_symlink(path: &Path) -> io::Result<()> {
    let meta = std::fs::symlink_metadata(path)?;
    if is_dir_like(&meta) {
        std::fs::remove_dir(path)
    } else {
        std::fs::remove_file(path)
    }
}

/// Check if metadata represents a directory-like entry.
fn is_dir_like(meta: &std::fs::Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        meta.file_attributes() & 0x10 != 0 // FILE_ATTRIBUTE_DIRECTORY
    }
    #[cfg(not(windows))]
    {
        meta.is_dir()
    }
}
