//! Filesystem boundary for the engine.
//!
//! Provides the [`FileSystemOps`] trait so the engine can be exercised with an
//! injected implementation, such as one that counts mutations or one that
//! fails a chosen call.
//! Production code uses [`SystemFileSystemOps`].
//!
//! Only `NotFound` is ever read as "absent"; every other OS error surfaces as
//! [`DotError::Filesystem`] carrying the offending path.
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use super::DotKind;
use crate::error::{DotError, fs_err};

/// Size of the read buffers used for content comparison.
const COMPARE_CHUNK: usize = 8 * 1024;

/// Queries and mutations the engine performs on the filesystem.
pub trait FileSystemOps: Send + Sync + std::fmt::Debug {
    /// Whether anything (including a dangling symlink) exists at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::Filesystem`] for any failure other than `NotFound`.
    fn exists(&self, path: &Path) -> Result<bool, DotError>;

    /// Whether `path` resolves (following symlinks) to a directory.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::Filesystem`] for any failure other than `NotFound`.
    fn is_dir(&self, path: &Path) -> Result<bool, DotError>;

    /// Whether `path` resolves, following symlinks, to something that
    /// exists. A dangling symlink does not resolve.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::Filesystem`] for any failure other than `NotFound`.
    fn resolves(&self, path: &Path) -> Result<bool, DotError>;

    /// Whether `path` itself is a symbolic link.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::Filesystem`] for any failure other than `NotFound`.
    fn is_symlink(&self, path: &Path) -> Result<bool, DotError>;

    /// The stored destination of the symbolic link at `path`, or `None` when
    /// `path` is missing or not a link.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::Filesystem`] for any failure other than `NotFound`.
    fn read_link(&self, path: &Path) -> Result<Option<PathBuf>, DotError>;

    /// Whether `a` and `b` refer to identical content.
    ///
    /// Identical resolved paths are always equal. Otherwise files compare
    /// byte-for-byte and directories are never equal. A side that does not
    /// resolve (missing, dangling link) is never equal to anything.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::Filesystem`] if either side cannot be read.
    fn same_content(&self, a: &Path, b: &Path, kind: DotKind) -> Result<bool, DotError>;

    /// Create `path` and all missing ancestors.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::Filesystem`] if any directory cannot be created.
    fn create_dir_all(&self, path: &Path) -> Result<(), DotError>;

    /// Move `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::Filesystem`] if the rename fails.
    fn rename(&self, from: &Path, to: &Path) -> Result<(), DotError>;

    /// Create a symbolic link at `link` pointing to `source`.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::Filesystem`] if the link cannot be created.
    fn symlink(&self, source: &Path, link: &Path, kind: DotKind) -> Result<(), DotError>;

    /// Remove the symbolic link at `link`.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::Filesystem`] if the link cannot be removed.
    fn unlink(&self, link: &Path) -> Result<(), DotError>;
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn exists(&self, path: &Path) -> Result<bool, DotError> {
        absent_on_not_found(path, std::fs::symlink_metadata(path).map(|_| true))
    }

    fn is_dir(&self, path: &Path) -> Result<bool, DotError> {
        absent_on_not_found(path, std::fs::metadata(path).map(|m| m.is_dir()))
    }

    fn resolves(&self, path: &Path) -> Result<bool, DotError> {
        absent_on_not_found(path, std::fs::metadata(path).map(|_| true))
    }

    fn is_symlink(&self, path: &Path) -> Result<bool, DotError> {
        absent_on_not_found(
            path,
            std::fs::symlink_metadata(path).map(|m| m.file_type().is_symlink()),
        )
    }

    fn read_link(&self, path: &Path) -> Result<Option<PathBuf>, DotError> {
        if !self.is_symlink(path)? {
            return Ok(None);
        }
        match std::fs::read_link(path) {
            Ok(dest) => Ok(Some(dest)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(fs_err(path, e)),
        }
    }

    fn same_content(&self, a: &Path, b: &Path, kind: DotKind) -> Result<bool, DotError> {
        let (Some(real_a), Some(real_b)) = (canonical(a)?, canonical(b)?) else {
            return Ok(false);
        };
        if real_a == real_b {
            return Ok(true);
        }
        match kind {
            DotKind::Directory => Ok(false),
            DotKind::File => files_equal(&real_a, &real_b),
        }
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), DotError> {
        std::fs::create_dir_all(path).map_err(|e| fs_err(path, e))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), DotError> {
        std::fs::rename(from, to).map_err(|e| fs_err(from, e))
    }

    fn symlink(&self, source: &Path, link: &Path, kind: DotKind) -> Result<(), DotError> {
        super::symlink::create_symlink(source, link, kind).map_err(|e| fs_err(link, e))
    }

    fn unlink(&self, link: &Path) -> Result<(), DotError> {
        super::symlink::remove_symlink(link).map_err(|e| fs_err(link, e))
    }
}

/// Map `NotFound` to `false` and every other error to [`DotError::Filesystem`].
fn absent_on_not_found(path: &Path, result: io::Result<bool>) -> Result<bool, DotError> {
    match result {
        Ok(found) => Ok(found),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(fs_err(path, e)),
    }
}

/// Fully resolve `path`, or `None` when it (or its link target) is missing.
fn canonical(path: &Path) -> Result<Option<PathBuf>, DotError> {
    match dunce::canonicalize(path) {
        Ok(real) => Ok(Some(real)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(fs_err(path, e)),
    }
}

/// Stream both files and compare them chunk by chunk.
fn files_equal(a: &Path, b: &Path) -> Result<bool, DotError> {
    let meta_a = std::fs::metadata(a).map_err(|e| fs_err(a, e))?;
    let meta_b = std::fs::metadata(b).map_err(|e| fs_err(b, e))?;
    if !meta_a.is_file() || !meta_b.is_file() || meta_a.len() != meta_b.len() {
        return Ok(false);
    }

    let mut reader_a = BufReader::new(File::open(a).map_err(|e| fs_err(a, e))?);
    let mut reader_b = BufReader::new(File::open(b).map_err(|e| fs_err(b, e))?);
    let mut buf_a = [0u8; COMPARE_CHUNK];
    let mut buf_b = [0u8; COMPARE_CHUNK];
    loop {
        let read_a = fill(&mut reader_a, &mut buf_a).map_err(|e| fs_err(a, e))?;
        let read_b = fill(&mut reader_b, &mut buf_b).map_err(|e| fs_err(b, e))?;
        if read_a != read_b || buf_a.get(..read_a) != buf_b.get(..read_b) {
            return Ok(false);
        }
        if read_a == 0 {
            return Ok(true);
        }
    }
}

/// Read until `buf` is full or the reader is exhausted.
fn fill(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while let Some(rest) = buf.get_mut(filled..) {
        if rest.is_empty() {
            break;
        }
        match reader.read(rest) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
