//! Reconciliation engine.
//!
//! Owns no state of its own: it borrows the [`CacheStore`], a
//! [`FileSystemOps`] implementation and a [`Log`], and drives one dot at a
//! time from its current state towards the requested one. Every operation
//! either completes (filesystem mutation, then cache write and flush) or
//! returns a [`DotError`] before touching the cache for that dot.
//!
//! ```text
//! Unmanaged ──install──▶ Installed ──nuke──▶ Removed ──install──▶ Installed
//!                          │    ▲
//!                    probe │    │ install (repair)
//!                          ▼    │
//!                         Drifted
//! ```
mod install;
mod nuke;
mod restore;
mod status;

pub use install::CacheCheck;
pub use status::RefreshSummary;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::cache::CacheStore;
use crate::error::DotError;
use crate::logging::Log;
use crate::resources::{DotKind, FileSystemOps};

static STOP_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Ask any running batch to stop after the dot it is currently processing.
pub fn request_stop() {
    STOP_REQUESTED.store(true, Ordering::SeqCst);
}

/// Whether [`request_stop`] has been called.
#[must_use]
pub fn stop_requested() -> bool {
    STOP_REQUESTED.load(Ordering::SeqCst)
}

/// The reconciliation engine for one run.
pub struct Engine<'a> {
    cache: &'a mut CacheStore,
    fs: &'a dyn FileSystemOps,
    log: &'a dyn Log,
}

impl std::fmt::Debug for Engine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("cache", &self.cache.path())
            .field("fs", &self.fs)
            .finish_non_exhaustive()
    }
}

impl<'a> Engine<'a> {
    /// Create an engine over the given collaborators.
    pub fn new(cache: &'a mut CacheStore, fs: &'a dyn FileSystemOps, log: &'a dyn Log) -> Self {
        Self { cache, fs, log }
    }

    /// Read-only view of the cache.
    #[must_use]
    pub fn cache(&self) -> &CacheStore {
        self.cache
    }

    /// Why the link at `target` is not a correct link to `source`, or
    /// `None` when it is.
    fn probe_link(
        &self,
        source: &Path,
        target: &Path,
        kind: DotKind,
    ) -> Result<Option<String>, DotError> {
        if !self.fs.exists(target)? {
            return Ok(Some("target is missing".to_string()));
        }
        if !self.fs.is_symlink(target)? {
            return Ok(Some("target is not a symbolic link".to_string()));
        }
        if !self.fs.same_content(source, target, kind)? {
            return Ok(Some("link does not match source".to_string()));
        }
        Ok(None)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
pub(crate) mod fixture {
    use std::io;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::Engine;
    use crate::cache::CacheStore;
    use crate::error::{DotError, fs_err};
    use crate::logging::RecordingLog;
    use crate::resources::{DotDescriptor, DotKind, FileSystemOps, SystemFileSystemOps};

    /// [`SystemFileSystemOps`] that counts every mutating call.
    #[derive(Debug, Default)]
    pub struct CountingFs {
        inner: SystemFileSystemOps,
        mutations: AtomicUsize,
    }

    impl CountingFs {
        pub fn mutations(&self) -> usize {
            self.mutations.load(Ordering::SeqCst)
        }

        fn bump(&self) {
            self.mutations.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl FileSystemOps for CountingFs {
        fn exists(&self, path: &Path) -> Result<bool, DotError> {
            self.inner.exists(path)
        }
        fn is_dir(&self, path: &Path) -> Result<bool, DotError> {
            self.inner.is_dir(path)
        }
        fn resolves(&self, path: &Path) -> Result<bool, DotError> {
            self.inner.resolves(path)
        }
        fn is_symlink(&self, path: &Path) -> Result<bool, DotError> {
            self.inner.is_symlink(path)
        }
        fn read_link(&self, path: &Path) -> Result<Option<PathBuf>, DotError> {
            self.inner.read_link(path)
        }
        fn same_content(&self, a: &Path, b: &Path, kind: DotKind) -> Result<bool, DotError> {
            self.inner.same_content(a, b, kind)
        }
        fn create_dir_all(&self, path: &Path) -> Result<(), DotError> {
            self.bump();
            self.inner.create_dir_all(path)
        }
        fn rename(&self, from: &Path, to: &Path) -> Result<(), DotError> {
            self.bump();
            self.inner.rename(from, to)
        }
        fn symlink(&self, source: &Path, link: &Path, kind: DotKind) -> Result<(), DotError> {
            self.bump();
            self.inner.symlink(source, link, kind)
        }
        fn unlink(&self, link: &Path) -> Result<(), DotError> {
            self.bump();
            self.inner.unlink(link)
        }
    }

    /// [`SystemFileSystemOps`] whose `symlink` always fails with
    /// `PermissionDenied`.
    #[derive(Debug, Default)]
    pub struct FailingSymlinkFs {
        inner: SystemFileSystemOps,
    }

    impl FileSystemOps for FailingSymlinkFs {
        fn exists(&self, path: &Path) -> Result<bool, DotError> {
            self.inner.exists(path)
        }
        fn is_dir(&self, path: &Path) -> Result<bool, DotError> {
            self.inner.is_dir(path)
        }
        fn resolves(&self, path: &Path) -> Result<bool, DotError> {
            self.inner.resolves(path)
        }
        fn is_symlink(&self, path: &Path) -> Result<bool, DotError> {
            self.inner.is_symlink(path)
        }
        fn read_link(&self, path: &Path) -> Result<Option<PathBuf>, DotError> {
            self.inner.read_link(path)
        }
        fn same_content(&self, a: &Path, b: &Path, kind: DotKind) -> Result<bool, DotError> {
            self.inner.same_content(a, b, kind)
        }
        fn create_dir_all(&self, path: &Path) -> Result<(), DotError> {
            self.inner.create_dir_all(path)
        }
        fn rename(&self, from: &Path, to: &Path) -> Result<(), DotError> {
            self.inner.rename(from, to)
        }
        fn symlink(&self, _source: &Path, link: &Path, _kind: DotKind) -> Result<(), DotError> {
            Err(fs_err(
                link,
                io::Error::new(io::ErrorKind::PermissionDenied, "symlink refused"),
            ))
        }
        fn unlink(&self, link: &Path) -> Result<(), DotError> {
            self.inner.unlink(link)
        }
    }

    /// Temporary repo + home with an empty cache.
    pub struct Fixture {
        pub dir: tempfile::TempDir,
        pub repo: PathBuf,
        pub home: PathBuf,
        pub cache: CacheStore,
        pub fs: CountingFs,
        pub log: RecordingLog,
    }

    impl Fixture {
        pub fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let repo = dir.path().join("repo");
            let home = dir.path().join("home");
            std::fs::create_dir_all(&repo).unwrap();
            std::fs::create_dir_all(&home).unwrap();
            let cache = CacheStore::empty(&dir.path().join("cache").join("cache.toml"));
            Self {
                dir,
                repo,
                home,
                cache,
                fs: CountingFs::default(),
                log: RecordingLog::default(),
            }
        }

        pub fn engine(&mut self) -> Engine<'_> {
            Engine::new(&mut self.cache, &self.fs, &self.log)
        }

        pub fn source_file(&self, rel: &str, content: &str) -> PathBuf {
            let path = self.repo.join(rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&path, content).unwrap();
            path
        }

        pub fn source_dir(&self, rel: &str) -> PathBuf {
            let path = self.repo.join(rel);
            std::fs::create_dir_all(&path).unwrap();
            path
        }

        /// A file dot linking `source` into the fixture home.
        pub fn dot(&self, name: &str, source: &Path) -> DotDescriptor {
            DotDescriptor {
                name: name.to_string(),
                source: source.to_path_buf(),
                target_dir: self.home.clone(),
                filename: None,
                is_directory: false,
                dotted: false,
                create_dirs: false,
                replace: false,
                install: true,
                description: None,
            }
        }
    }
}
