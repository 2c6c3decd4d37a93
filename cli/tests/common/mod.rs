// Shared helpers for integration tests.
//
// Provides a temporary home directory and dotfiles repository, a fluent
// builder for the configuration document, and in-memory implementations of
// the logging and filesystem seams so each test can observe exactly what the
// engine did.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use moar_dots::cache::CacheStore;
use moar_dots::commands::CommandSetup;
use moar_dots::error::DotError;
use moar_dots::logging::{DotStatus, Log};
use moar_dots::resources::{DotKind, FileSystemOps, SystemFileSystemOps};

/// An isolated home directory and repository backed by a
/// [`tempfile::TempDir`].
pub struct TestContext {
    /// Owns every path below; deleted on drop.
    pub dir: tempfile::TempDir,
    /// Stand-in for `$HOME`.
    pub home: PathBuf,
    /// The dotfiles repository; holds the config document.
    pub repo: PathBuf,
    /// Location of the config document.
    pub config_path: PathBuf,
    /// Location of the cache document.
    pub cache_path: PathBuf,
}

impl TestContext {
    /// Load the config and cache the way a command would.
    pub fn setup(&self) -> CommandSetup {
        CommandSetup::load(
            &self.config_path,
            &self.cache_path,
            Some(&self.home),
            &MemoryLog::default(),
        )
        .expect("load config and cache")
    }

    /// Read the cache document back from disk.
    pub fn cache(&self) -> CacheStore {
        CacheStore::load(&self.cache_path).expect("load cache")
    }

    /// Path below the home directory.
    pub fn home_path(&self, rel: &str) -> PathBuf {
        self.home.join(rel)
    }

    /// Path below the repository.
    pub fn repo_path(&self, rel: &str) -> PathBuf {
        self.repo.join(rel)
    }

    /// Replace the config document.
    pub fn rewrite_config(&self, content: &str) {
        std::fs::write(&self.config_path, content).expect("write config");
    }
}

/// Fluent builder for [`TestContext`].
#[derive(Default)]
pub struct TestContextBuilder {
    files: Vec<(String, String)>,
    dirs: Vec<String>,
    home_files: Vec<(String, String)>,
    config: String,
}

impl TestContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source file to the repository.
    pub fn source(mut self, rel: &str, content: &str) -> Self {
        self.files.push((rel.to_string(), content.to_string()));
        self
    }

    /// Add a source directory to the repository.
    pub fn source_dir(mut self, rel: &str) -> Self {
        self.dirs.push(rel.to_string());
        self
    }

    /// Put a pre-existing file in the home directory.
    pub fn home_file(mut self, rel: &str, content: &str) -> Self {
        self.home_files.push((rel.to_string(), content.to_string()));
        self
    }

    /// Declare a dot; `body` is the entry's TOML fields.
    pub fn dot(mut self, name: &str, body: &str) -> Self {
        let _ = writeln!(self.config, "[dots.{name}]\n{body}\n");
        self
    }

    pub fn build(self) -> TestContext {
        let dir = tempfile::tempdir().expect("create temp dir");
        let home = dir.path().join("home");
        let repo = dir.path().join("repo");
        std::fs::create_dir_all(&home).expect("create home");
        std::fs::create_dir_all(&repo).expect("create repo");

        for (rel, content) in &self.files {
            write_file(&repo.join(rel), content);
        }
        for rel in &self.dirs {
            std::fs::create_dir_all(repo.join(rel)).expect("create source dir");
        }
        for (rel, content) in &self.home_files {
            write_file(&home.join(rel), content);
        }

        let config_path = repo.join("moar-dots.toml");
        std::fs::write(&config_path, &self.config).expect("write config");
        let cache_path = dir.path().join("cache").join("cache.toml");

        TestContext {
            dir,
            home,
            repo,
            config_path,
            cache_path,
        }
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, content).expect("write file");
}

/// A [`Log`] that keeps every message and dot outcome in memory.
#[derive(Debug, Default)]
pub struct MemoryLog {
    messages: Mutex<Vec<(&'static str, String)>>,
    dots: Mutex<Vec<(String, DotStatus)>>,
}

impl MemoryLog {
    fn push(&self, level: &'static str, msg: &str) {
        self.messages
            .lock()
            .expect("lock")
            .push((level, msg.to_string()));
    }

    /// Whether any message at `level` contains `needle`.
    pub fn contains(&self, level: &str, needle: &str) -> bool {
        self.messages
            .lock()
            .expect("lock")
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }

    /// Every recorded outcome in order.
    pub fn outcomes(&self) -> Vec<(String, DotStatus)> {
        self.dots.lock().expect("lock").clone()
    }

    /// The outcome recorded for `name`.
    pub fn outcome(&self, name: &str) -> Option<DotStatus> {
        self.outcomes()
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }
}

impl Log for MemoryLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn record_dot(&self, name: &str, status: DotStatus, _message: Option<&str>) {
        self.dots
            .lock()
            .expect("lock")
            .push((name.to_string(), status));
    }
}

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
