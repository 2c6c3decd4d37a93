//! Persistent record of what the engine has installed.
//!
//! The cache is a TOML document mapping each dot name to its last-known
//! [`CacheRecord`]. It is read once per run and rewritten whole after every
//! mutation, so an interrupted run loses at most the entry it was working on.
//!
//! ```toml
//! [bashrc]
//! source = "/home/u/dotfiles/bash/bashrc"
//! target = "/home/u/.bashrc"
//! type = "file"
//! is_directory = false
//! status = "installed"
//! backup = "/home/u/.bashrc.moar-dots.bak"
//! ```
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::toml_loader::{self, LoadError};
use crate::error::CacheError;
use crate::resources::{DotDescriptor, DotKind};

/// Environment variable overriding the cache file location.
pub const CACHE_ENV: &str = "MOAR_DOTS_CACHE";

/// Whether a dot's link is currently in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The link was created and has not been removed since.
    Installed,
    /// The link was removed.
    Removed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Installed => f.write_str("installed"),
            Self::Removed => f.write_str("removed"),
        }
    }
}

/// Last-known installation state of one dot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Source the link points at.
    pub source: PathBuf,
    /// Path of the link.
    pub target: PathBuf,
    /// Kind of the source.
    #[serde(rename = "type")]
    pub kind: DotKind,
    /// Declared `is_directory` at install time.
    pub is_directory: bool,
    /// Current status.
    pub status: Status,
    /// Declared description at install time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Where a displaced file was moved to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup: Option<PathBuf>,
}

impl CacheRecord {
    /// A fresh `installed` record for `dot` linked at `target`.
    #[must_use]
    pub fn installed(dot: &DotDescriptor, target: &Path, backup: Option<PathBuf>) -> Self {
        Self {
            source: dot.source.clone(),
            target: target.to_path_buf(),
            kind: dot.kind(),
            is_directory: dot.is_directory,
            status: Status::Installed,
            description: dot.description.clone(),
            backup,
        }
    }

    /// The first cached field (other than `source` and `target`) that no
    /// longer matches `dot`, if any.
    #[must_use]
    pub fn mismatch(&self, dot: &DotDescriptor) -> Option<&'static str> {
        if self.kind != dot.kind() {
            Some("type")
        } else if self.is_directory != dot.is_directory {
            Some("is_directory")
        } else if self.description != dot.description {
            Some("description")
        } else {
            None
        }
    }
}

/// In-memory cache with an explicit load / flush lifecycle.
#[derive(Debug)]
pub struct CacheStore {
    path: PathBuf,
    records: BTreeMap<String, CacheRecord>,
}

impl CacheStore {
    /// Load the cache document at `path`; a missing file is an empty cache.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the file cannot be read or is not a valid
    /// cache document. A corrupt cache is never silently discarded.
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let records = toml_loader::load_document(path).map_err(|e| match e {
            LoadError::Io(source) => CacheError::Io {
                path: path.to_path_buf(),
                source,
            },
            LoadError::Parse(source) => CacheError::Parse {
                path: path.to_path_buf(),
                source,
            },
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            records,
        })
    }

    /// An empty cache that will be written to `path`.
    #[must_use]
    pub fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            records: BTreeMap::new(),
        }
    }

    /// Where this cache is persisted.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The record for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CacheRecord> {
        self.records.get(name)
    }

    /// Insert or overwrite the record for `name`.
    pub fn put(&mut self, name: &str, record: CacheRecord) {
        self.records.insert(name.to_string(), record);
    }

    /// Drop the record for `name`, returning it.
    pub fn remove(&mut self, name: &str) -> Option<CacheRecord> {
        self.records.remove(name)
    }

    /// Cached dot names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// All records in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CacheRecord)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the cache holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write the whole document to a sibling temp file, then rename it over
    /// the cache file.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if serialisation or any write fails.
    pub fn flush(&self) -> Result<(), CacheError> {
        let content = toml::to_string(&self.records)?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(io_err(parent))?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, content).map_err(io_err(&tmp))?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(&self.path)(e));
        }
        Ok(())
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> CacheError {
    let path = path.to_path_buf();
    move |source| CacheError::Io { path, source }
}

/// Default cache file: `$XDG_CACHE_HOME/moar-dots/cache.toml`, falling back
/// to `~/.cache/moar-dots/cache.toml`.
#[must_use]
pub fn default_cache_file(home: Option<&Path>) -> Option<PathBuf> {
    cache_dir(home).map(|d| d.join("cache.toml"))
}

/// The moar-dots cache directory, which also holds the log files.
#[must_use]
pub fn cache_dir(home: Option<&Path>) -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CACHE_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| home.map(|h| h.join(".cache")))?;
    Some(base.join("moar-dots"))
}
