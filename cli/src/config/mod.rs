//! Configuration document loading.
//!
//! The document is TOML: an optional `root` plus one table per dot under
//! `[dots]`, in declaration order.
//!
//! ```toml
//! root = "~/dotfiles"
//!
//! [dots.bashrc]
//! source = "bash/bashrc"
//! target_dir = "~"
//! dotted = true
//! ```
pub mod toml_loader;
pub mod validation;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use toml_loader::LoadError;

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "MOAR_DOTS_CONFIG";

/// One declared entry, exactly as written (plus the injected `name`).
#[derive(Debug, Clone)]
pub struct RawDot {
    /// The table key under `[dots]`.
    pub key: String,
    /// The entry's fields.
    pub fields: toml::Table,
}

/// A loaded configuration document.
#[derive(Debug, Clone)]
pub struct Config {
    /// Where the document was read from.
    pub path: PathBuf,
    /// Base directory for relative `source` paths.
    pub root: PathBuf,
    /// Declared entries in document order.
    pub entries: Vec<RawDot>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    root: Option<String>,
    #[serde(default)]
    dots: toml::Table,
}

impl Config {
    /// Load the configuration document at `path`.
    ///
    /// A missing file yields an empty configuration. Each entry's table key
    /// becomes its `name` unless the entry sets one explicitly. `root`
    /// defaults to the directory holding the document.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, an entry is not
    /// a table, or two entries share a name.
    pub fn load(path: &Path, home: Option<&Path>) -> Result<Self, ConfigError> {
        let doc: ConfigDocument = toml_loader::load_document(path).map_err(|e| match e {
            LoadError::Io(source) => ConfigError::Io {
                path: path.to_path_buf(),
                source,
            },
            LoadError::Parse(source) => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let config_dir = absolute(path.parent().unwrap_or_else(|| Path::new(".")));
        let root = doc.root.as_deref().map_or_else(
            || config_dir.clone(),
            |raw| config_dir.join(validation::expand_home(raw, home)),
        );

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(doc.dots.len());
        for (key, value) in doc.dots {
            let toml::Value::Table(mut fields) = value else {
                return Err(ConfigError::NotATable {
                    path: path.to_path_buf(),
                    key,
                });
            };
            if !fields.contains_key("name") {
                fields.insert("name".to_string(), toml::Value::String(key.clone()));
            }
            if let Some(toml::Value::String(name)) = fields.get("name")
                && !seen.insert(name.clone())
            {
                return Err(ConfigError::DuplicateName {
                    path: path.to_path_buf(),
                    name: name.clone(),
                });
            }
            entries.push(RawDot { key, fields });
        }

        Ok(Self {
            path: path.to_path_buf(),
            root,
            entries,
        })
    }

    /// Context for validating this document's entries.
    #[must_use]
    pub fn path_context(&self, home: Option<&Path>) -> validation::PathContext {
        validation::PathContext {
            root: self.root.clone(),
            home: home.map(Path::to_path_buf),
        }
    }
}

/// Default configuration file: `$XDG_CONFIG_HOME/moar-dots/config.toml`,
/// falling back to `~/.config/moar-dots/config.toml`.
#[must_use]
pub fn default_config_file(home: Option<&Path>) -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| home.map(|h| h.join(".config")))?;
    Some(base.join("moar-dots").join("config.toml"))
}

/// The user's home directory from `HOME` (or `USERPROFILE` on Windows).
#[must_use]
pub fn home_dir() -> Option<PathBuf> {
    let var = if cfg!(target_os = "windows") {
        std::env::var_os("USERPROFILE").or_else(|| std::env::var_os("HOME"))
    } else {
        std::env::var_os("HOME")
    };
    var.filter(|v| !v.is_empty()).map(PathBuf::from)
}

fn absolute(path: &Path) -> PathBuf {
    if path.as_os_str().is_empty() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
