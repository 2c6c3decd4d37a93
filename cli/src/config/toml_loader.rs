//! TOML document loading shared by the config and cache stores.
use std::path::Path;

use serde::de::DeserializeOwned;

/// Failure modes of [`load_document`], kept apart so each caller can wrap
/// them in its own error type.
#[derive(Debug)]
pub enum LoadError {
    /// The file exists but could not be read.
    Io(std::io::Error),
    /// The file is not valid TOML for `T`.
    Parse(toml::de::Error),
}

/// Load and deserialize a TOML document.
///
/// A missing file deserializes from the empty document, so `T` decides what
/// "nothing declared yet" looks like (typically via `#[serde(default)]`).
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file exists but cannot be read, and
/// [`LoadError::Parse`] if its contents do not deserialize into `T`.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(LoadError::Io(e)),
    };
    toml::from_str(&content).map_err(LoadError::Parse)
}
