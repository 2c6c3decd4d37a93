//! Entry validation: one declared table in, one typed descriptor out.
//!
//! The validator is pure. Home-directory expansion and joining a relative
//! `source` or `target_dir` onto the repository root use the paths carried in
//! [`PathContext`]; nothing is looked up from the environment here.
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::DotError;
use crate::resources::DotDescriptor;

/// Fields every entry must declare, checked in this order.
const REQUIRED: [&str; 3] = ["name", "source", "target_dir"];

/// Fields that stay unset when absent.
const OPTIONAL: [&str; 3] = ["filename", "description", "is_directory"];

/// Fields filled with a default when absent.
const DEFAULTED: [(&str, bool); 4] = [
    ("dotted", false),
    ("create_dirs", false),
    ("replace", false),
    ("install", true),
];

/// Paths needed to turn declared strings into absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathContext {
    /// Base directory for relative `source` and `target_dir` paths.
    pub root: PathBuf,
    /// Expansion of a leading `~`; `None` leaves `~` untouched.
    pub home: Option<PathBuf>,
}

impl PathContext {
    /// Expand `~`, then anchor a still-relative path at `root`.
    fn absolute(&self, raw: &str) -> PathBuf {
        let path = expand_home(raw, self.home.as_deref());
        if path.is_absolute() {
            path
        } else {
            self.root.join(path)
        }
    }
}

/// Informational observation made while validating an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationNote {
    /// An optional field was absent and stays unset.
    Unset {
        /// The absent field.
        field: &'static str,
    },
    /// A default-bearing field was absent and received its default.
    Defaulted {
        /// The absent field.
        field: &'static str,
        /// The value it received.
        value: bool,
    },
    /// Keys the validator does not recognise; not fatal.
    UnexpectedFields(Vec<String>),
}

impl fmt::Display for ValidationNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset { field } => write!(f, "optional field '{field}' not set"),
            Self::Defaulted { field, value } => {
                write!(f, "'{field}' not set, defaulting to {value}")
            }
            Self::UnexpectedFields(keys) => {
                write!(f, "unexpected fields: {}", keys.join(", "))
            }
        }
    }
}

/// A descriptor plus everything noticed while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDot {
    /// The typed entry.
    pub descriptor: DotDescriptor,
    /// Notes in the order they were made.
    pub notes: Vec<ValidationNote>,
}

/// Validate one declared entry.
///
/// # Errors
///
/// Returns [`DotError::MissingRequiredField`] for the first absent required
/// field and [`DotError::InvalidField`] when a recognised field has the wrong
/// type.
pub fn validate(raw: &toml::Table, ctx: &PathContext) -> Result<ValidatedDot, DotError> {
    let mut notes = Vec::new();

    let name = match raw.get("name") {
        None => {
            return Err(DotError::MissingRequiredField {
                field: "name",
                name: None,
            });
        }
        Some(toml::Value::String(s)) => s.clone(),
        Some(_) => {
            return Err(DotError::InvalidField {
                name: "<unnamed>".to_string(),
                field: "name",
                expected: "a string",
            });
        }
    };

    let fields = Fields { raw, name: &name };
    let source = fields.required_str("source")?;
    let target_dir = fields.required_str("target_dir")?;

    let filename = fields.optional_str("filename", &mut notes)?;
    let description = fields.optional_str("description", &mut notes)?;
    let is_directory = fields.optional_bool("is_directory", &mut notes)?;

    let mut flags = [false; DEFAULTED.len()];
    for (slot, (field, default)) in flags.iter_mut().zip(DEFAULTED) {
        *slot = fields.defaulted_bool(field, default, &mut notes)?;
    }
    let [dotted, create_dirs, replace, install] = flags;

    let mut unexpected: Vec<String> = raw
        .keys()
        .filter(|k| {
            let k = k.as_str();
            !REQUIRED.contains(&k)
                && !OPTIONAL.contains(&k)
                && !DEFAULTED.iter().any(|(f, _)| *f == k)
        })
        .cloned()
        .collect();
    if !unexpected.is_empty() {
        unexpected.sort();
        notes.push(ValidationNote::UnexpectedFields(unexpected));
    }

    let source = ctx.absolute(&source);
    let target_dir = ctx.absolute(&target_dir);

    Ok(ValidatedDot {
        descriptor: DotDescriptor {
            name,
            source,
            target_dir,
            filename,
            is_directory: is_directory.unwrap_or(false),
            dotted,
            create_dirs,
            replace,
            install,
            description,
        },
        notes,
    })
}

/// Replace a leading `~` (alone or followed by a separator) with `home`.
#[must_use]
pub fn expand_home(raw: &str, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return PathBuf::from(raw);
    };
    if raw == "~" {
        return home.to_path_buf();
    }
    match raw.strip_prefix('~') {
        Some(rest) if rest.starts_with(std::path::is_separator) => {
            home.join(rest.trim_start_matches(std::path::is_separator))
        }
        _ => PathBuf::from(raw),
    }
}

struct Fields<'a> {
    raw: &'a toml::Table,
    name: &'a str,
}

impl Fields<'_> {
    fn invalid(&self, field: &'static str, expected: &'static str) -> DotError {
        DotError::InvalidField {
            name: self.name.to_string(),
            field,
            expected,
        }
    }

    fn required_str(&self, field: &'static str) -> Result<String, DotError> {
        match self.raw.get(field) {
            None => Err(DotError::MissingRequiredField {
                field,
                name: Some(self.name.to_string()),
            }),
            Some(toml::Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(self.invalid(field, "a string")),
        }
    }

    fn optional_str(
        &self,
        field: &'static str,
        notes: &mut Vec<ValidationNote>,
    ) -> Result<Option<String>, DotError> {
        match self.raw.get(field) {
            None => {
                notes.push(ValidationNote::Unset { field });
                Ok(None)
            }
            Some(toml::Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.invalid(field, "a string")),
        }
    }

    fn optional_bool(
        &self,
        field: &'static str,
        notes: &mut Vec<ValidationNote>,
    ) -> Result<Option<bool>, DotError> {
        match self.raw.get(field) {
            None => {
                notes.push(ValidationNote::Unset { field });
                Ok(None)
            }
            Some(toml::Value::Boolean(b)) => Ok(Some(*b)),
            Some(_) => Err(self.invalid(field, "a boolean")),
        }
    }

    fn defaulted_bool(
        &self,
        field: &'static str,
        default: bool,
        notes: &mut Vec<ValidationNote>,
    ) -> Result<bool, DotError> {
        match self.raw.get(field) {
            None => {
                notes.push(ValidationNote::Defaulted {
                    field,
                    value: default,
                });
                Ok(default)
            }
            Some(toml::Value::Boolean(b)) => Ok(*b),
            Some(_) => Err(self.invalid(field, "a boolean")),
        }
    }
}
