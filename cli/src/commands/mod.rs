//! Per-subcommand orchestration.
//!
//! Each command module exposes `run`, which resolves paths, loads the
//! configuration and cache, and prints the summary, plus `execute`, which
//! does the work against an explicit [`CommandSetup`] so it can be driven
//! from tests with any [`Log`] and
//! [`FileSystemOps`](crate::resources::FileSystemOps).
pub mod install;
pub mod nuke;
pub mod refresh;
pub mod restore;
pub mod status;
pub mod version;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::cache::{self, CacheStore};
use crate::cli::GlobalOpts;
use crate::config::validation::{self, PathContext, ValidationNote};
use crate::config::{self, Config};
use crate::engine;
use crate::error::DotError;
use crate::logging::{DotStatus, Log, Logger};
use crate::report::{Reporter, report_error};
use crate::resources::{DotChange, DotDescriptor};

/// Configuration and cache loaded for one command.
#[derive(Debug)]
pub struct CommandSetup {
    /// The loaded configuration document.
    pub config: Config,
    /// The cache store, loaded from disk.
    pub cache: CacheStore,
    /// Paths used to expand declared entries.
    pub paths: PathContext,
}

impl CommandSetup {
    /// Resolve the config and cache locations from flags, environment and
    /// defaults, then load both.
    ///
    /// # Errors
    ///
    /// Returns an error if a location cannot be determined or either
    /// document cannot be loaded.
    pub fn init(global: &GlobalOpts, log: &dyn Log) -> Result<Self> {
        let home = config::home_dir();
        let (config_path, cache_path) = resolve_paths(global, home.as_deref())?;
        Self::load(&config_path, &cache_path, home.as_deref(), log)
    }

    /// Load the configuration at `config_path` and the cache at `cache_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if either document cannot be read or parsed.
    pub fn load(
        config_path: &Path,
        cache_path: &Path,
        home: Option<&Path>,
        log: &dyn Log,
    ) -> Result<Self> {
        log.stage("Loading configuration");
        if !config_path.exists() {
            log.debug(&format!(
                "no config file at {}, nothing is declared",
                config_path.display()
            ));
        }
        let config = Config::load(config_path, home)?;
        log.info(&format!(
            "{} dot(s) declared in {}",
            config.entries.len(),
            config_path.display()
        ));
        log.debug(&format!("repository root: {}", config.root.display()));

        let cache = CacheStore::load(cache_path)
            .context("the cache must be repaired or removed before continuing")?;
        log.debug(&format!(
            "{} cached record(s) in {}",
            cache.len(),
            cache_path.display()
        ));

        let paths = config.path_context(home);
        Ok(Self {
            config,
            cache,
            paths,
        })
    }

    /// Validate every declared entry in order.
    ///
    /// Notes are logged; an entry that fails validation is reported and left
    /// out of the result without affecting the others.
    pub fn declared(&self, log: &dyn Log, reporter: &dyn Reporter) -> Vec<DotDescriptor> {
        let mut dots = Vec::with_capacity(self.config.entries.len());
        for entry in &self.config.entries {
            match validation::validate(&entry.fields, &self.paths) {
                Ok(validated) => {
                    for note in &validated.notes {
                        let msg = format!("{}: {note}", validated.descriptor.name);
                        match note {
                            ValidationNote::UnexpectedFields(_) => log.warn(&msg),
                            _ => log.debug(&msg),
                        }
                    }
                    dots.push(validated.descriptor);
                }
                Err(e) => report_error(reporter, &entry.key, &e),
            }
        }
        dots
    }

    /// Names declared in the config, valid or not, in document order.
    #[must_use]
    pub fn declared_names(&self) -> Vec<String> {
        self.config
            .entries
            .iter()
            .map(|e| {
                e.fields
                    .get("name")
                    .and_then(toml::Value::as_str)
                    .unwrap_or(&e.key)
                    .to_string()
            })
            .collect()
    }
}

/// Resolve the config and cache file locations.
///
/// Explicit flags win (clap folds `MOAR_DOTS_CONFIG` / `MOAR_DOTS_CACHE`
/// into them); otherwise the XDG defaults apply.
///
/// # Errors
///
/// Returns an error if no location is given and no home directory is known.
pub fn resolve_paths(global: &GlobalOpts, home: Option<&Path>) -> Result<(PathBuf, PathBuf)> {
    let config_path = match &global.config {
        Some(path) => path.clone(),
        None => config::default_config_file(home).with_context(|| {
            format!("cannot determine the config file; use --config or set {}", config::CONFIG_ENV)
        })?,
    };
    let cache_path = match &global.cache {
        Some(path) => path.clone(),
        None => cache::default_cache_file(home).with_context(|| {
            format!("cannot determine the cache file; use --cache or set {}", cache::CACHE_ENV)
        })?,
    };
    Ok((config_path, cache_path))
}

/// Record the outcome of one engine operation.
fn record(
    name: &str,
    result: Result<DotChange, DotError>,
    log: &dyn Log,
    reporter: &dyn Reporter,
) {
    match result {
        Ok(change) => {
            let msg = match change {
                DotChange::Installed { backup: Some(_) } => "linked, original backed up",
                DotChange::Installed { backup: None } => "linked",
                DotChange::Adopted => "adopted",
                DotChange::Removed => "removed",
                DotChange::Restored => "restored",
                DotChange::Unchanged => "up to date",
            };
            let status = if change == DotChange::Unchanged {
                DotStatus::Unchanged
            } else {
                DotStatus::Changed
            };
            log.record_dot(name, status, Some(msg));
        }
        Err(e) => report_error(reporter, name, &e),
    }
}

/// Run `op` for each item in order, recording every outcome.
///
/// Once an interrupt has been requested the remaining items are recorded as
/// skipped; the item in progress always completes first.
fn for_each_dot<T>(
    items: &[T],
    name_of: impl Fn(&T) -> &str,
    log: &dyn Log,
    reporter: &dyn Reporter,
    mut op: impl FnMut(&T) -> Result<DotChange, DotError>,
) {
    for item in items {
        let name = name_of(item);
        if engine::stop_requested() {
            log.record_dot(name, DotStatus::Skipped, Some("interrupted"));
            continue;
        }
        record(name, op(item), log, reporter);
    }
}

/// Report an explicitly requested name that the config does not declare.
fn report_unknown(reporter: &dyn Reporter, name: &str) {
    reporter.report(
        name,
        "ValidationError",
        &[format!("no dot named '{name}' is declared in the config file")],
    );
}

/// Print the summary and fail if any dot failed.
///
/// # Errors
///
/// Returns an error if one or more dots recorded a failure.
pub fn finish(log: &Logger) -> Result<()> {
    if engine::stop_requested() {
        log.warn("interrupted; remaining dots were skipped");
    }
    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} dot(s) failed");
    }
    Ok(())
}
