//! Command: remove installed links.
use anyhow::Result;

use super::{CommandSetup, for_each_dot};
use crate::cli::{GlobalOpts, NamesOpts};
use crate::engine::Engine;
use crate::logging::{Log, Logger};
use crate::report::LogReporter;
use crate::resources::{FileSystemOps, SystemFileSystemOps};

/// Run the nuke command.
///
/// # Errors
///
/// Returns an error if the configuration or cache cannot be loaded, or if
/// any dot failed to be removed.
pub fn run(global: &GlobalOpts, opts: &NamesOpts, log: &Logger) -> Result<()> {
    let mut setup = CommandSetup::init(global, log)?;
    execute(&mut setup, &opts.names, log, &SystemFileSystemOps);
    super::finish(log)
}

/// Names to nuke when none are given: everything declared, then cached
/// names the config no longer mentions.
#[must_use]
pub fn all_names(setup: &CommandSetup) -> Vec<String> {
    let mut names = setup.declared_names();
    let orphans: Vec<String> = setup
        .cache
        .names()
        .filter(|n| !names.iter().any(|d| d == n))
        .map(str::to_string)
        .collect();
    names.extend(orphans);
    names
}

/// Remove the links of the named dots, or of every known dot when `names`
/// is empty.
///
/// Works from the cache alone, so entries that no longer validate (or are no
/// longer declared) can still be cleaned up.
pub fn execute(setup: &mut CommandSetup, names: &[String], log: &dyn Log, fs: &dyn FileSystemOps) {
    let reporter = LogReporter::new(log);
    let names = if names.is_empty() {
        all_names(setup)
    } else {
        names.to_vec()
    };

    log.stage("Removing dots");
    let mut engine = Engine::new(&mut setup.cache, fs, log);
    for_each_dot(&names, String::as_str, log, &reporter, |name| {
        engine.nuke(name)
    });
}
