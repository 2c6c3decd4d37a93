//! Command: restore backed-up files.
use anyhow::Result;

use super::{CommandSetup, for_each_dot};
use crate::cli::{GlobalOpts, RestoreOpts};
use crate::engine::Engine;
use crate::logging::{Log, Logger};
use crate::report::LogReporter;
use crate::resources::{FileSystemOps, SystemFileSystemOps};

/// Run the restore command.
///
/// # Errors
///
/// Returns an error if the configuration or cache cannot be loaded, or if
/// any backup could not be restored.
pub fn run(global: &GlobalOpts, opts: &RestoreOpts, log: &Logger) -> Result<()> {
    let mut setup = CommandSetup::init(global, log)?;
    execute(&mut setup, &opts.names, log, &SystemFileSystemOps);
    super::finish(log)
}

/// Move the backups of the named dots back into place.
pub fn execute(setup: &mut CommandSetup, names: &[String], log: &dyn Log, fs: &dyn FileSystemOps) {
    let reporter = LogReporter::new(log);
    log.stage("Restoring backups");
    let mut engine = Engine::new(&mut setup.cache, fs, log);
    for_each_dot(names, String::as_str, log, &reporter, |name| {
        engine.restore(name)
    });
}
