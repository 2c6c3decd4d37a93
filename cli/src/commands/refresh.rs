//! Command: resync the cache with the filesystem.
use anyhow::{Context as _, Result};

use super::CommandSetup;
use crate::cli::GlobalOpts;
use crate::engine::{Engine, RefreshSummary};
use crate::logging::{Log, Logger};
use crate::resources::{FileSystemOps, SystemFileSystemOps};

/// Run the refresh-cache command.
///
/// # Errors
///
/// Returns an error if the cache cannot be loaded, probed or written.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let mut setup = CommandSetup::init(global, log)?;
    let summary = execute(&mut setup, log, &SystemFileSystemOps)?;
    if summary.changes() == 0 {
        log.info("cache already matches the filesystem");
    } else {
        log.info(&format!(
            "{} dropped, {} marked removed, {} backup reference(s) cleared",
            summary.dropped.len(),
            summary.downgraded.len(),
            summary.cleared_backups.len()
        ));
    }
    Ok(())
}

/// Resync the cache with what is on disk.
///
/// # Errors
///
/// Returns an error if a probe or the cache flush fails.
pub fn execute(
    setup: &mut CommandSetup,
    log: &dyn Log,
    fs: &dyn FileSystemOps,
) -> Result<RefreshSummary> {
    log.stage("Refreshing cache");
    let path = setup.cache.path().to_path_buf();
    let mut engine = Engine::new(&mut setup.cache, fs, log);
    engine
        .refresh_cache()
        .with_context(|| format!("refreshing {}", path.display()))
}
