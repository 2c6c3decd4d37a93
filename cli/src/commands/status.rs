//! Command: show the state of every declared and cached dot.
use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;

use super::CommandSetup;
use crate::cli::GlobalOpts;
use crate::engine::Engine;
use crate::logging::{Log, Logger};
use crate::report::{LogReporter, report_error};
use crate::resources::{DotState, FileSystemOps, SystemFileSystemOps, target};

/// One line of the status table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    /// Dot name.
    pub name: String,
    /// Classified state.
    pub state: DotState,
    /// Where the link lives (or would live).
    pub target: PathBuf,
    /// Whether the config still declares this dot.
    pub declared: bool,
}

/// Run the status command.
///
/// # Errors
///
/// Returns an error if the configuration or cache cannot be loaded, or if
/// any dot could not be classified.
#[allow(clippy::print_stdout)]
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let mut setup = CommandSetup::init(global, log)?;
    let rows = collect(&mut setup, log, &SystemFileSystemOps);
    println!();
    print!("{}", render(&rows));

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} dot(s) could not be checked");
    }
    Ok(())
}

/// Classify every declared dot, then every cached dot the config no longer
/// declares. Never mutates the filesystem or the cache.
pub fn collect(setup: &mut CommandSetup, log: &dyn Log, fs: &dyn FileSystemOps) -> Vec<StatusRow> {
    let reporter = LogReporter::new(log);
    let declared = setup.declared(log, &reporter);
    let declared_names = setup.declared_names();
    let engine = Engine::new(&mut setup.cache, fs, log);

    let mut rows = Vec::new();
    for dot in &declared {
        match engine.classify(dot) {
            Ok(state) => rows.push(StatusRow {
                name: dot.name.clone(),
                state,
                target: target::resolve(dot).target_path,
                declared: true,
            }),
            Err(e) => report_error(&reporter, &dot.name, &e),
        }
    }

    let orphans: Vec<(String, PathBuf)> = engine
        .cache()
        .iter()
        .filter(|(name, _)| !declared_names.iter().any(|d| d == name))
        .map(|(name, record)| (name.to_string(), record.target.clone()))
        .collect();
    for (name, target) in orphans {
        match engine.classify_cached(&name) {
            Ok(state) => rows.push(StatusRow {
                name,
                state,
                target,
                declared: false,
            }),
            Err(e) => report_error(&reporter, &name, &e),
        }
    }
    rows
}

/// Render rows as an aligned table.
#[must_use]
pub fn render(rows: &[StatusRow]) -> String {
    if rows.is_empty() {
        return "no dots declared or cached\n".to_string();
    }

    let states: Vec<String> = rows.iter().map(|r| r.state.to_string()).collect();
    let name_width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0).max(4);
    let state_width = states.iter().map(String::len).max().unwrap_or(0).max(5);

    let mut out = String::new();
    let _ = writeln!(out, "{:<name_width$}  {:<state_width$}  TARGET", "NAME", "STATE");
    for (row, state) in rows.iter().zip(&states) {
        let note = if row.declared { "" } else { " (not declared)" };
        let _ = writeln!(
            out,
            "{:<name_width$}  {state:<state_width$}  {}{note}",
            row.name,
            row.target.display()
        );
    }
    out
}
