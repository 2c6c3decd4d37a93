//! Command: install dots.
use anyhow::Result;

use super::{CommandSetup, for_each_dot, report_unknown};
use crate::cli::{GlobalOpts, NamesOpts};
use crate::engine::Engine;
use crate::logging::{DotStatus, Log, Logger};
use crate::report::LogReporter;
use crate::resources::{DotDescriptor, FileSystemOps, SystemFileSystemOps};

/// Run the install command.
///
/// # Errors
///
/// Returns an error if the configuration or cache cannot be loaded, or if
/// any dot failed to install.
pub fn run(global: &GlobalOpts, opts: &NamesOpts, log: &Logger) -> Result<()> {
    log.info(&format!("moar-dots {}", super::version::version()));
    let mut setup = CommandSetup::init(global, log)?;
    execute(&mut setup, &opts.names, log, &SystemFileSystemOps);
    super::finish(log)
}

/// Install the named dots, or every enabled dot when `names` is empty.
///
/// Dots declared with `install = false` are skipped unless named
/// explicitly. Failures are reported per dot and never stop the batch.
pub fn execute(setup: &mut CommandSetup, names: &[String], log: &dyn Log, fs: &dyn FileSystemOps) {
    let reporter = LogReporter::new(log);
    let declared = setup.declared(log, &reporter);

    let selected: Vec<DotDescriptor> = if names.is_empty() {
        declared
            .into_iter()
            .filter(|dot| {
                if !dot.install {
                    log.record_dot(&dot.name, DotStatus::Skipped, Some("disabled"));
                }
                dot.install
            })
            .collect()
    } else {
        let mut picked = Vec::with_capacity(names.len());
        for name in names {
            if let Some(dot) = declared.iter().find(|d| &d.name == name) {
                picked.push(dot.clone());
            } else if !setup.declared_names().contains(name) {
                report_unknown(&reporter, name);
            }
        }
        picked
    };

    log.stage("Installing dots");
    let mut engine = Engine::new(&mut setup.cache, fs, log);
    for_each_dot(&selected, |d| d.name.as_str(), log, &reporter, |dot| {
        engine.install(dot)
    });
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::engine::fixture::CountingFs;
    use crate::logging::RecordingLog;

    fn setup(dir: &Path, config: &str) -> CommandSetup {
        std::fs::create_dir_all(dir.join("home")).unwrap();
        std::fs::create_dir_all(dir.join("repo")).unwrap();
        std::fs::write(dir.join("repo/bashrc"), "bash").unwrap();
        std::fs::write(dir.join("repo/vimrc"), "vim").unwrap();
        let config_path = dir.join("repo/moar-dots.toml");
        std::fs::write(&config_path, config).unwrap();
        CommandSetup::load(
            &config_path,
            &dir.join("cache.toml"),
            Some(&dir.join("home")),
            &RecordingLog::default(),
        )
        .unwrap()
    }

    const CONFIG: &str = r#"
[dots.bashrc]
source = "bashrc"
target_dir = "~"
dotted = true

[dots.vimrc]
source = "vimrc"
target_dir = "~"
dotted = true
install = false
"#;

    #[test]
    fn installs_enabled_dots_and_skips_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut setup = setup(dir.path(), CONFIG);
        let log = RecordingLog::default();

        execute(&mut setup, &[], &log, &CountingFs::default());

        assert!(dir.path().join("home/.bashrc").is_symlink());
        assert!(!dir.path().join("home/.vimrc").exists());
        let dots = log.dots.lock().unwrap();
        assert_eq!(
            dots.as_slice(),
            [
                ("vimrc".to_string(), DotStatus::Skipped),
                ("bashrc".to_string(), DotStatus::Changed),
            ]
        );
    }

    #[test]
    fn explicit_name_overrides_install_flag() {
        let dir = tempfile::tempdir().unwrap();
        let mut setup = setup(dir.path(), CONFIG);
        let log = RecordingLog::default();

        execute(&mut setup, &["vimrc".to_string()], &log, &CountingFs::default());

        assert!(dir.path().join("home/.vimrc").is_symlink());
        assert!(!dir.path().join("home/.bashrc").exists());
    }

    #[test]
    fn unknown_name_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut setup = setup(dir.path(), CONFIG);
        let log = RecordingLog::default();

        execute(&mut setup, &["zshrc".to_string()], &log, &CountingFs::default());

        assert!(log.contains("error", "no dot named 'zshrc'"));
        let dots = log.dots.lock().unwrap();
        assert_eq!(dots.as_slice(), [("zshrc".to_string(), DotStatus::Failed)]);
    }

    #[test]
    fn second_run_is_unchanged_and_does_not_mutate() {
        let dir = tempfile::tempdir().unwrap();
        let mut setup = setup(dir.path(), CONFIG);
        execute(&mut setup, &[], &RecordingLog::default(), &CountingFs::default());

        let fs = CountingFs::default();
        let log = RecordingLog::default();
        execute(&mut setup, &[], &log, &fs);

        assert_eq!(fs.mutations(), 0);
        assert!(
            log.dots
                .lock()
                .unwrap()
                .contains(&("bashrc".to_string(), DotStatus::Unchanged))
        );
    }

    #[test]
    fn one_failure_does_not_stop_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut setup = setup(
            dir.path(),
            r#"
[dots.missing]
source = "nope"
target_dir = "~"

[dots.bashrc]
source = "bashrc"
target_dir = "~"
"#,
        );
        let log = RecordingLog::default();

        execute(&mut setup, &[], &log, &CountingFs::default());

        assert!(log.contains("error", "SourceError"));
        assert!(dir.path().join("home/bashrc").is_symlink());
    }
}
