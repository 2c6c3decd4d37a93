//! Structured logger with per-dot summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::STAGE_TARGET;
use super::types::{DotEntry, DotStatus, Log};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Logger that emits through [`tracing`] and remembers every dot's outcome.
///
/// All messages are also written to `<cache dir>/<command>.log` by the
/// subscriber's file layer, regardless of the verbose flag.
#[derive(Debug)]
pub struct Logger {
    dots: Mutex<Vec<DotEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger.
    ///
    /// Stores the log file path for display in the summary; the file itself
    /// is created by [`init_subscriber`](super::subscriber::init_subscriber).
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            dots: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded entries.
    #[must_use]
    pub fn entries(&self) -> Vec<DotEntry> {
        self.dots.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Record a dot's result for the summary.
    pub fn record_dot(&self, name: &str, status: DotStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.dots.lock() {
            guard.push(DotEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Count the dots that failed.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.dots.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|d| d.status == DotStatus::Failed)
                .count()
        })
    }

    /// Print one line per recorded dot followed by the totals.
    #[allow(clippy::print_stdout)]
    pub fn print_summary(&self) {
        let dots = self.entries();
        if dots.is_empty() {
            return;
        }

        println!();
        self.stage("Summary");

        let mut changed = 0u32;
        let mut unchanged = 0u32;
        let mut skipped = 0u32;
        let mut failed = 0u32;

        for dot in &dots {
            let (icon, color) = match dot.status {
                DotStatus::Changed => {
                    changed += 1;
                    ("✓", "\x1b[32m")
                }
                DotStatus::Unchanged => {
                    unchanged += 1;
                    ("·", "\x1b[2m")
                }
                DotStatus::Skipped => {
                    skipped += 1;
                    ("○", "\x1b[33m")
                }
                DotStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = dot
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", dot.name));
        }

        println!();
        let total = changed + unchanged + skipped + failed;
        self.info(&format!(
            "{total} dots: \x1b[32m{changed} ok\x1b[0m, \x1b[2m{unchanged} unchanged\x1b[0m, \x1b[33m{skipped} skipped\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error);

    fn record_dot(&self, name: &str, status: DotStatus, message: Option<&str>) {
        self.record_dot(name, status, message);
    }
}
