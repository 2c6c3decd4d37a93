//! Error-reporting interface.
//!
//! The engine hands every fatal per-dot condition to a [`Reporter`] exactly
//! once, as a short kind tag plus free-text detail lines. The reporter owns
//! presentation; it never stops other dots from being processed.
use crate::error::DotError;
use crate::logging::{DotStatus, Log};

/// Receiver of fatal per-dot conditions.
pub trait Reporter {
    /// Report that `name` failed with error kind `kind`.
    fn report(&self, name: &str, kind: &str, details: &[String]);
}

/// Report `err` for `name` through `reporter`.
pub fn report_error(reporter: &dyn Reporter, name: &str, err: &DotError) {
    reporter.report(name, err.kind(), &err.details());
}

/// [`Reporter`] that writes to a [`Log`] and records the dot as failed.
#[derive(Clone, Copy)]
pub struct LogReporter<'a> {
    log: &'a dyn Log,
}

impl std::fmt::Debug for LogReporter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogReporter").finish_non_exhaustive()
    }
}

impl<'a> LogReporter<'a> {
    /// Create a reporter over `log`.
    #[must_use]
    pub const fn new(log: &'a dyn Log) -> Self {
        Self { log }
    }
}

impl Reporter for LogReporter<'_> {
    fn report(&self, name: &str, kind: &str, details: &[String]) {
        let mut lines = details.iter();
        match lines.next() {
            Some(first) => self.log.error(&format!("{kind}: {first}")),
            None => self.log.error(&format!("{kind}: {name}")),
        }
        for line in lines {
            self.log.info(line);
        }
        self.log.record_dot(name, DotStatus::Failed, Some(kind));
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::logging::RecordingLog;
    use std::path::PathBuf;

    #[test]
    fn log_reporter_logs_and_records_failure() {
        let log = RecordingLog::default();
        let reporter = LogReporter::new(&log);
        let err = DotError::TargetExists {
            name: "bashrc".to_string(),
            path: PathBuf::from("/home/u/.bashrc"),
        };

        report_error(&reporter, "bashrc", &err);

        assert!(log.contains("error", "TargetExistsError: dot 'bashrc'"));
        assert!(log.contains("info", "replace = true"));
        let dots = log.dots.lock().unwrap();
        assert_eq!(dots.as_slice(), [("bashrc".to_string(), DotStatus::Failed)]);
    }

    #[test]
    fn empty_details_still_reports() {
        let log = RecordingLog::default();
        LogReporter::new(&log).report("x", "CacheError", &[]);
        assert!(log.contains("error", "CacheError: x"));
    }
}
