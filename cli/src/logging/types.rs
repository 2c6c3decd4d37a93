//! Core logging types: per-dot entries, status, and the [`Log`] trait.
use std::fmt;

/// Outcome of one dot for summary reporting.
#[derive(Debug, Clone)]
pub struct DotEntry {
    /// Dot name.
    pub name: String,
    /// Final status of the dot.
    pub status: DotStatus,
    /// Optional detail message (e.g., skip reason or error kind).
    pub message: Option<String>,
}

/// Status of a processed dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotStatus {
    /// The filesystem or cache was changed.
    Changed,
    /// Already in the desired state.
    Unchanged,
    /// Not processed (disabled, interrupted, nothing recorded).
    Skipped,
    /// Processing stopped with an error.
    Failed,
}

impl fmt::Display for DotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Changed => "ok",
            Self::Unchanged => "unchanged",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        })
    }
}

/// Abstraction over logging backends.
///
/// The engine and commands log through this trait so tests can substitute a
/// recording implementation for [`Logger`](super::logger::Logger).
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Record a dot's result for the summary.
    fn record_dot(&self, name: &str, status: DotStatus, message: Option<&str>);
}
