//! Logging infrastructure for structured console and file output.

mod logger;
mod subscriber;
mod types;
mod utils;

pub use logger::Logger;
pub use subscriber::init_subscriber;
pub use types::{DotEntry, DotStatus, Log};

/// Serializes `XDG_CACHE_HOME` manipulation across parallel test threads.
#[cfg(test)]
pub(crate) static TEST_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Create a Logger backed by an isolated per-thread tracing subscriber
/// with a [`FileLayer`](subscriber::FileLayer), so that tracing events emitted
/// by logger methods reach the log file during tests.
///
/// The returned guard must be kept alive for the duration of the test.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn isolated_logger() -> (Logger, tempfile::TempDir, tracing::dispatcher::DefaultGuard) {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let env_lock = TEST_ENV_MUTEX
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    // SAFETY: Protected by TEST_ENV_MUTEX; restored before lock is released.
    #[allow(unsafe_code)]
    unsafe {
        std::env::set_var("XDG_CACHE_HOME", tmp.path());
    }
    let file_layer = subscriber::FileLayer::new("test").expect("failed to create file layer");
    let log = Logger::new("test");
    #[allow(unsafe_code)]
    unsafe {
        std::env::remove_var("XDG_CACHE_HOME");
    }
    drop(env_lock);
    let subscriber =
        tracing_subscriber::registry().with(file_layer.with_filter(LevelFilter::DEBUG));
    let guard = tracing::dispatcher::set_default(&tracing::Dispatch::new(subscriber));
    (log, tmp, guard)
}

/// A [`Log`] that keeps every message in memory, for engine tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingLog {
    pub messages: std::sync::Mutex<Vec<(&'static str, String)>>,
    pub dots: std::sync::Mutex<Vec<(String, DotStatus)>>,
}

#[cfg(test)]
impl RecordingLog {
    fn push(&self, level: &'static str, msg: &str) {
        if let Ok(mut guard) = self.messages.lock() {
            guard.push((level, msg.to_string()));
        }
    }

    /// Whether any message at `level` contains `needle`.
    pub fn contains(&self, level: &str, needle: &str) -> bool {
        self.messages
            .lock()
            .map(|g| g.iter().any(|(l, m)| *l == level && m.contains(needle)))
            .unwrap_or(false)
    }
}

#[cfg(test)]
impl Log for RecordingLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn record_dot(&self, name: &str, status: DotStatus, _message: Option<&str>) {
        if let Ok(mut guard) = self.dots.lock() {
            guard.push((name.to_string(), status));
        }
    }
}
