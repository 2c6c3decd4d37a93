//! Read-side operations: classifying dots and resyncing the cache with disk.
use super::Engine;
use crate::cache::{CacheRecord, Status};
use crate::error::DotError;
use crate::resources::{DotDescriptor, DotState, target};

/// What [`Engine::refresh_cache`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    /// Installed records whose target is no longer a link; removed.
    pub dropped: Vec<String>,
    /// Installed records whose link no longer matches; marked removed.
    pub downgraded: Vec<String>,
    /// Removed records whose backup vanished; backup cleared.
    pub cleared_backups: Vec<String>,
}

impl RefreshSummary {
    /// Total number of records changed.
    #[must_use]
    pub fn changes(&self) -> usize {
        self.dropped.len() + self.downgraded.len() + self.cleared_backups.len()
    }
}

impl Engine<'_> {
    /// Classify a declared dot against its cache record and the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::Filesystem`] if the probe fails.
    pub fn classify(&self, dot: &DotDescriptor) -> Result<DotState, DotError> {
        let Some(record) = self.cache.get(&dot.name) else {
            return Ok(DotState::Unmanaged);
        };
        if record.status == Status::Removed {
            return Ok(DotState::Removed);
        }
        let resolved = target::resolve(dot);
        if record.target != resolved.target_path {
            return Ok(DotState::Drifted {
                reason: format!("cached target {} is not where config points", record.target.display()),
            });
        }
        self.probe_state(&dot.source, record)
    }

    /// Classify a cached dot from its record alone (no declaration needed).
    ///
    /// # Errors
    ///
    /// Returns [`DotError::Filesystem`] if the probe fails.
    pub fn classify_cached(&self, name: &str) -> Result<DotState, DotError> {
        match self.cache.get(name) {
            None => Ok(DotState::Unmanaged),
            Some(record) if record.status == Status::Removed => Ok(DotState::Removed),
            Some(record) => self.probe_state(&record.source, record),
        }
    }

    fn probe_state(
        &self,
        source: &std::path::Path,
        record: &CacheRecord,
    ) -> Result<DotState, DotError> {
        Ok(match self.probe_link(source, &record.target, record.kind)? {
            Some(reason) => DotState::Drifted { reason },
            None => DotState::Installed,
        })
    }

    /// Bring every cache record in line with what is actually on disk.
    ///
    /// Never touches the filesystem; only records change. The cache is
    /// flushed when anything changed.
    ///
    /// # Errors
    ///
    /// Returns a filesystem error if a probe fails or a cache error if the
    /// flush fails.
    pub fn refresh_cache(&mut self) -> Result<RefreshSummary, DotError> {
        let mut summary = RefreshSummary::default();
        let records: Vec<(String, CacheRecord)> = self
            .cache
            .iter()
            .map(|(name, record)| (name.to_string(), record.clone()))
            .collect();

        for (name, record) in records {
            match record.status {
                Status::Installed => {
                    if !self.fs.is_symlink(&record.target)? {
                        self.log.warn(&format!(
                            "{name}: {} is no longer a link, dropping record",
                            record.target.display()
                        ));
                        self.cache.remove(&name);
                        summary.dropped.push(name);
                    } else if !self
                        .fs
                        .same_content(&record.source, &record.target, record.kind)?
                    {
                        self.log.warn(&format!(
                            "{name}: {} no longer points at {}, marking removed",
                            record.target.display(),
                            record.source.display()
                        ));
                        self.cache.put(
                            &name,
                            CacheRecord {
                                status: Status::Removed,
                                ..record
                            },
                        );
                        summary.downgraded.push(name);
                    }
                }
                Status::Removed => {
                    if let Some(backup) = &record.backup
                        && !self.fs.exists(backup)?
                    {
                        self.log.warn(&format!(
                            "{name}: backup {} is gone, forgetting it",
                            backup.display()
                        ));
                        self.cache.put(
                            &name,
                            CacheRecord {
                                backup: None,
                                ..record
                            },
                        );
                        summary.cleared_backups.push(name);
                    }
                }
            }
        }

        if summary.changes() > 0 {
            self.cache.flush()?;
        }
        Ok(summary)
    }
}
