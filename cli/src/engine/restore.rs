//! Restore: move a backup taken during install back to the target path.
use super::Engine;
use crate::cache::{CacheRecord, Status};
use crate::error::DotError;
use crate::resources::DotChange;

impl Engine<'_> {
    /// Put the file displaced by `name`'s install back where it was.
    ///
    /// Only a removed dot with a recorded backup can be restored; the record
    /// keeps its `removed` status and loses the backup reference.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::Backup`] when there is nothing to restore or the
    /// dot is still installed, [`DotError::TargetExists`] when something
    /// already occupies the target, or a filesystem / cache error.
    pub fn restore(&mut self, name: &str) -> Result<DotChange, DotError> {
        let refuse = |reason: &str| DotError::Backup {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let record = self
            .cache
            .get(name)
            .cloned()
            .ok_or_else(|| refuse("moar-dots has no record of this dot"))?;
        if record.status == Status::Installed {
            return Err(refuse("the dot is still installed; nuke it first"));
        }
        let Some(backup) = record.backup.clone() else {
            return Err(refuse("no backup was taken when it was installed"));
        };
        if !self.fs.exists(&backup)? {
            return Err(refuse(&format!("backup {} no longer exists", backup.display())));
        }
        if self.fs.exists(&record.target)? {
            return Err(DotError::TargetExists {
                name: name.to_string(),
                path: record.target,
            });
        }

        self.fs.rename(&backup, &record.target)?;
        self.log.info(&format!(
            "{name}: restored {} from {}",
            record.target.display(),
            backup.display()
        ));

        self.cache.put(
            name,
            CacheRecord {
                backup: None,
                ..record
            },
        );
        self.cache.flush()?;
        Ok(DotChange::Restored)
    }
}
