//! Install: link a dot into place, repairing drift and preserving whatever
//! the link displaces.
use std::io;
use std::path::{Path, PathBuf};

use super::Engine;
use crate::cache::{CacheRecord, Status};
use crate::error::{DotError, fs_err};
use crate::resources::target::{self, ResolvedTarget};
use crate::resources::{DotChange, DotDescriptor, DotKind};

/// What the cache says about a dot before it is installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheCheck {
    /// No `installed` record.
    Miss,
    /// A cached field no longer matches the declaration.
    Stale(&'static str),
    /// The record matches but the filesystem disagrees.
    Drifted(String),
    /// Record and filesystem both match; nothing to do.
    UpToDate,
}

/// What currently sits at the target path.
enum Collision {
    Free,
    /// Already the correct link.
    OwnLink,
    /// The link this engine recorded, still pointing at the recorded source.
    ManagedLink,
    /// Anything else.
    Occupied,
}

impl Engine<'_> {
    /// Install `dot`.
    ///
    /// Returns [`DotChange::Unchanged`] without touching the filesystem when
    /// the cache and the link on disk both agree with the declaration.
    ///
    /// # Errors
    ///
    /// Returns a [`DotError`] for a missing or mistyped source, a missing
    /// target directory without `create_dirs`, an occupied target without
    /// `replace`, an occupied backup path, or any filesystem failure. The
    /// cache is not written for this dot on error.
    pub fn install(&mut self, dot: &DotDescriptor) -> Result<DotChange, DotError> {
        let resolved = target::resolve(dot);
        if resolved.exact_path {
            self.log.debug(&format!(
                "{}: target_dir already names the link; prefer target_dir + filename",
                dot.name
            ));
        }

        match self.check_cache(dot, &resolved)? {
            CacheCheck::UpToDate => {
                self.log.debug(&format!(
                    "{}: already linked at {}",
                    dot.name,
                    resolved.target_path.display()
                ));
                return Ok(DotChange::Unchanged);
            }
            CacheCheck::Stale(field) => self.log.info(&format!(
                "{}: cached '{field}' differs from config, reinstalling",
                dot.name
            )),
            CacheCheck::Drifted(reason) => self.log.warn(&format!(
                "{}: cache says installed but {reason}, repairing",
                dot.name
            )),
            CacheCheck::Miss => {}
        }

        self.check_source(dot)?;
        self.ensure_parent(dot, &resolved.target_path)?;

        let previous = self.cache.get(&dot.name).cloned();
        let backup = match self.collision(dot, &resolved, previous.as_ref())? {
            Collision::OwnLink => {
                self.log.info(&format!(
                    "{}: adopting existing link at {}",
                    dot.name,
                    resolved.target_path.display()
                ));
                self.write_record(dot, &resolved, previous.as_ref(), None)?;
                return Ok(DotChange::Adopted);
            }
            Collision::Free => self.leftover_backup(dot, &resolved, previous.as_ref())?,
            Collision::ManagedLink => {
                self.fs.unlink(&resolved.target_path)?;
                None
            }
            Collision::Occupied => Some(self.back_up(dot, &resolved)?),
        };

        self.fs
            .symlink(&dot.source, &resolved.target_path, dot.kind())?;
        self.log.info(&format!(
            "{}: linked {} -> {}",
            dot.name,
            resolved.target_path.display(),
            dot.source.display()
        ));

        self.write_record(dot, &resolved, previous.as_ref(), backup.clone())?;
        Ok(DotChange::Installed { backup })
    }

    /// Compare the cached record for `dot` with the declaration and, when
    /// they agree, with the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::Filesystem`] if the probe fails.
    pub fn check_cache(
        &self,
        dot: &DotDescriptor,
        resolved: &ResolvedTarget,
    ) -> Result<CacheCheck, DotError> {
        let Some(record) = self.cache.get(&dot.name) else {
            return Ok(CacheCheck::Miss);
        };
        if record.status != Status::Installed {
            return Ok(CacheCheck::Miss);
        }
        if let Some(field) = record.mismatch(dot) {
            return Ok(CacheCheck::Stale(field));
        }
        if record.target != resolved.target_path {
            self.log.warn(&format!(
                "{}: target moved from {}; the old link is left in place",
                dot.name,
                record.target.display()
            ));
            return Ok(CacheCheck::Drifted("target moved".to_string()));
        }
        Ok(
            match self.probe_link(&dot.source, &resolved.target_path, dot.kind())? {
                Some(reason) => CacheCheck::Drifted(reason),
                None => CacheCheck::UpToDate,
            },
        )
    }

    fn check_source(&self, dot: &DotDescriptor) -> Result<(), DotError> {
        if !self.fs.resolves(&dot.source)? {
            return Err(DotError::SourceNotFound {
                name: dot.name.clone(),
                path: dot.source.clone(),
            });
        }
        let actual = DotKind::from_is_directory(self.fs.is_dir(&dot.source)?);
        if actual != dot.kind() {
            return Err(DotError::SourceWrongType {
                name: dot.name.clone(),
                path: dot.source.clone(),
                expected: dot.kind(),
                actual,
            });
        }
        Ok(())
    }

    fn ensure_parent(&self, dot: &DotDescriptor, target_path: &Path) -> Result<(), DotError> {
        let Some(parent) = target_path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };
        if self.fs.exists(parent)? {
            return Ok(());
        }
        if !dot.create_dirs {
            return Err(DotError::MissingDirectory {
                name: dot.name.clone(),
                path: parent.to_path_buf(),
            });
        }
        self.fs.create_dir_all(parent)?;
        self.log
            .info(&format!("{}: created {}", dot.name, parent.display()));
        Ok(())
    }

    fn collision(
        &self,
        dot: &DotDescriptor,
        resolved: &ResolvedTarget,
        previous: Option<&CacheRecord>,
    ) -> Result<Collision, DotError> {
        let path = &resolved.target_path;
        if !self.fs.exists(path)? {
            return Ok(Collision::Free);
        }
        if !self.fs.is_symlink(path)? {
            return Ok(Collision::Occupied);
        }
        if self.fs.same_content(&dot.source, path, dot.kind())? {
            return Ok(Collision::OwnLink);
        }
        // Only the exact link we recorded may go without a backup; a link
        // re-pointed by hand is foreign state.
        let managed = match previous {
            Some(r) if r.status == Status::Installed && r.target == *path => self
                .fs
                .read_link(path)?
                .is_some_and(|dest| dest == r.source),
            _ => false,
        };
        Ok(if managed {
            Collision::ManagedLink
        } else {
            Collision::Occupied
        })
    }

    /// Pick up a backup left at the backup path by a run that stopped after
    /// moving the original aside but before linking.
    fn leftover_backup(
        &self,
        dot: &DotDescriptor,
        resolved: &ResolvedTarget,
        previous: Option<&CacheRecord>,
    ) -> Result<Option<PathBuf>, DotError> {
        let accounted = previous
            .filter(|r| r.target == resolved.target_path)
            .is_some_and(|r| r.status == Status::Installed || r.backup.is_some());
        if accounted || !self.fs.exists(&resolved.backup_path)? {
            return Ok(None);
        }
        self.log.warn(&format!(
            "{}: found {} from an earlier run, keeping it as the backup",
            dot.name,
            resolved.backup_path.display()
        ));
        Ok(Some(resolved.backup_path.clone()))
    }

    /// Move whatever occupies the target to its backup path.
    fn back_up(
        &self,
        dot: &DotDescriptor,
        resolved: &ResolvedTarget,
    ) -> Result<PathBuf, DotError> {
        if !dot.replace {
            return Err(DotError::TargetExists {
                name: dot.name.clone(),
                path: resolved.target_path.clone(),
            });
        }
        if self.fs.exists(&resolved.backup_path)? {
            return Err(fs_err(
                &resolved.backup_path,
                io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "backup path is already occupied",
                ),
            ));
        }
        self.fs
            .rename(&resolved.target_path, &resolved.backup_path)?;
        self.log.info(&format!(
            "{}: backed up {} to {}",
            dot.name,
            resolved.target_path.display(),
            resolved.backup_path.display()
        ));
        Ok(resolved.backup_path.clone())
    }

    /// Write an `installed` record and flush. A backup taken by an earlier
    /// install at the same target is kept. When the flush fails the
    /// in-memory record goes back to what it was.
    fn write_record(
        &mut self,
        dot: &DotDescriptor,
        resolved: &ResolvedTarget,
        previous: Option<&CacheRecord>,
        backup: Option<PathBuf>,
    ) -> Result<(), DotError> {
        let backup = backup.or_else(|| {
            previous
                .filter(|r| r.target == resolved.target_path)
                .and_then(|r| r.backup.clone())
        });
        self.cache.put(
            &dot.name,
            CacheRecord::installed(dot, &resolved.target_path, backup),
        );
        if let Err(e) = self.cache.flush() {
            self.cache.remove(&dot.name);
            if let Some(record) = previous {
                self.cache.put(&dot.name, record.clone());
            }
            return Err(e.into());
        }
        Ok(())
    }
}
