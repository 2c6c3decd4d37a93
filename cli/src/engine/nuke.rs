//! Nuke: remove a managed link, keeping its record (and backup reference).
use super::Engine;
use crate::cache::{CacheRecord, Status};
use crate::error::DotError;
use crate::resources::DotChange;

impl Engine<'_> {
    /// Remove the link recorded for `name`.
    ///
    /// A dot with no record, or one already removed, is left alone. The
    /// backup reference survives so the displaced file can be restored later.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::UnexpectedFileState`] when the cached target is no
    /// longer a symbolic link, [`DotError::MissingLink`] when it no longer
    /// points at the cached source, or a filesystem / cache error.
    pub fn nuke(&mut self, name: &str) -> Result<DotChange, DotError> {
        let Some(record) = self.cache.get(name).cloned() else {
            self.log
                .debug(&format!("{name}: not installed by moar-dots, nothing to remove"));
            return Ok(DotChange::Unchanged);
        };
        if record.status == Status::Removed {
            self.log.debug(&format!("{name}: already removed"));
            return Ok(DotChange::Unchanged);
        }

        if !self.fs.is_symlink(&record.target)? {
            return Err(DotError::UnexpectedFileState {
                name: name.to_string(),
                path: record.target,
            });
        }
        if !self
            .fs
            .same_content(&record.source, &record.target, record.kind)?
        {
            return Err(DotError::MissingLink {
                name: name.to_string(),
                target: record.target,
                source_path: record.source,
            });
        }

        self.fs.unlink(&record.target)?;
        self.log
            .info(&format!("{name}: removed {}", record.target.display()));

        let backup = record.backup.clone();
        self.cache.put(
            name,
            CacheRecord {
                status: Status::Removed,
                ..record
            },
        );
        self.cache.flush()?;

        if let Some(backup) = backup
            && self.fs.exists(&backup)?
        {
            self.log.info(&format!(
                "{name}: original file kept at {}; run `moar-dots restore {name}` to put it back",
                backup.display()
            ));
        }
        Ok(DotChange::Removed)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::engine::fixture::Fixture;

    #[test]
    fn install_nuke_install_round_trip() {
        let mut fx = Fixture::new();
        let src = fx.source_file("bashrc", "x");
        let dot = fx.dot("bashrc", &src);
        let link = fx.home.join("bashrc");

        fx.engine().install(&dot).unwrap();
        assert_eq!(fx.engine().nuke("bashrc").unwrap(), DotChange::Removed);
        assert!(link.symlink_metadata().is_err());
        assert_eq!(fx.cache.get("bashrc").unwrap().status, Status::Removed);
        assert!(src.exists(), "source must survive removal");

        assert_eq!(
            fx.engine().install(&dot).unwrap(),
            DotChange::Installed { backup: None }
        );
        assert!(link.is_symlink());
        assert_eq!(fx.cache.get("bashrc").unwrap().status, Status::Installed);
    }

    #[test]
    fn unknown_name_is_a_no_op() {
        let mut fx = Fixture::new();
        assert_eq!(fx.engine().nuke("nothing").unwrap(), DotChange::Unchanged);
        assert!(fx.log.contains("debug", "nothing to remove"));
    }

    #[test]
    fn already_removed_is_a_no_op() {
        let mut fx = Fixture::new();
        let src = fx.source_file("vimrc", "x");
        let dot = fx.dot("vimrc", &src);
        fx.engine().install(&dot).unwrap();
        fx.engine().nuke("vimrc").unwrap();
        let mutations = fx.fs.mutations();

        assert_eq!(fx.engine().nuke("vimrc").unwrap(), DotChange::Unchanged);
        assert_eq!(fx.fs.mutations(), mutations);
    }

    #[test]
    fn regular_file_at_target_is_never_deleted() {
        let mut fx = Fixture::new();
        let src = fx.source_file("zshrc", "x");
        let dot = fx.dot("zshrc", &src);
        fx.engine().install(&dot).unwrap();
        let link = fx.home.join("zshrc");
        std::fs::remove_file(&link).unwrap();
        std::fs::write(&link, "hand written").unwrap();

        let err = fx.engine().nuke("zshrc").unwrap_err();

        assert_eq!(err.kind(), "UnexpectedFileStateError");
        assert_eq!(std::fs::read_to_string(&link).unwrap(), "hand written");
        assert_eq!(fx.cache.get("zshrc").unwrap().status, Status::Installed);
    }

    #[cfg(unix)]
    #[test]
    fn link_to_something_else_is_missing_link() {
        let mut fx = Fixture::new();
        let src = fx.source_file("gitconfig", "mine");
        let other = fx.source_file("other", "theirs!");
        let dot = fx.dot("gitconfig", &src);
        fx.engine().install(&dot).unwrap();
        let link = fx.home.join("gitconfig");
        std::fs::remove_file(&link).unwrap();
        std::os::unix::fs::symlink(&other, &link).unwrap();

        let err = fx.engine().nuke("gitconfig").unwrap_err();

        assert_eq!(err.kind(), "MissingLinkError");
        assert!(link.is_symlink());
    }

    #[test]
    fn backup_reference_survives_removal() {
        let mut fx = Fixture::new();
        let src = fx.source_file("bashrc", "managed");
        let mut dot = fx.dot("bashrc", &src);
        dot.replace = true;
        std::fs::write(fx.home.join("bashrc"), "original").unwrap();
        fx.engine().install(&dot).unwrap();

        fx.engine().nuke("bashrc").unwrap();

        let record = fx.cache.get("bashrc").unwrap();
        assert_eq!(record.backup, Some(fx.home.join("bashrc.moar-dots.bak")));
        assert!(fx.log.contains("info", "moar-dots restore bashrc"));
    }
}
