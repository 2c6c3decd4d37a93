//! Target path resolution.
//!
//! Pure path arithmetic: no call in this module touches the filesystem.
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::DotDescriptor;

/// Suffix appended to a displaced file's path when it is backed up.
pub const BACKUP_SUFFIX: &str = ".moar-dots.bak";

/// Where a dot's link (and any backup) lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Absolute path of the symbolic link.
    pub target_path: PathBuf,
    /// Where a displaced file is moved to.
    pub backup_path: PathBuf,
    /// `target_dir` already named the link itself rather than its directory.
    pub exact_path: bool,
}

/// Compute the link path for `dot`.
///
/// The link name is `filename` when set, otherwise the source's basename,
/// prefixed with `.` when `dotted` is set and no `filename` was given. When
/// `target_dir` already ends with that basename (e.g. `target_dir =
/// "/home/u/.bashrc"` for source `bashrc`) it is taken as the full link path.
#[must_use]
pub fn resolve(dot: &DotDescriptor) -> ResolvedTarget {
    let base = dot.filename.clone().unwrap_or_else(|| {
        dot.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let dir = dot.target_dir.to_string_lossy();
    let trimmed = dir.trim_end_matches(std::path::is_separator);

    let (target_path, exact_path) = if !base.is_empty() && trimmed.ends_with(base.as_str()) {
        (PathBuf::from(trimmed), true)
    } else {
        let name = if dot.dotted && dot.filename.is_none() && !base.starts_with('.') {
            format!(".{base}")
        } else {
            base
        };
        (dot.target_dir.join(name), false)
    };

    ResolvedTarget {
        backup_path: backup_path_for(&target_path),
        target_path,
        exact_path,
    }
}

/// The backup location for a link at `target`.
#[must_use]
pub fn backup_path_for(target: &Path) -> PathBuf {
    let mut raw = OsString::from(target.as_os_str());
    raw.push(BACKUP_SUFFIX);
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(source: &str, target_dir: &str) -> DotDescriptor {
        DotDescriptor {
            name: "test".to_string(),
            source: PathBuf::from(source),
            target_dir: PathBuf::from(target_dir),
            filename: None,
            is_directory: false,
            dotted: false,
            create_dirs: false,
            replace: false,
            install: true,
            description: None,
        }
    }

    #[test]
    fn uses_source_basename() {
        let resolved = resolve(&dot("/repo/vimrc", "/home/u"));
        assert_eq!(resolved.target_path, PathBuf::from("/home/u/vimrc"));
        assert!(!resolved.exact_path);
    }

    #[test]
    fn dotted_prefixes_basename() {
        let mut d = dot("/repo/bashrc", "/home/u");
        d.dotted = true;
        assert_eq!(resolve(&d).target_path, PathBuf::from("/home/u/.bashrc"));
    }

    #[test]
    fn dotted_does_not_double_prefix() {
        let mut d = dot("/repo/.profile", "/home/u");
        d.dotted = true;
        assert_eq!(resolve(&d).target_path, PathBuf::from("/home/u/.profile"));
    }

    #[test]
    fn filename_override_ignores_dotted() {
        let mut d = dot("/repo/git/config", "/home/u/.config/git");
        d.filename = Some("config".to_string());
        d.dotted = true;
        assert_eq!(
            resolve(&d).target_path,
            PathBuf::from("/home/u/.config/git/config")
        );
    }

    #[test]
    fn filename_override_renames_link() {
        let mut d = dot("/repo/bash/main.sh", "/home/u");
        d.filename = Some(".bash_aliases".to_string());
        assert_eq!(
            resolve(&d).target_path,
            PathBuf::from("/home/u/.bash_aliases")
        );
    }

    #[test]
    fn target_dir_naming_the_file_is_used_verbatim() {
        let resolved = resolve(&dot("/repo/bashrc", "/home/u/.bashrc"));
        assert_eq!(resolved.target_path, PathBuf::from("/home/u/.bashrc"));
        assert!(resolved.exact_path);
    }

    #[test]
    fn target_dir_naming_the_file_ignores_trailing_separator() {
        let resolved = resolve(&dot("/repo/bashrc", "/home/u/bashrc/"));
        assert_eq!(resolved.target_path, PathBuf::from("/home/u/bashrc"));
        assert!(resolved.exact_path);
    }

    #[test]
    fn backup_path_appends_suffix() {
        let resolved = resolve(&dot("/repo/vimrc", "/home/u"));
        assert_eq!(
            resolved.backup_path,
            PathBuf::from("/home/u/vimrc.moar-dots.bak")
        );
    }

    #[test]
    fn resolution_is_deterministic() {
        let mut d = dot("/repo/zshrc", "/home/u");
        d.dotted = true;
        assert_eq!(resolve(&d), resolve(&d));
    }
}
