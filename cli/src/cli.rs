//! Command-line interface definition.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for moar-dots.
#[derive(Parser, Debug)]
#[command(
    name = "moar-dots",
    about = "Symlink dotfiles into place and keep track of them",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Configuration file (default: $XDG_CONFIG_HOME/moar-dots/config.toml)
    #[arg(short, long, global = true, env = "MOAR_DOTS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cache file (default: $XDG_CACHE_HOME/moar-dots/cache.toml)
    #[arg(long, global = true, env = "MOAR_DOTS_CACHE")]
    pub cache: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Link dots into place (all enabled dots when no names are given)
    Install(NamesOpts),
    /// Remove installed links (every managed dot when no names are given)
    Nuke(NamesOpts),
    /// Move backed-up files back after their dot was nuked
    Restore(RestoreOpts),
    /// Show the state of every declared and cached dot
    Status,
    /// Resync the cache with what is actually on disk
    RefreshCache,
    /// Print version information
    Version,
}

/// Dot names for `install` and `nuke`.
#[derive(Parser, Debug, Clone, Default)]
pub struct NamesOpts {
    /// Dot names to act on
    pub names: Vec<String>,
}

/// Options for the `restore` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct RestoreOpts {
    /// Dot names whose backups should be restored
    #[arg(required = true)]
    pub names: Vec<String>,
}

impl Command {
    /// Name used for the per-command log file.
    #[must_use]
    pub const fn log_name(&self) -> &'static str {
        match self {
            Self::Install(_) => "install",
            Self::Nuke(_) => "nuke",
            Self::Restore(_) => "restore",
            Self::Status => "status",
            Self::RefreshCache => "refresh-cache",
            Self::Version => "version",
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_install_all() {
        let cli = Cli::parse_from(["moar-dots", "install"]);
        assert!(matches!(cli.command, Command::Install(ref o) if o.names.is_empty()));
    }

    #[test]
    fn parse_install_names() {
        let cli = Cli::parse_from(["moar-dots", "install", "bashrc", "vimrc"]);
        assert!(matches!(
            &cli.command,
            Command::Install(o) if o.names == ["bashrc", "vimrc"]
        ));
    }

    #[test]
    fn parse_global_paths_after_subcommand() {
        let cli = Cli::parse_from([
            "moar-dots",
            "nuke",
            "--config",
            "/tmp/c.toml",
            "--cache",
            "/tmp/cache.toml",
        ]);
        assert_eq!(cli.global.config, Some(PathBuf::from("/tmp/c.toml")));
        assert_eq!(cli.global.cache, Some(PathBuf::from("/tmp/cache.toml")));
        assert!(matches!(cli.command, Command::Nuke(_)));
    }

    #[test]
    fn restore_requires_a_name() {
        assert!(Cli::try_parse_from(["moar-dots", "restore"]).is_err());
        let cli = Cli::parse_from(["moar-dots", "restore", "bashrc"]);
        assert!(matches!(cli.command, Command::Restore(_)));
    }

    #[test]
    fn parse_refresh_cache_and_verbose() {
        let cli = Cli::parse_from(["moar-dots", "-v", "refresh-cache"]);
        assert!(cli.verbose);
        assert_eq!(cli.command.log_name(), "refresh-cache");
    }

    #[test]
    fn parse_status_and_version() {
        assert!(matches!(
            Cli::parse_from(["moar-dots", "status"]).command,
            Command::Status
        ));
        assert!(matches!(
            Cli::parse_from(["moar-dots", "version"]).command,
            Command::Version
        ));
    }
}
