//! Common types and utilities shared across commands

use anyhow::Context;
use clap::Parser;
use configure_config::Layout;
use std::path::PathBuf;

/// Global CLI options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    #[arg(
        short = 'C',
        long,
        global = true,
        value_name = "DIR",
        help = "Workspace root (defaults to the current directory)"
    )]
    pub root: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Decrease verbosity")]
    pub quiet: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase verbosity (-v for debug, -vv for trace)")]
    pub verbose: u8,
}

impl GlobalOpts {
    /// Get the effective verbosity level
    /// - 0: quiet/warn only
    /// - 1: debug (-v)
    /// - 2: trace (-vv)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    pub fn workspace_root(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Load the layout of the selected workspace
    pub fn load_layout(&self) -> anyhow::Result<Layout> {
        let root = self.workspace_root();
        Layout::load(&root)
            .with_context(|| format!("Failed to load layout for {}", root.display()))
    }
}

/// Outcome of a command that ran to completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Dependency constraints agree (and, with `--check`, nothing is stale)
    Consistent,
    /// Mismatched constraints were found or generated files are stale
    Inconsistent,
}

impl RunStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Consistent => 0,
            RunStatus::Inconsistent => 1,
        }
    }
}

/// Exit code for runs aborted by a fatal error
pub const FATAL_EXIT_CODE: i32 = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_wins_over_verbose() {
        let opts = GlobalOpts {
            quiet: true,
            verbose: 2,
            ..Default::default()
        };
        assert_eq!(opts.verbosity_level(), 0);
    }

    #[test]
    fn test_default_root_is_cwd() {
        assert_eq!(GlobalOpts::default().workspace_root(), PathBuf::from("."));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(RunStatus::Consistent.exit_code(), 0);
        assert_eq!(RunStatus::Inconsistent.exit_code(), 1);
        assert_ne!(RunStatus::Inconsistent.exit_code(), FATAL_EXIT_CODE);
    }
}
