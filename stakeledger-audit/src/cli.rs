//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Stakeledger store audit tool.
#[derive(Parser, Debug, Clone)]
#[command(name = "stakeledger-audit")]
#[command(about = "Import genesis into a stakeledger store and audit its invariants")]
#[command(version)]
pub struct Cli {
    /// Data directory holding the RocksDB store.
    #[arg(long, global = true, default_value = "~/.stakeledger")]
    pub data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// What to do with the store.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Import a genesis JSON file into an empty store.
    Init {
        /// Path to the genesis file.
        #[arg(long)]
        genesis: PathBuf,
    },
    /// Run every invariant check; exits non-zero on a violation.
    Check,
    /// Print the pool, fee pool and parameters as JSON.
    Show,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Expand the data directory path (handle ~ for home).
    pub fn expanded_data_dir(&self) -> PathBuf {
        let path_str = self.data_dir.to_string_lossy();
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        }
        self.data_dir.clone()
    }
}
