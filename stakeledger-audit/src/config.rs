//! Audit tool configuration.

use std::path::PathBuf;

use crate::cli::{Cli, Command};

/// Resolved configuration for one invocation.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Directory of the RocksDB store.
    pub data_dir: PathBuf,

    /// Command to run.
    pub command: Command,

    /// Log level.
    pub log_level: String,
}

impl AuditConfig {
    /// Create a configuration from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            data_dir: cli.expanded_data_dir(),
            command: cli.command.clone(),
            log_level: cli.log_level.clone(),
        }
    }

    /// Whether the command may create a fresh store.
    pub fn creates_store(&self) -> bool {
        matches!(self.command, Command::Init { .. })
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("~/.stakeledger"),
            command: Command::Check,
            log_level: "info".to_string(),
        }
    }
}
