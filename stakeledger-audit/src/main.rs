//! Stakeledger audit binary.
//!
//! Opens a stakeledger store and imports genesis, checks invariants or
//! prints the ledger records. A violated invariant exits non-zero.

use tracing_subscriber::EnvFilter;

use stakeledger_audit::cli::Cli;
use stakeledger_audit::commands;
use stakeledger_audit::config::AuditConfig;

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Set up logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Stakeledger Audit v{}", env!("CARGO_PKG_VERSION"));

    let config = AuditConfig::from_cli(&cli);
    commands::run(&config)
}
