//! Subcommand implementations.
//!
//! Each command works against any [`KvBackend`]; [`run`] opens the
//! RocksDB store named by the configuration and dispatches.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use serde_json::{json, Value};

use stakeledger_state::invariants::all_invariants;
use stakeledger_state::Pool;
use stakeledger_storage::{GenesisState, Keeper, KvBackend, RocksBackend};

use crate::cli::Command;
use crate::config::AuditConfig;

/// Import the genesis file at `path` and verify the result.
pub fn init<B: KvBackend>(keeper: &Keeper<B>, path: &Path) -> anyhow::Result<Pool> {
    let genesis = GenesisState::from_file(path)
        .with_context(|| format!("reading genesis from {}", path.display()))?;
    let pool = keeper.init_genesis(&genesis)?;

    // Genesis must pass every check
    check(keeper).context("imported genesis violates an invariant")?;
    Ok(pool)
}

/// Run every invariant check against the committed store.
pub fn check<B: KvBackend>(keeper: &Keeper<B>) -> anyhow::Result<()> {
    if let Err(err) = all_invariants(keeper) {
        bail!("invariant broken: {}", err);
    }
    tracing::info!("All invariants hold");
    Ok(())
}

/// Render the pool, fee pool and parameters as JSON.
pub fn show<B: KvBackend>(keeper: &Keeper<B>) -> anyhow::Result<Value> {
    let pool = keeper.get_pool()?;
    let params = keeper.get_params()?;
    let fee_pool = keeper.get_fee_pool()?;

    let reward_pools: serde_json::Map<String, Value> = fee_pool
        .validator_dist_pools()
        .iter()
        .map(|(validator, reward_pool)| Ok((hex::encode(validator), serde_json::to_value(reward_pool)?)))
        .collect::<Result<_, serde_json::Error>>()?;

    Ok(json!({
        "params": params,
        "pool": pool,
        "total_tokens": pool.total_tokens()?.to_string(),
        "bonded_ratio": pool.bonded_ratio()?.to_string(),
        "fee_pool": {
            "total_val_accum": fee_pool.total_val_accum(),
            "community_pool": fee_pool.community_pool(),
            "validator_dist_pools": reward_pools,
        },
    }))
}

/// Open the store and run the configured command.
pub fn run(config: &AuditConfig) -> anyhow::Result<()> {
    if !config.creates_store() && !config.data_dir.exists() {
        bail!("no store at {}; run `init` first", config.data_dir.display());
    }

    let backend = RocksBackend::open(&config.data_dir)
        .with_context(|| format!("opening store at {}", config.data_dir.display()))?;
    let backend = Arc::new(backend);
    let keeper = Keeper::new(Arc::clone(&backend));

    match &config.command {
        Command::Init { genesis } => {
            let pool = init(&keeper, genesis)?;
            tracing::info!(
                data_dir = %config.data_dir.display(),
                bonded = %pool.bonded_tokens(),
                "Store initialized"
            );
        }
        Command::Check => check(&keeper)?,
        Command::Show => {
            let mut view = show(&keeper)?;
            view["estimated_keys"] = json!(backend.estimate_num_keys());
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }
    Ok(())
}
