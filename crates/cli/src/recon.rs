//! `txrecon run | outputs | validate`

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use txrecon::diagnostics::multi_output_txids;
use txrecon::ingest::{concat_batches, parse_batch, Batch};
use txrecon::report::write_report;
use txrecon::{run, run_with_store, DepositStore, ReconConfig, ReconResult};
use txrecon_store::{connect_with_retry, RetryPolicy, SqliteStore};

use crate::exit_codes::{EXIT_BATCH_INVALID, EXIT_ENGINE_DIVERGED, EXIT_ERROR};
use crate::{CliError, EngineArg};

/// Roster used when no `--config` is given.
const DEFAULT_CONFIG: &str = include_str!("../config/customers.toml");

pub struct RunArgs {
    pub batches: Vec<PathBuf>,
    pub config: Option<PathBuf>,
    pub engine: EngineArg,
    pub db: Option<PathBuf>,
    pub connect_attempts: u32,
    pub json: bool,
    pub output: Option<PathBuf>,
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let batches = read_batches(&args.batches)?;

    let result = match args.engine {
        EngineArg::Memory => run(&config, &concat_batches(batches))?,
        EngineArg::Store => {
            let store = fill_store(args.db.as_deref(), args.connect_attempts, &batches)?;
            run_with_store(&config, &store)?
        }
        EngineArg::Both => {
            let store = fill_store(args.db.as_deref(), args.connect_attempts, &batches)?;
            // Compare over the store's full contents, which include earlier
            // runs when --db points at an existing database.
            let memory = run(&config, &store.records()?)?;
            let stored = run_with_store(&config, &store)?;
            check_agreement(&memory, &stored)?;
            memory
        }
    };

    if let Some(stats) = result.stats {
        log::info!(
            "{} records, {} matched, {} duplicates dropped, {} deposits",
            stats.records,
            stats.matched,
            stats.duplicates,
            stats.deposits,
        );
    }

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let written = if args.json {
        writeln!(out, "{json_str}")
    } else {
        write_report(&mut out, &result.summary)
    };
    written.map_err(|e| CliError::new(EXIT_ERROR, format!("cannot write report: {e}")))
}

pub fn cmd_outputs(batch_paths: Vec<PathBuf>, json: bool) -> Result<(), CliError> {
    let records = concat_batches(read_batches(&batch_paths)?);
    let found = multi_output_txids(&records);

    if json {
        let json_str = serde_json::to_string_pretty(&found)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    for tx in &found {
        let vouts: Vec<String> = tx.vouts.iter().map(u32::to_string).collect();
        println!("{} vouts={}", tx.txid, vouts.join(","));
    }
    eprintln!("{} transaction(s) with more than one output", found.len());
    Ok(())
}

pub fn cmd_validate(config_path: Option<PathBuf>) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref())?;
    println!(
        "config '{}': {} customers, min_confirmations={}, receive_category={}, amount_floor={}",
        config.name,
        config.customers.len(),
        config.policy.min_confirmations,
        config.policy.receive_category,
        config.policy.amount_floor,
    );
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    let Some(path) = path else {
        return Ok(ReconConfig::from_toml(DEFAULT_CONFIG)?);
    };
    let config_str = std::fs::read_to_string(path).map_err(|e| {
        CliError::usage(format!("cannot read config {}: {e}", path.display()))
    })?;
    let config = ReconConfig::from_toml(&config_str)?;
    log::info!("loaded config '{}' from {}", config.name, path.display());
    Ok(config)
}

/// Read and decode every batch, in argument order.
fn read_batches(paths: &[PathBuf]) -> Result<Vec<Batch>, CliError> {
    paths
        .iter()
        .map(|path| {
            let source = path.display().to_string();
            let json = std::fs::read_to_string(path).map_err(|e| {
                CliError::new(EXIT_BATCH_INVALID, format!("cannot read {source}: {e}"))
            })?;
            let batch = parse_batch(&source, &json)?;
            log::info!(
                "{source}: {} records, last block {}",
                batch.records.len(),
                batch.lastblock.as_deref().unwrap_or("none"),
            );
            Ok(batch)
        })
        .collect()
}

fn fill_store(
    db: Option<&Path>,
    connect_attempts: u32,
    batches: &[Batch],
) -> Result<SqliteStore, CliError> {
    let mut store = match db {
        Some(path) => connect_with_retry(
            path,
            RetryPolicy {
                interval: Duration::from_secs(2),
                max_attempts: (connect_attempts > 0).then_some(connect_attempts),
            },
        )?,
        None => SqliteStore::open_in_memory()?,
    };
    for batch in batches {
        store.insert_batch(&batch.records)?;
        log::debug!("inserted {} records from {}", batch.records.len(), batch.source);
    }
    Ok(store)
}

fn check_agreement(memory: &ReconResult, stored: &ReconResult) -> Result<(), CliError> {
    if memory.aggregates == stored.aggregates && memory.summary == stored.summary {
        return Ok(());
    }

    let first_diff = memory
        .aggregates
        .iter()
        .zip(stored.aggregates.iter())
        .find(|(m, s)| m != s)
        .map(|(m, s)| {
            format!(
                "{}: memory count={} sum={}, store count={} sum={}",
                m.address, m.count, m.amount, s.count, s.amount
            )
        })
        .unwrap_or_else(|| {
            format!(
                "{} addresses in memory, {} in store",
                memory.aggregates.len(),
                stored.aggregates.len()
            )
        });

    Err(CliError::new(EXIT_ENGINE_DIVERGED, "in-memory and store aggregation disagree")
        .with_hint(first_diff))
}
