use crate::aggregate::aggregate_deposits;
use crate::config::ReconConfig;
use crate::dedup::dedup_first;
use crate::error::ReconError;
use crate::filter::{filter_records, DepositPolicy};
use crate::model::{Aggregation, PipelineStats, RawTransaction, ReconResult, RunMeta};
use crate::pipeline::PipelineSpec;
use crate::reconcile::reconcile;
use crate::roster::CustomerRoster;
use crate::storage::{aggregate_with_store, DepositStore};

/// Which aggregation path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Memory,
    Store,
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Store => write!(f, "store"),
        }
    }
}

/// Filter, dedup and aggregate `records` in memory.
pub fn aggregate_in_memory(
    policy: &DepositPolicy,
    records: &[RawTransaction],
) -> Result<(Aggregation, PipelineStats), ReconError> {
    let spec = PipelineSpec::by_address(policy);
    let matched = filter_records(&spec.filter, records);
    let dedup = dedup_first(matched.iter().copied());
    let aggregation = aggregate_deposits(&dedup.deposits)?;

    let stats = PipelineStats {
        records: records.len(),
        matched: matched.len(),
        duplicates: dedup.duplicates,
        deposits: dedup.deposits.len(),
    };
    log::debug!(
        "in-memory pipeline: {} records, {} matched, {} duplicates dropped, {} deposits, {} addresses",
        stats.records,
        stats.matched,
        stats.duplicates,
        stats.deposits,
        aggregation.by_address.len(),
    );

    Ok((aggregation, stats))
}

/// Run the full pipeline in memory and reconcile against the config's roster.
pub fn run(config: &ReconConfig, records: &[RawTransaction]) -> Result<ReconResult, ReconError> {
    let roster = config.roster()?;
    let (aggregation, stats) = aggregate_in_memory(&config.policy, records)?;
    finish(config, Engine::Memory, &roster, aggregation, Some(stats))
}

/// Aggregate through `store` (records must already be inserted) and
/// reconcile against the config's roster.
pub fn run_with_store<S: DepositStore>(
    config: &ReconConfig,
    store: &S,
) -> Result<ReconResult, ReconError> {
    let roster = config.roster()?;
    let aggregation = aggregate_with_store(store, &config.policy)?;
    log::debug!(
        "store pipeline: {} addresses, {} deposits",
        aggregation.by_address.len(),
        aggregation.by_address.values().map(|t| t.count).sum::<u64>(),
    );
    finish(config, Engine::Store, &roster, aggregation, None)
}

fn finish(
    config: &ReconConfig,
    engine: Engine,
    roster: &CustomerRoster,
    aggregation: Aggregation,
    stats: Option<PipelineStats>,
) -> Result<ReconResult, ReconError> {
    let summary = reconcile(&aggregation, roster)?;
    Ok(ReconResult {
        meta: RunMeta {
            config_name: config.name.clone(),
            engine: engine.to_string(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        stats,
        aggregates: aggregation.rows(),
        summary,
    })
}
