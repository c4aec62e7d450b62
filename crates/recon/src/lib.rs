//! `txrecon`: wallet deposit reconciliation engine.
//!
//! Pure engine crate: receives decoded transaction records, returns
//! per-address aggregates and a customer-reconciled summary. Storage is a
//! trait; no CLI or file IO here.

pub mod aggregate;
pub mod amount;
pub mod config;
pub mod dedup;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod model;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod roster;
pub mod storage;

pub use amount::Amount;
pub use config::ReconConfig;
pub use engine::{run, run_with_store, Engine};
pub use error::ReconError;
pub use filter::{AmountFloor, DepositPolicy};
pub use model::{RawTransaction, ReconResult, ReconciledSummary};
pub use pipeline::{PipelineSpec, Predicate, ResultRow};
pub use roster::CustomerRoster;
pub use storage::DepositStore;
