//! `txrecon-store`: SQLite storage for the deposit pipeline.
//!
//! Records are appended in arrival order; aggregation runs as generated SQL
//! built from the same [`txrecon::PipelineSpec`] the in-memory path uses.

pub mod connect;
pub mod error;
pub mod sql;
pub mod sqlite;

pub use connect::{connect_with_retry, RetryPolicy};
pub use error::StoreError;
pub use sqlite::SqliteStore;
