// Deposit store backed by SQLite

use std::path::Path;

use rusqlite::{params, params_from_iter, Connection};
use txrecon::model::{AddressAggregate, Extremes};
use txrecon::pipeline::{saturate, PipelineOutput};
use txrecon::{Amount, DepositStore, PipelineSpec, RawTransaction, ResultRow};

use crate::error::StoreError;
use crate::sql;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS transactions (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,  -- arrival order; earliest row wins dedup
    txid TEXT,
    vout INTEGER,
    address TEXT,
    amount_sats INTEGER,                    -- 1 coin = 100000000
    category TEXT,
    confirmations INTEGER,
    raw TEXT NOT NULL                       -- full record as received
);

CREATE INDEX IF NOT EXISTS transactions_by_output ON transactions (txid, vout, seq);
"#;

/// Wallet records in one SQLite table, aggregated with generated SQL.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Number of stored records, duplicates included.
    pub fn len(&self) -> Result<usize, StoreError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        to_count(n).map(|n| n as usize)
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Stored records in arrival order, decoded from the retained JSON.
    pub fn records(&self) -> Result<Vec<RawTransaction>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT raw FROM transactions ORDER BY seq")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut out = Vec::new();
        for raw in rows {
            out.push(RawTransaction::from_json(serde_json::from_str(&raw?)?));
        }
        Ok(out)
    }

    fn address_rows(&self, query: &sql::Query) -> Result<Vec<ResultRow>, StoreError> {
        let mut stmt = self.conn.prepare(&query.sql)?;
        let rows = stmt.query_map(params_from_iter(query.params.iter()), |row| {
            let address: String = row.get(0)?;
            let sum: i64 = row.get(1)?;
            let count: i64 = row.get(2)?;
            Ok((address, sum, count))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (address, sum, count) = row?;
            out.push(ResultRow::Address(AddressAggregate {
                address,
                count: to_count(count)?,
                amount: Amount::from_sats(sum),
            }));
        }
        Ok(out)
    }

    fn extremes_rows(&self, query: &sql::Query) -> Result<Vec<ResultRow>, StoreError> {
        let (min, max, count): (Option<i64>, Option<i64>, i64) = self.conn.query_row(
            &query.sql,
            params_from_iter(query.params.iter()),
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        match (min, max) {
            _ if count == 0 => Ok(Vec::new()),
            (Some(min), Some(max)) => Ok(vec![ResultRow::Extremes(Extremes {
                min: Amount::from_sats(min),
                max: Amount::from_sats(max),
            })]),
            _ => Err(StoreError::Decode(format!(
                "{count} deposits matched but amount extremes are NULL"
            ))),
        }
    }
}

impl DepositStore for SqliteStore {
    type Error = StoreError;

    /// Append `records` in order, all or nothing.
    fn insert_batch(&mut self, records: &[RawTransaction]) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO transactions \
                 (txid, vout, address, amount_sats, category, confirmations, raw) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for record in records {
                let raw = serde_json::to_string(&record.to_json())?;
                stmt.execute(params![
                    record.txid,
                    record.vout,
                    record.address,
                    record.amount.map(Amount::sats),
                    record.category,
                    record.confirmations.map(saturate),
                    raw,
                ])?;
            }
        }
        tx.commit()?;
        log::debug!("stored {} records", records.len());
        Ok(())
    }

    fn aggregate(&self, spec: &PipelineSpec) -> Result<Vec<ResultRow>, StoreError> {
        let query = sql::render(spec);
        match spec.output {
            PipelineOutput::ByAddress => self.address_rows(&query),
            PipelineOutput::Extremes => self.extremes_rows(&query),
        }
    }
}

fn to_count(n: i64) -> Result<u64, StoreError> {
    u64::try_from(n).map_err(|_| StoreError::Decode(format!("negative count {n}")))
}
