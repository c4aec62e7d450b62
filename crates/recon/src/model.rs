use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::amount::Amount;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One observation of a wallet event, as reported by the source wallet.
///
/// Every core field is optional: a field that is absent or of the wrong JSON
/// type decodes to `None` and the record later fails the filter. Fields the
/// engine does not use (block hash, wallet flags, ...) stay in `extra`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTransaction {
    pub address: Option<String>,
    pub amount: Option<Amount>,
    pub category: Option<String>,
    pub confirmations: Option<u64>,
    pub txid: Option<String>,
    pub vout: Option<u32>,
    pub extra: Map<String, Value>,
}

const CORE_FIELDS: [&str; 6] = ["address", "amount", "category", "confirmations", "txid", "vout"];

impl RawTransaction {
    /// Decode one record leniently. Non-object values produce a record with
    /// no core fields.
    pub fn from_json(value: Value) -> Self {
        let Value::Object(mut obj) = value else {
            return Self::default();
        };

        let text = |v: Option<Value>| match v {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };

        let address = text(obj.remove("address"));
        let category = text(obj.remove("category"));
        let txid = text(obj.remove("txid"));
        let amount = obj.remove("amount").as_ref().and_then(Amount::from_json);
        let confirmations = obj.remove("confirmations").as_ref().and_then(Value::as_u64);
        let vout = obj
            .remove("vout")
            .as_ref()
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok());

        Self {
            address,
            amount,
            category,
            confirmations,
            txid,
            vout,
            extra: obj,
        }
    }

    /// Re-encode the record, core fields first, for durable storage.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        if let Some(ref a) = self.address {
            obj.insert("address".into(), Value::String(a.clone()));
        }
        if let Some(a) = self.amount {
            obj.insert("amount".into(), Value::String(a.to_string()));
        }
        if let Some(ref c) = self.category {
            obj.insert("category".into(), Value::String(c.clone()));
        }
        if let Some(c) = self.confirmations {
            obj.insert("confirmations".into(), Value::from(c));
        }
        if let Some(ref t) = self.txid {
            obj.insert("txid".into(), Value::String(t.clone()));
        }
        if let Some(v) = self.vout {
            obj.insert("vout".into(), Value::from(v));
        }
        for (k, v) in &self.extra {
            if !CORE_FIELDS.contains(&k.as_str()) {
                obj.insert(k.clone(), v.clone());
            }
        }
        Value::Object(obj)
    }

    pub fn key(&self) -> Option<DepositKey> {
        Some(DepositKey {
            txid: self.txid.clone()?,
            vout: self.vout?,
        })
    }
}

/// A distinct transaction output: `(txid, vout)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DepositKey {
    pub txid: String,
    pub vout: u32,
}

impl std::fmt::Display for DepositKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

// ---------------------------------------------------------------------------
// Derived deposits
// ---------------------------------------------------------------------------

/// A record that passed the filter and survived dedup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidDeposit {
    pub key: DepositKey,
    pub address: String,
    pub amount: Amount,
    pub vout: u32,
    pub confirmations: u64,
}

impl ValidDeposit {
    /// `None` when any field the deposit needs is missing.
    pub fn from_raw(raw: &RawTransaction) -> Option<Self> {
        let key = raw.key()?;
        Some(Self {
            vout: key.vout,
            key,
            address: raw.address.clone()?,
            amount: raw.amount?,
            confirmations: raw.confirmations?,
        })
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Count and summed amount of a set of deposits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub count: u64,
    pub amount: Amount,
}

impl Totals {
    /// `None` when either the count or the amount would overflow.
    pub fn checked_add(self, other: Totals) -> Option<Totals> {
        Some(Totals {
            count: self.count.checked_add(other.count)?,
            amount: self.amount.checked_add(other.amount)?,
        })
    }
}

/// Per-address row as produced by either aggregation path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressAggregate {
    pub address: String,
    pub count: u64,
    pub amount: Amount,
}

impl AddressAggregate {
    pub fn totals(&self) -> Totals {
        Totals {
            count: self.count,
            amount: self.amount,
        }
    }
}

/// Smallest and largest individual valid deposit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Extremes {
    pub min: Amount,
    pub max: Amount,
}

/// Output of the aggregator, whichever path computed it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Aggregation {
    pub by_address: BTreeMap<String, Totals>,
    pub extremes: Extremes,
}

impl Aggregation {
    pub fn rows(&self) -> Vec<AddressAggregate> {
        self.by_address
            .iter()
            .map(|(address, t)| AddressAggregate {
                address: address.clone(),
                count: t.count,
                amount: t.amount,
            })
            .collect()
    }

    /// Grand total over every address, `None` if it leaves the `i64` range.
    pub fn total(&self) -> Option<Totals> {
        self.by_address
            .values()
            .try_fold(Totals::default(), |acc, t| acc.checked_add(*t))
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerTotals {
    pub name: String,
    pub count: u64,
    pub amount: Amount,
}

/// Reconciled view: one entry per roster name in roster order, the
/// unreferenced bucket, and the global extremes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledSummary {
    pub customers: Vec<CustomerTotals>,
    pub unreferenced: Totals,
    pub extremes: Extremes,
}

impl ReconciledSummary {
    pub fn customer(&self, name: &str) -> Option<&CustomerTotals> {
        self.customers.iter().find(|c| c.name == name)
    }
}

// ---------------------------------------------------------------------------
// Run output
// ---------------------------------------------------------------------------

/// Record counts at each pipeline stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub records: usize,
    pub matched: usize,
    pub duplicates: usize,
    pub deposits: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub config_name: String,
    pub engine: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: RunMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<PipelineStats>,
    pub aggregates: Vec<AddressAggregate>,
    pub summary: ReconciledSummary,
}
