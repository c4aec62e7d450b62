//! Declarative description of the deposit pipeline.
//!
//! The filter is an expression tree rather than a closure so the same value
//! can be evaluated against in-memory records and rendered into a storage
//! query. Dedup on `(txid, vout)` and grouping by `address` are fixed stages
//! shared by every [`PipelineSpec`].
//!
//! Predicates contain no negation. Under that restriction treating a missing
//! field as "comparison is false" is equivalent to SQL's three-valued logic
//! inside a `WHERE` clause, which keeps both evaluations in lockstep.

use crate::filter::DepositPolicy;
use crate::model::{AddressAggregate, Extremes, RawTransaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Txid,
    Vout,
    Address,
    Amount,
    Category,
    Confirmations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
}

impl Field {
    pub fn kind(self) -> FieldKind {
        match self {
            Self::Txid | Self::Address | Self::Category => FieldKind::Text,
            Self::Vout | Self::Amount | Self::Confirmations => FieldKind::Integer,
        }
    }

    /// Record field name, as it appears in batch JSON.
    pub fn name(self) -> &'static str {
        match self {
            Self::Txid => "txid",
            Self::Vout => "vout",
            Self::Address => "address",
            Self::Amount => "amount",
            Self::Category => "category",
            Self::Confirmations => "confirmations",
        }
    }

    fn text(self, raw: &RawTransaction) -> Option<&str> {
        match self {
            Self::Txid => raw.txid.as_deref(),
            Self::Address => raw.address.as_deref(),
            Self::Category => raw.category.as_deref(),
            _ => None,
        }
    }

    /// Integer view of a numeric field. Amounts are satoshis; confirmation
    /// depths beyond `i64::MAX` saturate, matching how they are stored.
    pub fn integer(self, raw: &RawTransaction) -> Option<i64> {
        match self {
            Self::Vout => raw.vout.map(i64::from),
            Self::Amount => raw.amount.map(|a| a.sats()),
            Self::Confirmations => raw.confirmations.map(saturate),
            _ => None,
        }
    }

    fn is_present(self, raw: &RawTransaction) -> bool {
        match self.kind() {
            FieldKind::Text => self.text(raw).is_some(),
            FieldKind::Integer => self.integer(raw).is_some(),
        }
    }
}

pub fn saturate(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Filter expression over a single record.
///
/// Integer comparisons against a text field (and vice versa) are always
/// false in every evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Present(Field),
    AtLeast(Field, i64),
    Above(Field, i64),
    Equals(Field, String),
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
}

impl Predicate {
    pub fn eval(&self, raw: &RawTransaction) -> bool {
        match self {
            Self::Present(field) => field.is_present(raw),
            Self::AtLeast(field, bound) => field.integer(raw).is_some_and(|v| v >= *bound),
            Self::Above(field, bound) => field.integer(raw).is_some_and(|v| v > *bound),
            Self::Equals(field, expected) => field.text(raw) == Some(expected.as_str()),
            Self::All(parts) => parts.iter().all(|p| p.eval(raw)),
            Self::Any(parts) => parts.iter().any(|p| p.eval(raw)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutput {
    /// match → first per (txid, vout) → group by address → project
    /// (address, amount, count)
    ByAddress,
    /// match → first per (txid, vout) → global min/max amount
    Extremes,
}

/// One aggregation request: which records match, and what to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSpec {
    pub filter: Predicate,
    pub output: PipelineOutput,
}

impl PipelineSpec {
    pub fn by_address(policy: &DepositPolicy) -> Self {
        Self {
            filter: policy.predicate(),
            output: PipelineOutput::ByAddress,
        }
    }

    pub fn extremes(policy: &DepositPolicy) -> Self {
        Self {
            filter: policy.predicate(),
            output: PipelineOutput::Extremes,
        }
    }
}

/// A row returned by a storage-side pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultRow {
    Address(AddressAggregate),
    Extremes(Extremes),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;

    fn record() -> RawTransaction {
        RawTransaction {
            address: Some("X".into()),
            amount: Some(Amount::from_sats(-5)),
            category: Some("send".into()),
            confirmations: Some(u64::MAX),
            txid: Some("t".into()),
            vout: Some(2),
            ..RawTransaction::default()
        }
    }

    #[test]
    fn comparisons() {
        let r = record();
        assert!(Predicate::AtLeast(Field::Vout, 2).eval(&r));
        assert!(!Predicate::Above(Field::Vout, 2).eval(&r));
        assert!(!Predicate::AtLeast(Field::Amount, 0).eval(&r));
        assert!(Predicate::AtLeast(Field::Confirmations, i64::MAX).eval(&r));
        assert!(Predicate::Equals(Field::Category, "send".into()).eval(&r));
    }

    #[test]
    fn kind_mismatch_is_false() {
        let r = record();
        assert!(!Predicate::AtLeast(Field::Txid, 0).eval(&r));
        assert!(!Predicate::Equals(Field::Vout, "2".into()).eval(&r));
    }

    #[test]
    fn missing_field_fails_comparison() {
        let r = RawTransaction::default();
        assert!(!Predicate::AtLeast(Field::Amount, i64::MIN).eval(&r));
        assert!(!Predicate::Present(Field::Category).eval(&r));
        assert!(Predicate::Any(vec![
            Predicate::Present(Field::Txid),
            Predicate::All(vec![]),
        ])
        .eval(&r));
    }
}
