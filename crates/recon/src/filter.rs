use serde::Deserialize;

use crate::model::RawTransaction;
use crate::pipeline::{saturate, Field, Predicate};

/// Lower bound on the amount clause of the deposit filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountFloor {
    /// `amount >= 0`; zero-value outputs count as deposits.
    #[default]
    NonNegative,
    /// `amount > 0`
    Positive,
}

impl std::fmt::Display for AmountFloor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonNegative => write!(f, "non_negative"),
            Self::Positive => write!(f, "positive"),
        }
    }
}

/// What counts as a deposit candidate.
///
/// A record passes when every core field is present, its confirmation depth
/// is at least `min_confirmations`, and it is either tagged
/// `receive_category` or its amount clears `amount_floor`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DepositPolicy {
    pub min_confirmations: u64,
    pub receive_category: String,
    pub amount_floor: AmountFloor,
}

impl Default for DepositPolicy {
    fn default() -> Self {
        Self {
            min_confirmations: 6,
            receive_category: "receive".into(),
            amount_floor: AmountFloor::NonNegative,
        }
    }
}

impl DepositPolicy {
    pub fn predicate(&self) -> Predicate {
        let floor = match self.amount_floor {
            AmountFloor::NonNegative => Predicate::AtLeast(Field::Amount, 0),
            AmountFloor::Positive => Predicate::Above(Field::Amount, 0),
        };

        Predicate::All(vec![
            Predicate::Present(Field::Txid),
            Predicate::Present(Field::Vout),
            Predicate::Present(Field::Address),
            Predicate::Present(Field::Amount),
            Predicate::Present(Field::Category),
            Predicate::AtLeast(Field::Confirmations, saturate(self.min_confirmations)),
            Predicate::Any(vec![
                Predicate::Equals(Field::Category, self.receive_category.clone()),
                floor,
            ]),
        ])
    }
}

/// Keep the records `filter` admits, in input order.
pub fn filter_records<'a, I>(filter: &Predicate, records: I) -> Vec<&'a RawTransaction>
where
    I: IntoIterator<Item = &'a RawTransaction>,
{
    records.into_iter().filter(|r| filter.eval(r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;

    fn tx(txid: &str, amount: i64, confirmations: u64, category: &str) -> RawTransaction {
        RawTransaction {
            address: Some("X".into()),
            amount: Some(Amount::from_sats(amount)),
            category: Some(category.into()),
            confirmations: Some(confirmations),
            txid: Some(txid.into()),
            vout: Some(0),
            ..RawTransaction::default()
        }
    }

    fn passes(policy: &DepositPolicy, raw: &RawTransaction) -> bool {
        policy.predicate().eval(raw)
    }

    #[test]
    fn confirmation_gate() {
        let p = DepositPolicy::default();
        assert!(passes(&p, &tx("a", 10, 6, "receive")));
        assert!(!passes(&p, &tx("a", 10, 5, "receive")));
    }

    #[test]
    fn receive_or_non_negative() {
        let p = DepositPolicy::default();
        // negative receive still passes through the category clause
        assert!(passes(&p, &tx("a", -10, 6, "receive")));
        assert!(passes(&p, &tx("a", 10, 6, "generate")));
        assert!(!passes(&p, &tx("a", -10, 6, "send")));
    }

    #[test]
    fn zero_amount_floor() {
        let p = DepositPolicy::default();
        assert!(passes(&p, &tx("a", 0, 6, "send")));

        let strict = DepositPolicy {
            amount_floor: AmountFloor::Positive,
            ..DepositPolicy::default()
        };
        assert!(!passes(&strict, &tx("a", 0, 6, "send")));
        assert!(passes(&strict, &tx("a", 0, 6, "receive")));
        assert!(passes(&strict, &tx("a", 1, 6, "send")));
    }

    #[test]
    fn missing_fields_fail_closed() {
        let p = DepositPolicy::default();
        let full = tx("a", 10, 6, "receive");

        let mut r = full.clone();
        r.confirmations = None;
        assert!(!passes(&p, &r));

        // category missing but amount non-negative: still rejected
        let mut r = full.clone();
        r.category = None;
        assert!(!passes(&p, &r));

        let mut r = full.clone();
        r.txid = None;
        assert!(!passes(&p, &r));

        let mut r = full;
        r.amount = None;
        assert!(!passes(&p, &r));
    }

    #[test]
    fn filter_preserves_order() {
        let records = vec![
            tx("c", 3, 9, "receive"),
            tx("x", 3, 1, "receive"),
            tx("a", 1, 9, "receive"),
            tx("b", 2, 9, "receive"),
        ];
        let pred = DepositPolicy::default().predicate();
        let kept: Vec<_> = filter_records(&pred, &records)
            .iter()
            .map(|r| r.txid.as_deref().unwrap_or(""))
            .collect();
        assert_eq!(kept, vec!["c", "a", "b"]);
    }

    #[test]
    fn filter_is_idempotent() {
        let records = vec![
            tx("a", 3, 9, "receive"),
            tx("b", -3, 9, "send"),
            tx("c", 0, 2, "receive"),
        ];
        let pred = DepositPolicy::default().predicate();
        let once = filter_records(&pred, &records);
        let twice = filter_records(&pred, once.iter().copied());
        assert_eq!(once, twice);
    }

    #[test]
    fn policy_deserializes_with_defaults() {
        let p: DepositPolicy = toml::from_str("amount_floor = \"positive\"").unwrap();
        assert_eq!(p.min_confirmations, 6);
        assert_eq!(p.receive_category, "receive");
        assert_eq!(p.amount_floor, AmountFloor::Positive);

        assert!(toml::from_str::<DepositPolicy>("amount_floor = \"any\"").is_err());
        assert!(toml::from_str::<DepositPolicy>("min_confs = 3").is_err());
    }
}
