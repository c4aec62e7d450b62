use std::collections::HashMap;

use crate::error::ReconError;
use crate::model::{Aggregation, CustomerTotals, ReconciledSummary, Totals};
use crate::roster::CustomerRoster;

/// Attribute each address aggregate to its roster customer, or to the
/// unreferenced bucket when the address is unknown.
///
/// Every roster name appears in the output, in roster order, with zero
/// totals when nothing was deposited for it.
pub fn reconcile(
    aggregation: &Aggregation,
    roster: &CustomerRoster,
) -> Result<ReconciledSummary, ReconError> {
    let mut per_customer: HashMap<&str, Totals> = HashMap::new();
    let mut unreferenced = Totals::default();

    for (address, totals) in &aggregation.by_address {
        match roster.name_for(address) {
            Some(name) => {
                let bucket = per_customer.entry(name).or_default();
                *bucket = bucket.checked_add(*totals).ok_or_else(|| {
                    ReconError::AmountOverflow(format!("deposits for customer '{name}'"))
                })?;
            }
            None => {
                unreferenced = unreferenced.checked_add(*totals).ok_or_else(|| {
                    ReconError::AmountOverflow("deposits without reference".into())
                })?;
            }
        }
    }

    let customers = roster
        .names()
        .iter()
        .map(|name| {
            let t = per_customer.get(name.as_str()).copied().unwrap_or_default();
            CustomerTotals {
                name: name.clone(),
                count: t.count,
                amount: t.amount,
            }
        })
        .collect();

    Ok(ReconciledSummary {
        customers,
        unreferenced,
        extremes: aggregation.extremes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;
    use crate::model::Extremes;

    fn totals(count: u64, sats: i64) -> Totals {
        Totals {
            count,
            amount: Amount::from_sats(sats),
        }
    }

    fn aggregation(rows: &[(&str, u64, i64)]) -> Aggregation {
        let mut agg = Aggregation::default();
        for (addr, count, sats) in rows {
            agg.by_address.insert((*addr).into(), totals(*count, *sats));
        }
        agg
    }

    #[test]
    fn known_and_unreferenced() {
        let roster = CustomerRoster::new([("Alice", "X")]).unwrap();
        let agg = aggregation(&[("X", 2, 15), ("Z", 1, 2)]);
        let summary = reconcile(&agg, &roster).unwrap();

        let alice = summary.customer("Alice").unwrap();
        assert_eq!((alice.count, alice.amount), (2, Amount::from_sats(15)));
        assert_eq!(summary.unreferenced, totals(1, 2));
    }

    #[test]
    fn absent_customers_reported_as_zero() {
        let roster = CustomerRoster::new([("Alice", "X"), ("Bob", "Y")]).unwrap();
        let summary = reconcile(&Aggregation::default(), &roster).unwrap();

        assert_eq!(summary.customers.len(), 2);
        assert_eq!(summary.customers[0].name, "Alice");
        assert_eq!(summary.customers[1].name, "Bob");
        for c in &summary.customers {
            assert_eq!((c.count, c.amount), (0, Amount::ZERO));
        }
        assert_eq!(summary.unreferenced, Totals::default());
        assert_eq!(summary.extremes, Extremes::default());
    }

    #[test]
    fn roster_order_not_address_order() {
        let roster = CustomerRoster::new([("Zed", "a"), ("Amy", "z")]).unwrap();
        let agg = aggregation(&[("a", 1, 1), ("z", 1, 1)]);
        let names: Vec<_> = reconcile(&agg, &roster)
            .unwrap()
            .customers
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Zed", "Amy"]);
    }

    #[test]
    fn partition_preserves_totals() {
        let roster = CustomerRoster::new([("A", "a"), ("B", "b")]).unwrap();
        let agg = aggregation(&[("a", 3, 30), ("b", 1, -5), ("c", 2, 7), ("d", 4, 1)]);
        let summary = reconcile(&agg, &roster).unwrap();

        let mut attributed = summary.unreferenced;
        for c in &summary.customers {
            attributed = attributed.checked_add(totals(c.count, c.amount.sats())).unwrap();
        }
        assert_eq!(Some(attributed), agg.total());
        assert_eq!(summary.unreferenced, totals(6, 8));
    }

    #[test]
    fn extremes_pass_through() {
        let mut agg = aggregation(&[("a", 1, 4)]);
        agg.extremes = Extremes {
            min: Amount::from_sats(4),
            max: Amount::from_sats(4),
        };
        let summary = reconcile(&agg, &CustomerRoster::default()).unwrap();
        assert_eq!(summary.extremes, agg.extremes);
        assert!(summary.customers.is_empty());
    }

    #[test]
    fn bucket_overflow_is_an_error() {
        let big = Amount::parse("50000000000").unwrap().sats();
        let agg = aggregation(&[("a", 1, big), ("b", 1, big), ("c", 1, big), ("d", 1, big)]);
        let roster = CustomerRoster::new([("A", "a"), ("B", "b")]).unwrap();

        let err = reconcile(&agg, &roster).unwrap_err();
        assert_eq!(err.to_string(), "amount overflow: deposits without reference");

        let one_name = CustomerRoster::new([("A", "a")]).unwrap();
        let agg = aggregation(&[("a", 1, big)]);
        assert!(reconcile(&agg, &one_name).is_ok());
    }
}
