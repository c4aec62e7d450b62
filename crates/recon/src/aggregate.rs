use std::collections::BTreeMap;

use crate::error::ReconError;
use crate::model::{Aggregation, Extremes, Totals, ValidDeposit};
use crate::pipeline::ResultRow;

/// Group deposits by address, sum amounts, count, and track global extremes.
///
/// Fails with [`ReconError::AmountOverflow`] when an address total leaves
/// the `i64` satoshi range.
pub fn aggregate_deposits(deposits: &[ValidDeposit]) -> Result<Aggregation, ReconError> {
    let mut groups: BTreeMap<String, Totals> = BTreeMap::new();
    let mut extremes: Option<Extremes> = None;

    for dep in deposits {
        let entry = groups.entry(dep.address.clone()).or_default();
        let one = Totals { count: 1, amount: dep.amount };
        *entry = entry.checked_add(one).ok_or_else(|| {
            ReconError::AmountOverflow(format!("deposits to {}", dep.address))
        })?;

        extremes = Some(match extremes {
            None => Extremes {
                min: dep.amount,
                max: dep.amount,
            },
            Some(e) => Extremes {
                min: e.min.min(dep.amount),
                max: e.max.max(dep.amount),
            },
        });
    }

    Ok(Aggregation {
        by_address: groups,
        extremes: extremes.unwrap_or_default(),
    })
}

/// Assemble an [`Aggregation`] from the rows of the by-address and extremes
/// pipelines. No extremes row means no deposits, i.e. `(0, 0)`.
pub fn from_result_rows(
    address_rows: Vec<ResultRow>,
    extremes_rows: Vec<ResultRow>,
) -> Result<Aggregation, ReconError> {
    let mut by_address = BTreeMap::new();
    for row in address_rows {
        match row {
            ResultRow::Address(a) => {
                let totals = a.totals();
                if by_address.insert(a.address.clone(), totals).is_some() {
                    return Err(ReconError::StoreRows(format!(
                        "address {} returned twice",
                        a.address
                    )));
                }
            }
            ResultRow::Extremes(_) => {
                return Err(ReconError::StoreRows("extremes row in by-address result".into()))
            }
        }
    }

    let mut extremes = None;
    for row in extremes_rows {
        match row {
            ResultRow::Extremes(e) if extremes.is_none() => extremes = Some(e),
            ResultRow::Extremes(_) => {
                return Err(ReconError::StoreRows("more than one extremes row".into()))
            }
            ResultRow::Address(_) => {
                return Err(ReconError::StoreRows("address row in extremes result".into()))
            }
        }
    }

    Ok(Aggregation {
        by_address,
        extremes: extremes.unwrap_or_default(),
    })
}
