use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::model::RawTransaction;

/// A transaction observed with more than one output index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiOutputTx {
    pub txid: String,
    pub vouts: Vec<u32>,
}

/// Transactions that pay several outputs to the wallet. Deduplicating on
/// `txid` alone would wrongly collapse these; listed in order of first
/// appearance, with their distinct `vout`s ascending.
pub fn multi_output_txids(records: &[RawTransaction]) -> Vec<MultiOutputTx> {
    let mut order: Vec<&str> = Vec::new();
    let mut vouts: HashMap<&str, BTreeSet<u32>> = HashMap::new();

    for raw in records {
        let (Some(txid), Some(vout)) = (raw.txid.as_deref(), raw.vout) else {
            continue;
        };
        let set = vouts.entry(txid).or_insert_with(|| {
            order.push(txid);
            BTreeSet::new()
        });
        set.insert(vout);
    }

    order
        .into_iter()
        .filter_map(|txid| {
            let set = vouts.get(txid)?;
            (set.len() > 1).then(|| MultiOutputTx {
                txid: txid.to_string(),
                vouts: set.iter().copied().collect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(txid: &str, vout: u32) -> RawTransaction {
        RawTransaction {
            txid: Some(txid.into()),
            vout: Some(vout),
            ..RawTransaction::default()
        }
    }

    #[test]
    fn reports_txids_with_several_outputs() {
        let records = vec![tx("b", 1), tx("a", 0), tx("b", 0), tx("a", 0), tx("c", 3), tx("b", 1)];
        let found = multi_output_txids(&records);
        assert_eq!(found, vec![MultiOutputTx { txid: "b".into(), vouts: vec![0, 1] }]);
    }

    #[test]
    fn ignores_records_without_key() {
        let mut r = tx("a", 0);
        r.vout = None;
        assert!(multi_output_txids(&[r, tx("a", 1)]).is_empty());
    }
}
