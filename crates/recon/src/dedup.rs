use std::collections::HashSet;

use crate::model::{DepositKey, RawTransaction, ValidDeposit};

#[derive(Debug, Default)]
pub struct DedupOutput {
    pub deposits: Vec<ValidDeposit>,
    /// Later observations of a key already seen, dropped whole.
    pub duplicates: usize,
}

/// Keep the first occurrence of each `(txid, vout)`, in input order.
///
/// Input is expected to be filtered already. A record still missing a field
/// the deposit needs is skipped without counting as a duplicate.
pub fn dedup_first<'a, I>(records: I) -> DedupOutput
where
    I: IntoIterator<Item = &'a RawTransaction>,
{
    let mut seen: HashSet<DepositKey> = HashSet::new();
    let mut out = DedupOutput::default();

    for raw in records {
        let Some(deposit) = ValidDeposit::from_raw(raw) else {
            continue;
        };
        if seen.contains(&deposit.key) {
            out.duplicates += 1;
            continue;
        }
        seen.insert(deposit.key.clone());
        out.deposits.push(deposit);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;

    fn tx(txid: &str, vout: u32, address: &str, amount: i64) -> RawTransaction {
        RawTransaction {
            address: Some(address.into()),
            amount: Some(Amount::from_sats(amount)),
            category: Some("receive".into()),
            confirmations: Some(6),
            txid: Some(txid.into()),
            vout: Some(vout),
            ..RawTransaction::default()
        }
    }

    #[test]
    fn first_occurrence_wins() {
        let records = vec![
            tx("a", 0, "X", 10),
            tx("a", 0, "Y", 99),
            tx("a", 0, "X", 10),
        ];
        let out = dedup_first(&records);
        assert_eq!(out.deposits.len(), 1);
        assert_eq!(out.duplicates, 2);
        assert_eq!(out.deposits[0].address, "X");
        assert_eq!(out.deposits[0].amount, Amount::from_sats(10));
    }

    #[test]
    fn same_txid_different_vout_kept() {
        let records = vec![tx("a", 0, "X", 1), tx("a", 1, "X", 2), tx("b", 0, "X", 3)];
        let out = dedup_first(&records);
        assert_eq!(out.deposits.len(), 3);
        assert_eq!(out.duplicates, 0);
    }

    #[test]
    fn keyless_records_skipped() {
        let mut keyless = tx("a", 0, "X", 1);
        keyless.txid = None;
        let records = vec![keyless, tx("a", 0, "X", 5)];
        let out = dedup_first(&records);
        assert_eq!(out.deposits.len(), 1);
        assert_eq!(out.deposits[0].amount, Amount::from_sats(5));
        assert_eq!(out.duplicates, 0);
    }

    #[test]
    fn output_keeps_input_order() {
        let records = vec![tx("c", 0, "X", 1), tx("a", 0, "X", 1), tx("c", 0, "X", 1), tx("b", 0, "X", 1)];
        let keys: Vec<String> = dedup_first(&records)
            .deposits
            .iter()
            .map(|d| d.key.to_string())
            .collect();
        assert_eq!(keys, vec!["c:0", "a:0", "b:0"]);
    }
}
