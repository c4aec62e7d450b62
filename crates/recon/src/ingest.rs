//! Batch decoding. The engine consumes decoded records; reading files is the
//! caller's business.

use serde_json::Value;

use crate::error::ReconError;
use crate::model::RawTransaction;

/// One decoded batch document.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Where the batch came from (usually a file path), for messages.
    pub source: String,
    /// Block hash the wallet listed up to, when the document carries one.
    pub lastblock: Option<String>,
    pub records: Vec<RawTransaction>,
}

/// Decode a wallet export: either `{"transactions": [...], "lastblock": ..}`
/// or a bare array of records.
///
/// Only document-level problems are errors. Individual records with missing
/// or mistyped fields decode anyway and fail the filter later.
pub fn parse_batch(source: &str, json: &str) -> Result<Batch, ReconError> {
    let doc: Value = serde_json::from_str(json).map_err(|e| ReconError::BatchParse {
        source: source.into(),
        message: e.to_string(),
    })?;

    let (items, lastblock) = match doc {
        Value::Array(items) => (items, None),
        Value::Object(mut obj) => {
            let lastblock = match obj.remove("lastblock") {
                Some(Value::String(s)) => Some(s),
                _ => None,
            };
            match obj.remove("transactions") {
                Some(Value::Array(items)) => (items, lastblock),
                Some(_) => {
                    return Err(ReconError::BatchParse {
                        source: source.into(),
                        message: "'transactions' is not an array".into(),
                    })
                }
                None => {
                    return Err(ReconError::BatchParse {
                        source: source.into(),
                        message: "missing 'transactions' array".into(),
                    })
                }
            }
        }
        _ => {
            return Err(ReconError::BatchParse {
                source: source.into(),
                message: "expected an object or an array".into(),
            })
        }
    };

    let records: Vec<RawTransaction> = items.into_iter().map(RawTransaction::from_json).collect();
    log::debug!("batch {source}: {} records", records.len());

    Ok(Batch {
        source: source.into(),
        lastblock,
        records,
    })
}

/// Concatenate batches in the order given. Dedup keeps first occurrences, so
/// this order decides which observation of a repeated output wins.
pub fn concat_batches<I>(batches: I) -> Vec<RawTransaction>
where
    I: IntoIterator<Item = Batch>,
{
    batches.into_iter().flat_map(|b| b.records).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;

    #[test]
    fn wallet_document() {
        let json = r#"{
            "transactions": [
                {"txid": "a", "vout": 0, "amount": 1.5, "confirmations": 7,
                 "category": "receive", "address": "X"},
                {"txid": "b", "vout": 1, "amount": "oops"}
            ],
            "lastblock": "4f66"
        }"#;
        let batch = parse_batch("t1.json", json).unwrap();
        assert_eq!(batch.lastblock.as_deref(), Some("4f66"));
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[0].amount, Some(Amount::from_sats(150_000_000)));
        assert_eq!(batch.records[1].amount, None);
    }

    #[test]
    fn bare_array() {
        let batch = parse_batch("arr", r#"[{"txid": "a"}]"#).unwrap();
        assert_eq!(batch.records.len(), 1);
        assert!(batch.lastblock.is_none());
    }

    #[test]
    fn document_errors() {
        let err = parse_batch("bad.json", "{").unwrap_err();
        assert!(err.to_string().starts_with("batch 'bad.json':"));
        assert!(parse_batch("x", r#"{"lastblock": "z"}"#).is_err());
        assert!(parse_batch("x", r#"{"transactions": 3}"#).is_err());
        assert!(parse_batch("x", "42").is_err());
    }

    #[test]
    fn concat_keeps_batch_order() {
        let first = parse_batch("1", r#"[{"txid": "a"}, {"txid": "b"}]"#).unwrap();
        let second = parse_batch("2", r#"[{"txid": "c"}]"#).unwrap();
        let txids: Vec<_> = concat_batches(vec![first, second])
            .into_iter()
            .filter_map(|r| r.txid)
            .collect();
        assert_eq!(txids, vec!["a", "b", "c"]);
    }
}
