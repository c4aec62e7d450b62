//! Rendering of a [`PipelineSpec`] into one SQLite statement.
//!
//! Predicates become a `WHERE` clause with positional parameters. Because
//! predicates never negate, a `NULL` column (a missing field) can only make
//! a clause `NULL` or false, never true, which is exactly the in-memory
//! "missing fails the comparison" rule.

use rusqlite::types::Value;
use txrecon::pipeline::{Field, FieldKind, PipelineOutput};
use txrecon::{PipelineSpec, Predicate};

/// Column holding each record field.
pub fn column(field: Field) -> &'static str {
    match field {
        Field::Txid => "txid",
        Field::Vout => "vout",
        Field::Address => "address",
        Field::Amount => "amount_sats",
        Field::Category => "category",
        Field::Confirmations => "confirmations",
    }
}

/// A rendered statement and its bound parameters, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Render `pred` as a SQL boolean expression, appending bound values to
/// `params`.
pub fn render_predicate(pred: &Predicate, params: &mut Vec<Value>) -> String {
    match pred {
        Predicate::Present(field) => format!("{} IS NOT NULL", column(*field)),
        Predicate::AtLeast(field, bound) => compare(*field, ">=", *bound, params),
        Predicate::Above(field, bound) => compare(*field, ">", *bound, params),
        Predicate::Equals(field, expected) => {
            if field.kind() != FieldKind::Text {
                return "0".into();
            }
            params.push(Value::Text(expected.clone()));
            format!("{} = ?", column(*field))
        }
        Predicate::All(parts) => join(parts, " AND ", "1", params),
        Predicate::Any(parts) => join(parts, " OR ", "0", params),
    }
}

fn compare(field: Field, op: &str, bound: i64, params: &mut Vec<Value>) -> String {
    if field.kind() != FieldKind::Integer {
        return "0".into();
    }
    params.push(Value::Integer(bound));
    format!("{} {op} ?", column(field))
}

fn join(parts: &[Predicate], sep: &str, empty: &str, params: &mut Vec<Value>) -> String {
    if parts.is_empty() {
        return empty.into();
    }
    let rendered: Vec<String> = parts.iter().map(|p| render_predicate(p, params)).collect();
    format!("({})", rendered.join(sep))
}

/// Full statement for `spec`: filter, keep the earliest stored row per
/// `(txid, vout)`, then group by address or take the global extremes.
///
/// By-address rows are `(address, sum, count)` ordered by address. The
/// extremes statement always yields exactly one `(min, max, count)` row;
/// `count = 0` means nothing matched.
pub fn render(spec: &PipelineSpec) -> Query {
    let mut params = Vec::new();
    let filter = render_predicate(&spec.filter, &mut params);

    let projection = match spec.output {
        PipelineOutput::ByAddress => {
            "SELECT address, SUM(amount_sats), COUNT(*) FROM firsts WHERE rn = 1 \
             GROUP BY address ORDER BY address"
        }
        PipelineOutput::Extremes => {
            "SELECT MIN(amount_sats), MAX(amount_sats), COUNT(*) FROM firsts WHERE rn = 1"
        }
    };

    let sql = format!(
        "WITH matched AS (\
            SELECT seq, txid, vout, address, amount_sats FROM transactions WHERE {filter}\
         ), firsts AS (\
            SELECT address, amount_sats, \
                   ROW_NUMBER() OVER (PARTITION BY txid, vout ORDER BY seq) AS rn \
            FROM matched\
         ) {projection}"
    );

    Query { sql, params }
}

#[cfg(test)]
mod tests {
    use super::*;
    use txrecon::DepositPolicy;

    #[test]
    fn leaves_bind_parameters() {
        let mut params = Vec::new();
        let sql = render_predicate(
            &Predicate::All(vec![
                Predicate::Present(Field::Txid),
                Predicate::AtLeast(Field::Confirmations, 6),
                Predicate::Any(vec![
                    Predicate::Equals(Field::Category, "receive".into()),
                    Predicate::Above(Field::Amount, 0),
                ]),
            ]),
            &mut params,
        );
        assert_eq!(
            sql,
            "(txid IS NOT NULL AND confirmations >= ? AND (category = ? OR amount_sats > ?))"
        );
        assert_eq!(
            params,
            vec![Value::Integer(6), Value::Text("receive".into()), Value::Integer(0)]
        );
    }

    #[test]
    fn empty_groups_and_kind_mismatch() {
        let mut params = Vec::new();
        assert_eq!(render_predicate(&Predicate::All(vec![]), &mut params), "1");
        assert_eq!(render_predicate(&Predicate::Any(vec![]), &mut params), "0");
        assert_eq!(render_predicate(&Predicate::AtLeast(Field::Address, 1), &mut params), "0");
        assert_eq!(
            render_predicate(&Predicate::Equals(Field::Vout, "1".into()), &mut params),
            "0"
        );
        assert!(params.is_empty());
    }

    #[test]
    fn statement_dedups_before_grouping() {
        let q = render(&PipelineSpec::by_address(&DepositPolicy::default()));
        assert!(q.sql.contains("PARTITION BY txid, vout ORDER BY seq"));
        assert!(q.sql.ends_with("GROUP BY address ORDER BY address"));
        assert_eq!(q.params.len(), 3);

        let q = render(&PipelineSpec::extremes(&DepositPolicy::default()));
        assert!(q.sql.contains("MIN(amount_sats), MAX(amount_sats)"));
    }
}
