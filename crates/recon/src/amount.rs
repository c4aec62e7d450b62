use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

/// Satoshis per whole coin. Amounts carry exactly eight decimal places.
pub const SATS_PER_COIN: i64 = 100_000_000;

const DECIMALS: usize = 8;

/// Fixed-point currency amount stored as signed satoshis.
///
/// Summation and comparison never touch binary floating point, so the
/// in-memory fold and the SQL aggregation see the same integers. There is
/// no `+`: sums go through [`Amount::checked_add`] so an out-of-range total
/// is an error on both paths rather than a wrap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_sats(sats: i64) -> Self {
        Self(sats)
    }

    pub const fn sats(self) -> i64 {
        self.0
    }

    /// Parse a plain decimal string ("12", "-0.5", "0.00010000").
    ///
    /// Returns `None` for empty input, exponents, more than eight decimal
    /// places, or values outside the `i64` satoshi range.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (whole_str, frac_str) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole_str.is_empty() && frac_str.is_empty() {
            return None;
        }
        if !whole_str.bytes().all(|b| b.is_ascii_digit())
            || !frac_str.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        if frac_str.len() > DECIMALS {
            return None;
        }

        let whole: i64 = if whole_str.is_empty() { 0 } else { whole_str.parse().ok()? };
        let frac: i64 = if frac_str.is_empty() {
            0
        } else {
            format!("{:0<width$}", frac_str, width = DECIMALS).parse().ok()?
        };

        let magnitude = whole.checked_mul(SATS_PER_COIN)?.checked_add(frac)?;
        Some(Self(if negative { -magnitude } else { magnitude }))
    }

    /// Read an amount from a decoded JSON value.
    ///
    /// Numbers are accepted as integers or as floats rendered through their
    /// shortest round-trip decimal form; strings go through [`Amount::parse`].
    /// Anything else is `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    i.checked_mul(SATS_PER_COIN).map(Self)
                } else if n.is_u64() {
                    None
                } else {
                    let f = n.as_f64()?;
                    if !f.is_finite() {
                        return None;
                    }
                    Self::parse(&format!("{f}"))
                }
            }
            Value::String(s) => Self::parse(s),
            _ => None,
        }
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}

/// Plain decimal, trailing zeros trimmed: `12.5`, `0`, `-0.0001`.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.unsigned_abs();
        let scale = SATS_PER_COIN.unsigned_abs();
        let whole = magnitude / scale;
        let frac = magnitude % scale;
        let sign = if self.0 < 0 { "-" } else { "" };

        if frac == 0 {
            write!(f, "{sign}{whole}")
        } else {
            let frac = format!("{:0width$}", frac, width = DECIMALS);
            write!(f, "{sign}{whole}.{}", frac.trim_end_matches('0'))
        }
    }
}

/// Serialized as a decimal string so JSON consumers never see a rounded float.
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_plain_decimals() {
        assert_eq!(Amount::parse("12"), Some(Amount::from_sats(1_200_000_000)));
        assert_eq!(Amount::parse("0.5"), Some(Amount::from_sats(50_000_000)));
        assert_eq!(Amount::parse("-0.0001"), Some(Amount::from_sats(-10_000)));
        assert_eq!(Amount::parse("0.00000001"), Some(Amount::from_sats(1)));
        assert_eq!(Amount::parse(".25"), Some(Amount::from_sats(25_000_000)));
        assert_eq!(Amount::parse("3."), Some(Amount::from_sats(300_000_000)));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(Amount::parse(""), None);
        assert_eq!(Amount::parse("-"), None);
        assert_eq!(Amount::parse("."), None);
        assert_eq!(Amount::parse("1e-3"), None);
        assert_eq!(Amount::parse("abc"), None);
        assert_eq!(Amount::parse("1.000000001"), None);
        assert_eq!(Amount::parse("99999999999999999999"), None);
    }

    #[test]
    fn json_numbers_are_exact() {
        assert_eq!(Amount::from_json(&json!(10)), Some(Amount::from_sats(1_000_000_000)));
        assert_eq!(Amount::from_json(&json!(0.1)), Some(Amount::from_sats(10_000_000)));
        assert_eq!(Amount::from_json(&json!(-2.5)), Some(Amount::from_sats(-250_000_000)));
        assert_eq!(Amount::from_json(&json!(0.00000001)), Some(Amount::from_sats(1)));
        assert_eq!(Amount::from_json(&json!("7.25")), Some(Amount::from_sats(725_000_000)));
        assert_eq!(Amount::from_json(&json!(null)), None);
        assert_eq!(Amount::from_json(&json!(true)), None);
        assert_eq!(Amount::from_json(&json!(u64::MAX)), None);
    }

    #[test]
    fn decimal_sums_do_not_drift() {
        // 0.1 + 0.2 in binary floating point is 0.30000000000000004
        let a = Amount::from_json(&json!(0.1)).unwrap();
        let b = Amount::from_json(&json!(0.2)).unwrap();
        let total = a.checked_add(b).unwrap();
        assert_eq!(total, Amount::parse("0.3").unwrap());
        assert_eq!(total.to_string(), "0.3");
    }

    #[test]
    fn checked_add_stops_at_i64_range() {
        let big = Amount::parse("50000000000").unwrap();
        assert_eq!(big.checked_add(big), None);
        assert_eq!(
            Amount::from_sats(i64::MIN).checked_add(Amount::from_sats(-1)),
            None
        );
        assert_eq!(
            big.checked_add(Amount::from_sats(-1)),
            Some(Amount::from_sats(5_000_000_000_000_000_000 - 1))
        );
    }

    #[test]
    fn display_trims_trailing_zeros() {
        assert_eq!(Amount::from_sats(0).to_string(), "0");
        assert_eq!(Amount::from_sats(1_250_000_000).to_string(), "12.5");
        assert_eq!(Amount::from_sats(-10_000).to_string(), "-0.0001");
        assert_eq!(Amount::from_sats(1).to_string(), "0.00000001");
        assert_eq!(Amount::from_sats(i64::MIN).to_string(), "-92233720368.54775808");
    }

    #[test]
    fn serializes_as_string() {
        let s = serde_json::to_string(&Amount::from_sats(150_000_000)).unwrap();
        assert_eq!(s, "\"1.5\"");
    }
}
