use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty name, bad policy, etc.).
    ConfigValidation(String),
    /// Two roster entries share an address.
    DuplicateAddress { address: String, first: String, second: String },
    /// A customer name appears more than once in the roster.
    DuplicateCustomer(String),
    /// A batch document could not be decoded.
    BatchParse { source: String, message: String },
    /// A running total left the `i64` satoshi range.
    AmountOverflow(String),
    /// The storage collaborator failed.
    Storage(String),
    /// The storage collaborator returned rows of the wrong shape.
    StoreRows(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::DuplicateAddress { address, first, second } => {
                write!(f, "address '{address}' is assigned to both '{first}' and '{second}'")
            }
            Self::DuplicateCustomer(name) => {
                write!(f, "customer '{name}' is listed more than once")
            }
            Self::BatchParse { source, message } => {
                write!(f, "batch '{source}': {message}")
            }
            Self::AmountOverflow(what) => write!(f, "amount overflow: {what}"),
            Self::Storage(msg) => write!(f, "storage error: {msg}"),
            Self::StoreRows(msg) => write!(f, "unexpected storage result: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
