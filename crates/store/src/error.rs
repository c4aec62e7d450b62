use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    Json(serde_json::Error),
    /// A stored value that cannot be mapped back into the engine's types.
    Decode(String),
    /// Gave up connecting after the configured number of attempts.
    Unavailable { path: String, attempts: u32, last: Box<StoreError> },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite(e) => write!(f, "sqlite: {e}"),
            Self::Json(e) => write!(f, "record encoding: {e}"),
            Self::Decode(msg) => write!(f, "stored value: {msg}"),
            Self::Unavailable { path, attempts, last } => {
                write!(f, "database {path} unavailable after {attempts} attempt(s): {last}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sqlite(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Decode(_) => None,
            Self::Unavailable { last, .. } => Some(last.as_ref()),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Sqlite(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
