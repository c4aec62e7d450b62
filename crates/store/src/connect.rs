use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::error::StoreError;
use crate::sqlite::SqliteStore;

/// How long to keep trying to open the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause between attempts.
    pub interval: Duration,
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: None,
        }
    }
}

/// Open `path` and apply the schema, retrying at a fixed interval until it
/// succeeds or `policy.max_attempts` is exhausted.
pub fn connect_with_retry(path: &Path, policy: RetryPolicy) -> Result<SqliteStore, StoreError> {
    let mut attempt: u32 = 0;
    loop {
        attempt = attempt.saturating_add(1);
        match SqliteStore::open(path) {
            Ok(store) => {
                if attempt > 1 {
                    log::info!("connected to {} after {attempt} attempts", path.display());
                }
                return Ok(store);
            }
            Err(e) => {
                if policy.max_attempts.is_some_and(|max| attempt >= max) {
                    return Err(StoreError::Unavailable {
                        path: path.display().to_string(),
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
                log::warn!(
                    "cannot open {} (attempt {attempt}): {e}; retrying in {:?}",
                    path.display(),
                    policy.interval
                );
                thread::sleep(policy.interval);
            }
        }
    }
}
