//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                                 |
//! |------|---------------------------------------------------------|
//! | 0    | Success                                                 |
//! | 1    | General error (unspecified)                             |
//! | 2    | CLI usage error (bad args, missing config file)         |
//! | 3    | Roster config does not parse or fails validation        |
//! | 4    | A batch is unreadable, or its deposits overflow a total |
//! | 5    | Storage error (open, insert, or aggregate)              |
//! | 6    | In-memory and store aggregation disagree                |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use txrecon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options or files.
pub const EXIT_USAGE: u8 = 2;

/// Config TOML is malformed, or the roster assigns an address or name twice.
pub const EXIT_CONFIG_INVALID: u8 = 3;

/// Batch file unreadable, not JSON, or missing its `transactions` array.
/// Also raised when valid deposits sum past the `i64` satoshi range.
/// Individual bad records never trigger this; they are filtered out.
pub const EXIT_BATCH_INVALID: u8 = 4;

/// Database could not be opened, written, or queried.
pub const EXIT_STORAGE: u8 = 5;

/// `--engine both` produced different aggregates from the two paths.
pub const EXIT_ENGINE_DIVERGED: u8 = 6;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_)
        | ReconError::ConfigValidation(_)
        | ReconError::DuplicateAddress { .. }
        | ReconError::DuplicateCustomer(_) => EXIT_CONFIG_INVALID,
        ReconError::BatchParse { .. } | ReconError::AmountOverflow(_) => EXIT_BATCH_INVALID,
        ReconError::Storage(_) | ReconError::StoreRows(_) => EXIT_STORAGE,
    }
}
