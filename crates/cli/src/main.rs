// txrecon CLI - wallet deposit reconciliation

mod exit_codes;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "txrecon")]
#[command(about = "Reconcile wallet deposits against a customer roster")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log more to stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter, deduplicate and aggregate batches, then print the report
    #[command(after_help = "\
Examples:
  txrecon run transactions-1.json transactions-2.json
  txrecon run data/*.json --config customers.toml --json
  txrecon run batch.json --engine store --db deposits.db
  txrecon run batch.json --engine both --output result.json")]
    Run {
        /// Batch files, processed in the order given
        #[arg(required = true)]
        batches: Vec<PathBuf>,

        /// Roster and policy TOML (built-in roster when omitted)
        #[arg(long, short = 'c', env = "TXRECON_CONFIG")]
        config: Option<PathBuf>,

        /// Aggregation path
        #[arg(long, value_enum, default_value_t = EngineArg::Memory)]
        engine: EngineArg,

        /// SQLite database for the store path (in-memory when omitted)
        #[arg(long, env = "TXRECON_DB")]
        db: Option<PathBuf>,

        /// Attempts to open --db before giving up (0 = keep trying)
        #[arg(long, default_value_t = 3)]
        connect_attempts: u32,

        /// Output JSON to stdout instead of the text report
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// List transactions that pay more than one output to the wallet
    #[command(after_help = "\
Examples:
  txrecon outputs transactions-1.json transactions-2.json
  txrecon outputs data/*.json --json")]
    Outputs {
        /// Batch files, processed in the order given
        #[arg(required = true)]
        batches: Vec<PathBuf>,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a roster config without running
    #[command(after_help = "\
Examples:
  txrecon validate --config customers.toml
  txrecon validate")]
    Validate {
        /// Roster and policy TOML (built-in roster when omitted)
        #[arg(long, short = 'c', env = "TXRECON_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EngineArg {
    /// Fold in process
    Memory,
    /// Generated SQL over SQLite
    Store,
    /// Run both and fail if they disagree
    Both,
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("TXRECON_COMMIT"), ")",
            "\nengine:  txrecon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TXRECON_TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("TXRECON_COMMIT"), ")",
            "\nengine:  txrecon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TXRECON_TARGET"),
        )
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            batches,
            config,
            engine,
            db,
            connect_attempts,
            json,
            output,
        } => recon::cmd_run(recon::RunArgs {
            batches,
            config,
            engine,
            db,
            connect_attempts,
            json,
            output,
        }),
        Commands::Outputs { batches, json } => recon::cmd_outputs(batches, json),
        Commands::Validate { config } => recon::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<txrecon::ReconError> for CliError {
    fn from(err: txrecon::ReconError) -> Self {
        Self::new(exit_codes::recon_exit_code(&err), err.to_string())
    }
}

impl From<txrecon_store::StoreError> for CliError {
    fn from(err: txrecon_store::StoreError) -> Self {
        let hint = match &err {
            txrecon_store::StoreError::Unavailable { .. } => {
                Some("check the --db path, or pass --connect-attempts 0 to keep retrying".to_string())
            }
            _ => None,
        };
        Self { code: exit_codes::EXIT_STORAGE, message: err.to_string(), hint }
    }
}
