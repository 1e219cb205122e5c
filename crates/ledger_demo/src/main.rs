//! Command-line bot ledger.
//!
//! Every invocation is one bot request made by `<user_id>`. Balances and
//! growth live in a JSON file, so growth keeps accruing between runs.
//!
//! # Usage
//!
//! ```bash
//! ledger <store.json> <user_id> <command> [args...]
//! ```
//!
//! # Example
//!
//! ```bash
//! ledger ./bot.json 42 add coins 100
//! ledger ./bot.json 42 grow coins percent 5 60
//! ledger ./bot.json 42 balance coins
//! ```
//!
//! Logging is controlled by `TALLY_LOG` and `TALLY_LOG_FORMAT`; key prefix
//! and growth defaults by the other `TALLY_*` variables. A `.env` file is
//! loaded first if present.

use std::process::ExitCode;
use std::sync::Arc;

use ledger_demo::{Command, DemoError, USAGE, run};
use tally_core::{LedgerConfig, TracingSetup};
use tally_ledger::{RequestContext, ResourceFactory};
use tally_store::{CachedStore, JsonFileStore};
use tracing::error;

fn execute(args: &[String]) -> Result<String, DemoError> {
    let [path, user, words @ ..] = args else {
        return Err(DemoError::Usage("missing store path or user id".into()));
    };
    let command = Command::parse(words)?;

    let config = LedgerConfig::from_env()?;
    let store = CachedStore::new(JsonFileStore::open(path)?);
    let ledger = ResourceFactory::new(Arc::new(store))
        .with_config(config)
        .scoped(RequestContext::new().with_user(user));

    run(&ledger, &command)
}

#[expect(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "command-line replies"
)]
fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    TracingSetup::from_env().init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    }

    match execute(&args) {
        Ok(reply) => {
            println!("{reply}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "request failed");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
