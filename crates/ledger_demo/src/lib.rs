//! A tiny command-line bot ledger.
//!
//! Each invocation plays one bot request: the caller names the acting user,
//! the command runs against that user's resources, and the reply is returned
//! as text.

use tally_core::ConfigError;
use tally_ledger::{GrowthOptions, LedgerError, ResourceFactory};
use tally_store::StoreError;
use thiserror::Error;
use tracing::info;

/// Errors surfaced to the command line.
#[derive(Debug, Error)]
pub enum DemoError {
    /// The command line could not be parsed.
    #[error("{0}\n\n{usage}", usage = USAGE)]
    Usage(String),
    /// A ledger operation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    /// The store file could not be opened.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// `TALLY_*` variables are invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Help text.
pub const USAGE: &str = "\
usage: ledger <store.json> <user_id> <command> [args...]

commands:
  balance <name>
  set <name> <amount>
  add <name> <amount>
  remove <name> <amount>
  give <name> <to_user> <amount>
  grow <name> simple|percent|compound <rate> [interval_secs]
  stop <name>
  growth <name>";

/// Kind of growth requested by `grow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthKind {
    /// Fixed amount per interval.
    Simple,
    /// Percent of the current balance per interval, without reinvesting.
    Percent,
    /// Percent per interval, reinvested.
    Compound,
}

/// One parsed command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Prints the logical balance.
    Balance {
        /// Resource name.
        name: String,
    },
    /// Overwrites the balance.
    Set {
        /// Resource name.
        name: String,
        /// Amount as typed.
        amount: String,
    },
    /// Adds to the balance.
    Add {
        /// Resource name.
        name: String,
        /// Amount as typed.
        amount: String,
    },
    /// Removes from the balance if covered.
    Remove {
        /// Resource name.
        name: String,
        /// Amount as typed.
        amount: String,
    },
    /// Transfers to another user.
    Give {
        /// Resource name.
        name: String,
        /// Receiving user id.
        to: String,
        /// Amount as typed.
        amount: String,
    },
    /// Starts growth.
    Grow {
        /// Resource name.
        name: String,
        /// Accrual formula.
        kind: GrowthKind,
        /// Rate as typed.
        rate: String,
        /// Seconds per iteration; the configured default when unset.
        interval: Option<f64>,
    },
    /// Stops growth.
    Stop {
        /// Resource name.
        name: String,
    },
    /// Describes growth.
    Growth {
        /// Resource name.
        name: String,
    },
}

impl Command {
    /// Parses the words following `<user_id>`.
    ///
    /// Amounts are kept as typed so the ledger applies its own coercion.
    pub fn parse(words: &[String]) -> Result<Self, DemoError> {
        let usage = |msg: &str| DemoError::Usage(msg.to_string());
        let arg = |i: usize| -> Result<String, DemoError> {
            words
                .get(i)
                .cloned()
                .ok_or_else(|| usage("missing argument"))
        };

        let Some(verb) = words.first() else {
            return Err(usage("missing command"));
        };
        let command = match verb.as_str() {
            "balance" => Self::Balance { name: arg(1)? },
            "set" => Self::Set {
                name: arg(1)?,
                amount: arg(2)?,
            },
            "add" => Self::Add {
                name: arg(1)?,
                amount: arg(2)?,
            },
            "remove" => Self::Remove {
                name: arg(1)?,
                amount: arg(2)?,
            },
            "give" => Self::Give {
                name: arg(1)?,
                to: arg(2)?,
                amount: arg(3)?,
            },
            "grow" => {
                let kind = match arg(2)?.as_str() {
                    "simple" => GrowthKind::Simple,
                    "percent" => GrowthKind::Percent,
                    "compound" => GrowthKind::Compound,
                    other => return Err(DemoError::Usage(format!("unknown growth type '{other}'"))),
                };
                let interval = match words.get(4) {
                    Some(raw) => Some(
                        raw.parse::<f64>()
                            .map_err(|_| DemoError::Usage(format!("bad interval '{raw}'")))?,
                    ),
                    None => None,
                };
                Self::Grow {
                    name: arg(1)?,
                    kind,
                    rate: arg(3)?,
                    interval,
                }
            }
            "stop" => Self::Stop { name: arg(1)? },
            "growth" => Self::Growth { name: arg(1)? },
            other => return Err(DemoError::Usage(format!("unknown command '{other}'"))),
        };
        Ok(command)
    }
}

/// Runs `command` for the user bound to `ledger` and returns the reply.
pub fn run(ledger: &ResourceFactory, command: &Command) -> Result<String, DemoError> {
    let reply = match command {
        Command::Balance { name } => {
            let value = ledger.user(name).value()?;
            format!("{name}: {value}")
        }
        Command::Set { name, amount } => {
            ledger.user(name).set(amount.as_str())?;
            format!("{name}: {}", ledger.user(name).value()?)
        }
        Command::Add { name, amount } => {
            format!("{name}: {}", ledger.user(name).add(amount.as_str())?)
        }
        Command::Remove { name, amount } => {
            format!("{name}: {}", ledger.user(name).remove(amount.as_str())?)
        }
        Command::Give { name, to, amount } => {
            let receipt = ledger
                .user(name)
                .transfer_to(&ledger.another_user(name, to), amount.as_str())?;
            info!(name = %name, to = %to, amount = receipt.debited, "transfer");
            format!(
                "{name}: {} (user {to} now has {})",
                receipt.source_balance, receipt.destination_balance
            )
        }
        Command::Grow {
            name,
            kind,
            rate,
            interval,
        } => {
            let mut options = GrowthOptions::new();
            if let Some(secs) = interval {
                options = options.every(*secs);
            }
            let growth = ledger.user(name).growth().clone();
            let record = match kind {
                GrowthKind::Simple => growth.add(rate.as_str(), options)?,
                GrowthKind::Percent => growth.add_percent(rate.as_str(), options)?,
                GrowthKind::Compound => growth.add_compound_interest(rate.as_str(), options)?,
            };
            format!("{name}: {record}")
        }
        Command::Stop { name } => {
            let resource = ledger.user(name);
            if resource.growth().stop()? {
                format!("{name}: growth stopped at {}", resource.value()?)
            } else {
                format!("{name}: no growth to stop")
            }
        }
        Command::Growth { name } => {
            let growth = ledger.user(name).growth().clone();
            match (growth.title()?, growth.will_complete_after()?) {
                (Some(title), Some(next)) => format!("{name}: {title}, next in {next:.0}s"),
                (Some(title), None) => format!("{name}: {title}, finished"),
                (None, _) => format!("{name}: no growth"),
            }
        }
    };
    Ok(reply)
}
