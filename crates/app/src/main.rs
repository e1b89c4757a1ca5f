use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "ledgermatch",
    version,
    about = "Reconcile bank and card exports against a ledger register"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Join bank and card records against the ledger register on exact
    /// (date, outflow, inflow) keys and write the matched-pairs table
    MatchPairs {
        #[arg(long, value_name = "FILE")]
        bank: PathBuf,
        #[arg(long, value_name = "FILE")]
        card: PathBuf,
        #[arg(long, value_name = "FILE")]
        ledger: PathBuf,
        #[arg(long, value_name = "FILE", default_value = "data/derived/matched_pairs.csv")]
        out: PathBuf,
    },
    /// Apply the payee map to one or more transaction tables and write the
    /// resolved table
    Resolve {
        #[arg(long = "transactions", value_name = "FILE", required = true)]
        transactions: Vec<PathBuf>,
        #[arg(long, value_name = "FILE", default_value = "mappings/payee_map.csv")]
        rules: PathBuf,
        #[arg(long, value_name = "FILE", default_value = "data/derived/resolved.csv")]
        out: PathBuf,
        /// Also aggregate the resolved rows into hash-keyed review groups
        #[arg(long, value_name = "FILE")]
        groups_out: Option<PathBuf>,
    },
    /// Aggregate matched pairs into fingerprint groups for human review
    BuildGroups {
        #[arg(long, value_name = "FILE", default_value = "data/derived/matched_pairs.csv")]
        pairs: PathBuf,
        #[arg(long, value_name = "FILE", default_value = "data/derived/fingerprint_groups.csv")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for tabular output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        Command::MatchPairs {
            bank,
            card,
            ledger,
            out,
        } => commands::match_pairs(&bank, &card, &ledger, &out),
        Command::Resolve {
            transactions,
            rules,
            out,
            groups_out,
        } => commands::resolve(&transactions, &rules, &out, groups_out.as_deref()),
        Command::BuildGroups { pairs, out } => commands::build_groups(&pairs, &out),
    }
}
