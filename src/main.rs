use clap::{Parser, Subcommand};
use finledger::{load_into, save_csv, write_table, LedgerStore, NewTransaction, Summary};

use std::io::stdout;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "finledger", about = "Track income and expenses in a CSV ledger")]
struct Cli {
    /// Ledger file; a missing file is treated as an empty ledger.
    #[arg(long, short, default_value = "transactions.csv")]
    file: PathBuf,

    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show every transaction.
    List,
    /// Show totals, balance and expenses by category.
    Summary,
    /// Add a transaction and save the ledger.
    Add {
        /// income or expense
        #[arg(long)]
        kind: String,
        #[arg(long, allow_hyphen_values = true)]
        amount: String,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "")]
        description: String,
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Remove every transaction and save the empty ledger.
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let store = LedgerStore::new();
    let subscription =
        store.subscribe(|txs| tracing::debug!(count = txs.len(), "Ledger updated"));
    load_into(&store, &cli.file).await;

    match cli.command {
        Command::List => write_table(stdout().lock(), &store.snapshot())?,
        Command::Summary => {
            Summary::from_transactions(&store.snapshot()).write_report(stdout().lock())?
        }
        Command::Add {
            kind,
            amount,
            category,
            description,
            date,
        } => {
            let new_tx = NewTransaction::validated(
                &kind,
                &amount,
                &category,
                &description,
                date.as_deref(),
            )?;
            store.add(new_tx);
            save_csv(&cli.file, &store.snapshot())?;
            println!("Transaction added. You have {} transactions.", store.len());
        }
        Command::Clear => {
            store.clear();
            save_csv(&cli.file, &store.snapshot())?;
            println!("All transactions cleared.");
        }
    }

    subscription.unsubscribe();
    Ok(())
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}
