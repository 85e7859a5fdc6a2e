//! Fetches a ledger file and feeds it to the parser.
//!
//! An unavailable file means "no text": the parser is never invoked and the
//! result is an empty ledger.

use crate::error::Result;
use crate::parser::parse_csv;
use crate::store::LedgerStore;
use crate::transaction::Transaction;

use std::io::ErrorKind;
use std::path::Path;

/// Reads the whole file. A missing file is `Ok(None)`.
pub async fn fetch_text<P: AsRef<Path>>(path: P) -> Result<Option<String>> {
    match tokio::fs::read(path.as_ref()).await {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub async fn load_transactions<P: AsRef<Path>>(path: P) -> Vec<Transaction> {
    let path = path.as_ref();

    match fetch_text(path).await {
        Ok(Some(text)) => {
            let transactions = parse_csv(&text);
            tracing::info!(
                path = %path.display(),
                count = transactions.len(),
                "Loaded transactions"
            );
            transactions
        }
        Ok(None) => {
            tracing::info!(path = %path.display(), "No transactions file found");
            Vec::new()
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Error loading transactions file");
            Vec::new()
        }
    }
}

/// Loads `path` and replaces the contents of `store` with the result.
pub async fn load_into<P: AsRef<Path>>(store: &LedgerStore, path: P) -> usize {
    let transactions = load_transactions(path).await;
    let count = transactions.len();
    store.bulk_load(transactions);
    count
}
