//! Writes transactions back out in the format [`crate::parser`] reads.
//!
//! Double quotes inside a description are escaped the standard CSV way
//! (`""`), which the lenient parser does not undo; such descriptions lose
//! their quotes on the way back in.

use crate::error::Result;
use crate::transaction::{Transaction, TransactionKind};

use csv::WriterBuilder;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

pub const HEADER: [&str; 5] = ["type", "amount", "category", "description", "date"];

#[derive(Serialize)]
struct CsvOutRow<'a> {
    kind: TransactionKind,
    amount: String,
    category: &'a str,
    description: &'a str,
    date: &'a str,
}

impl<'a> From<&'a Transaction> for CsvOutRow<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            kind: tx.kind,
            amount: tx.amount.to_string(),
            category: &tx.category,
            description: &tx.description,
            date: &tx.date,
        }
    }
}

/// Writes the header and one row per transaction. The header is written even
/// when there are no rows.
pub fn write_csv<W: Write>(writer: W, transactions: &[Transaction]) -> Result<()> {
    let mut wrt = WriterBuilder::new().has_headers(false).from_writer(writer);

    wrt.write_record(HEADER)?;
    for tx in transactions {
        wrt.serialize(CsvOutRow::from(tx))?;
    }
    wrt.flush()?;

    Ok(())
}

pub fn save_csv<P: AsRef<Path>>(path: P, transactions: &[Transaction]) -> Result<()> {
    let file = std::fs::File::create(path.as_ref())?;
    write_csv(file, transactions)?;
    tracing::info!(
        path = %path.as_ref().display(),
        count = transactions.len(),
        "Saved transactions"
    );
    Ok(())
}
