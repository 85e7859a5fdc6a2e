pub mod error;
pub mod loader;
pub mod parser;
pub mod store;
pub mod summary;
pub mod transaction;
pub mod writer;

pub use error::{LedgerError, Result};
pub use loader::{fetch_text, load_into, load_transactions};
pub use parser::{
    parse_csv, parse_csv_with_report, DefaultedAmount, ParseReport, RejectReason, RowRejection,
};
pub use store::{LedgerStore, Subscription};
pub use summary::{write_table, Summary};
pub use transaction::{AmountError, NewTransaction, Transaction, TransactionId, TransactionKind};
pub use writer::{save_csv, write_csv};
