#[allow(clippy::module_inception)]
pub mod store;


pub use store::{LedgerStore, Subscription};
