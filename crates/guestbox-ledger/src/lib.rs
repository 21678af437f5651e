//! Guestbox Ledger Library
//!
//! The ledger is the durable, append-only record of committed submissions:
//! a single JSON array file, read whole and rewritten whole on every append.

pub mod json_file;
pub mod traits;

pub use json_file::JsonFileLedger;
pub use traits::{LedgerError, LedgerResult, LedgerStore};
