//! Registry posting model and SQLite persistence for the bullion back office.

mod entry;
mod error;
mod query;
pub mod sqlite;

pub use entry::{PostingClass, RegistryEntry};
pub use error::{LedgerError, LedgerResult};
pub use query::RegistryQuery;
