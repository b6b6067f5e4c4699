//! Transaction posting engine for bullion trading: given a validated
//! commercial transaction, writes the full set of registry entries, party
//! balance deltas, inventory movements, and hedge/fix records under one
//! atomic database session, and can reverse any of them exactly.

pub mod balances;
pub mod config;
pub mod db;
pub mod error;
pub mod fixing;
pub mod inventory;
pub mod orchestrator;
pub mod posting;
pub mod reversal;
pub mod store;
pub mod totals;
pub mod validate;

pub use config::EngineConfig;
pub use db::Db;
pub use error::{EngineError, EngineResult};
pub use fixing::{HedgeVoucherProvider, SequentialVoucherProvider};
pub use orchestrator::PostingEngine;
