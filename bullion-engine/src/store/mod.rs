//! SQLite persistence for parties, stocks, transactions, and fixings.
//!
//! All operations take a caller-supplied connection so they participate in
//! the orchestrator's session transaction.

pub mod fixing;
pub mod party;
pub mod schema;
pub mod stock;
pub mod transaction;

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{EngineError, EngineResult};

pub(crate) fn parse_decimal(raw: String) -> EngineResult<Decimal> {
    Decimal::from_str(&raw)
        .map_err(|err| EngineError::Internal(format!("invalid decimal {raw}: {err}")))
}

pub(crate) fn parse_timestamp(raw: String) -> EngineResult<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(&raw)
        .map_err(|err| EngineError::Internal(format!("invalid timestamp {raw}: {err}")))?
        .with_timezone(&Utc))
}

pub(crate) fn parse_uuid(raw: String) -> EngineResult<Uuid> {
    Uuid::parse_str(&raw).map_err(|err| EngineError::Internal(format!("invalid id {raw}: {err}")))
}
