//! SQLite persistence for registry rows.
//!
//! Every function takes a caller-supplied connection so postings join the
//! engine's session transaction (`rusqlite::Transaction` derefs to
//! `Connection`).

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use rust_decimal::Decimal;
use tracing::warn;
use uuid::Uuid;

use crate::{LedgerError, LedgerResult, PostingClass, RegistryEntry, RegistryQuery};

const REGISTRY_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS registry_entries (
    id TEXT PRIMARY KEY,
    transaction_id TEXT NOT NULL,
    metal_transaction_id TEXT NOT NULL,
    transaction_type TEXT NOT NULL,
    entry_type TEXT NOT NULL,
    description TEXT NOT NULL,
    party TEXT,
    is_bullion INTEGER NOT NULL,
    value TEXT NOT NULL,
    debit TEXT NOT NULL,
    credit TEXT NOT NULL,
    cash_debit TEXT NOT NULL,
    cash_credit TEXT NOT NULL,
    gold_debit TEXT NOT NULL,
    gold_credit TEXT NOT NULL,
    gold_bid_value TEXT NOT NULL,
    gross_weight TEXT NOT NULL,
    pure_weight TEXT NOT NULL,
    purity TEXT NOT NULL,
    transaction_date TEXT NOT NULL,
    reference TEXT NOT NULL,
    hedge_reference TEXT,
    asset_type TEXT NOT NULL,
    currency_rate TEXT NOT NULL,
    deal_order_id TEXT,
    created_by TEXT NOT NULL,
    created_at TEXT NOT NULL,
    running_balance TEXT NOT NULL,
    previous_balance TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS registry_idx_metal_transaction
    ON registry_entries(metal_transaction_id);
CREATE INDEX IF NOT EXISTS registry_idx_reference
    ON registry_entries(reference);
CREATE INDEX IF NOT EXISTS registry_idx_date_party
    ON registry_entries(transaction_date, party);
"#;

const ENTRY_COLUMNS: &str = "id, transaction_id, metal_transaction_id, transaction_type, \
     entry_type, description, party, is_bullion, value, debit, credit, \
     cash_debit, cash_credit, gold_debit, gold_credit, gold_bid_value, \
     gross_weight, pure_weight, purity, transaction_date, reference, \
     hedge_reference, asset_type, currency_rate, deal_order_id, created_by, \
     created_at, running_balance, previous_balance";

pub fn init_schema(conn: &Connection) -> LedgerResult<()> {
    conn.execute_batch(REGISTRY_SCHEMA)?;
    Ok(())
}

/// Insert a batch without ordering guarantees. A failed row is logged and
/// skipped so the rest of the batch still lands; atomicity of the whole
/// posting remains with the caller's transaction.
pub fn insert_unordered(conn: &Connection, entries: &[RegistryEntry]) -> LedgerResult<usize> {
    let sql = format!(
        "INSERT INTO registry_entries ({ENTRY_COLUMNS}) VALUES (\
         ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, \
         ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29)"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let mut inserted = 0usize;
    for entry in entries {
        let result = stmt.execute(params![
            entry.id.to_string(),
            entry.transaction_id,
            entry.metal_transaction_id.to_string(),
            entry.transaction_type,
            entry.entry_type.as_str(),
            entry.description,
            entry.party,
            entry.is_bullion as i64,
            entry.value.to_string(),
            entry.debit.to_string(),
            entry.credit.to_string(),
            entry.cash_debit.to_string(),
            entry.cash_credit.to_string(),
            entry.gold_debit.to_string(),
            entry.gold_credit.to_string(),
            entry.gold_bid_value.to_string(),
            entry.gross_weight.to_string(),
            entry.pure_weight.to_string(),
            entry.purity.to_string(),
            entry.transaction_date.to_rfc3339(),
            entry.reference,
            entry.hedge_reference,
            entry.asset_type,
            entry.currency_rate.to_string(),
            entry.deal_order_id,
            entry.created_by,
            entry.created_at.to_rfc3339(),
            entry.running_balance.to_string(),
            entry.previous_balance.to_string(),
        ]);
        match result {
            Ok(_) => inserted += 1,
            Err(err) => warn!(
                entry_type = entry.entry_type.as_str(),
                reference = %entry.reference,
                "skipping registry row: {err}"
            ),
        }
    }
    Ok(inserted)
}

/// Remove every row posted by the given commercial transaction. Returns the
/// number of rows deleted.
pub fn delete_by_transaction(conn: &Connection, metal_transaction_id: Uuid) -> LedgerResult<usize> {
    let count = conn.execute(
        "DELETE FROM registry_entries WHERE metal_transaction_id = ?1",
        params![metal_transaction_id.to_string()],
    )?;
    Ok(count)
}

pub fn count_by_transaction(conn: &Connection, metal_transaction_id: Uuid) -> LedgerResult<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM registry_entries WHERE metal_transaction_id = ?1",
        params![metal_transaction_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

pub fn query(conn: &Connection, query: &RegistryQuery) -> LedgerResult<Vec<RegistryEntry>> {
    let mut sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM registry_entries
         WHERE (?1 IS NULL OR metal_transaction_id = ?1)
           AND (?2 IS NULL OR party = ?2)
           AND (?3 IS NULL OR entry_type = ?3)
           AND (?4 IS NULL OR reference = ?4)
           AND (?5 IS NULL OR transaction_date >= ?5)
           AND (?6 IS NULL OR transaction_date <= ?6)"
    );
    sql.push_str(if query.ascending {
        " ORDER BY created_at ASC, id ASC"
    } else {
        " ORDER BY created_at DESC, id DESC"
    });
    if query.limit.is_some() {
        sql.push_str(" LIMIT ?7");
    }

    let mut params: Vec<Value> = Vec::with_capacity(7);
    params.push(optional_text(
        query.metal_transaction_id.map(|id| id.to_string()),
    ));
    params.push(optional_text(query.party.clone()));
    params.push(optional_text(
        query.entry_type.map(|t| t.as_str().to_string()),
    ));
    params.push(optional_text(query.reference.clone()));
    params.push(optional_text(query.start_time.map(|ts| ts.to_rfc3339())));
    params.push(optional_text(query.end_time.map(|ts| ts.to_rfc3339())));
    if let Some(limit) = query.limit {
        params.push(Value::Integer(limit as i64));
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    let mut entries = Vec::new();
    while let Some(row) = rows.next()? {
        entries.push(row_to_entry(row)?);
    }
    Ok(entries)
}

fn optional_text(value: Option<String>) -> Value {
    value.map(Value::from).unwrap_or(Value::Null)
}

fn parse_decimal(raw: String) -> LedgerResult<Decimal> {
    Decimal::from_str(&raw)
        .map_err(|err| LedgerError::Serialization(format!("invalid decimal {raw}: {err}")))
}

fn parse_timestamp(raw: String) -> LedgerResult<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(&raw)
        .map_err(|err| LedgerError::Serialization(format!("invalid timestamp {raw}: {err}")))?
        .with_timezone(&Utc))
}

fn parse_uuid(raw: String) -> LedgerResult<Uuid> {
    Uuid::parse_str(&raw)
        .map_err(|err| LedgerError::Serialization(format!("invalid id {raw}: {err}")))
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> LedgerResult<RegistryEntry> {
    let entry_type_str: String = row.get(4)?;
    let entry_type = PostingClass::from_str(&entry_type_str).map_err(LedgerError::Serialization)?;
    Ok(RegistryEntry {
        id: parse_uuid(row.get(0)?)?,
        transaction_id: row.get(1)?,
        metal_transaction_id: parse_uuid(row.get(2)?)?,
        transaction_type: row.get(3)?,
        entry_type,
        description: row.get(5)?,
        party: row.get(6)?,
        is_bullion: row.get::<_, i64>(7)? != 0,
        value: parse_decimal(row.get(8)?)?,
        debit: parse_decimal(row.get(9)?)?,
        credit: parse_decimal(row.get(10)?)?,
        cash_debit: parse_decimal(row.get(11)?)?,
        cash_credit: parse_decimal(row.get(12)?)?,
        gold_debit: parse_decimal(row.get(13)?)?,
        gold_credit: parse_decimal(row.get(14)?)?,
        gold_bid_value: parse_decimal(row.get(15)?)?,
        gross_weight: parse_decimal(row.get(16)?)?,
        pure_weight: parse_decimal(row.get(17)?)?,
        purity: parse_decimal(row.get(18)?)?,
        transaction_date: parse_timestamp(row.get(19)?)?,
        reference: row.get(20)?,
        hedge_reference: row.get(21)?,
        asset_type: row.get(22)?,
        currency_rate: parse_decimal(row.get(23)?)?,
        deal_order_id: row.get(24)?,
        created_by: row.get(25)?,
        created_at: parse_timestamp(row.get(26)?)?,
        running_balance: parse_decimal(row.get(27)?)?,
        previous_balance: parse_decimal(row.get(28)?)?,
    })
}
