use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use bullion_core::{FixingPrice, FixingStatus, HedgeKind, TransactionFixing};

use super::{parse_decimal, parse_timestamp, parse_uuid};
use crate::{EngineError, EngineResult};

fn status_parse(raw: &str) -> EngineResult<FixingStatus> {
    match raw {
        "active" => Ok(FixingStatus::Active),
        "closed" => Ok(FixingStatus::Closed),
        other => Err(EngineError::Internal(format!(
            "unknown fixing status: {other}"
        ))),
    }
}

fn kind_parse(raw: &str) -> EngineResult<HedgeKind> {
    match raw {
        "SALE-HEDGE" => Ok(HedgeKind::SaleHedge),
        "PURCHASE-HEDGE" => Ok(HedgeKind::PurchaseHedge),
        other => Err(EngineError::Internal(format!("unknown hedge kind: {other}"))),
    }
}

pub fn insert_price(conn: &Connection, price: &FixingPrice) -> EngineResult<()> {
    conn.execute(
        "INSERT INTO fixing_prices (id, metal_transaction_id, metal_rate, rate_in_gram,
                bid_value, current_bid_value, entered_by, created_at, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            price.id.to_string(),
            price.metal_transaction_id.to_string(),
            price.metal_rate.to_string(),
            price.rate_in_gram.to_string(),
            price.bid_value.to_string(),
            price.current_bid_value.to_string(),
            price.entered_by,
            price.created_at.to_rfc3339(),
            price.status.as_str(),
        ],
    )?;
    Ok(())
}

pub fn prices_for_transaction(
    conn: &Connection,
    metal_transaction_id: Uuid,
) -> EngineResult<Vec<FixingPrice>> {
    let mut stmt = conn.prepare(
        "SELECT id, metal_transaction_id, metal_rate, rate_in_gram, bid_value,
                current_bid_value, entered_by, created_at, status
         FROM fixing_prices WHERE metal_transaction_id = ?1",
    )?;
    let mut rows = stmt.query(params![metal_transaction_id.to_string()])?;
    let mut prices = Vec::new();
    while let Some(row) = rows.next()? {
        prices.push(FixingPrice {
            id: parse_uuid(row.get(0)?)?,
            metal_transaction_id: parse_uuid(row.get(1)?)?,
            metal_rate: parse_decimal(row.get(2)?)?,
            rate_in_gram: parse_decimal(row.get(3)?)?,
            bid_value: parse_decimal(row.get(4)?)?,
            current_bid_value: parse_decimal(row.get(5)?)?,
            entered_by: row.get(6)?,
            created_at: parse_timestamp(row.get(7)?)?,
            status: status_parse(&row.get::<_, String>(8)?)?,
        });
    }
    Ok(prices)
}

pub fn insert_fixing(conn: &Connection, fixing: &TransactionFixing) -> EngineResult<()> {
    conn.execute(
        "INSERT INTO transaction_fixings (id, transaction_id, metal_transaction_id,
                fixing_type, party_code, voucher_number, reference_number, orders,
                status, notes, created_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            fixing.id.to_string(),
            fixing.transaction_id,
            fixing.metal_transaction_id.to_string(),
            fixing.fixing_type.as_str(),
            fixing.party_code,
            fixing.voucher_number,
            fixing.reference_number,
            serde_json::to_string(&fixing.orders)?,
            fixing.status.as_str(),
            fixing.notes,
            fixing.created_by,
            fixing.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Collision probe used while generating `HSM`/`HPM` ids.
pub fn fixing_id_taken(conn: &Connection, transaction_id: &str) -> bool {
    conn.query_row(
        "SELECT 1 FROM transaction_fixings WHERE transaction_id = ?1",
        params![transaction_id],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
    .unwrap_or(true)
}

pub fn fixings_for_transaction(
    conn: &Connection,
    metal_transaction_id: Uuid,
) -> EngineResult<Vec<TransactionFixing>> {
    let mut stmt = conn.prepare(
        "SELECT id, transaction_id, metal_transaction_id, fixing_type, party_code,
                voucher_number, reference_number, orders, status, notes,
                created_by, created_at
         FROM transaction_fixings WHERE metal_transaction_id = ?1",
    )?;
    let mut rows = stmt.query(params![metal_transaction_id.to_string()])?;
    let mut fixings = Vec::new();
    while let Some(row) = rows.next()? {
        fixings.push(TransactionFixing {
            id: parse_uuid(row.get(0)?)?,
            transaction_id: row.get(1)?,
            metal_transaction_id: parse_uuid(row.get(2)?)?,
            fixing_type: kind_parse(&row.get::<_, String>(3)?)?,
            party_code: row.get(4)?,
            voucher_number: row.get(5)?,
            reference_number: row.get(6)?,
            orders: serde_json::from_str(&row.get::<_, String>(7)?)?,
            status: status_parse(&row.get::<_, String>(8)?)?,
            notes: row.get(9)?,
            created_by: row.get(10)?,
            created_at: parse_timestamp(row.get(11)?)?,
        });
    }
    Ok(fixings)
}

/// Remove hedge and price records written by one commercial transaction.
pub fn delete_by_transaction(conn: &Connection, metal_transaction_id: Uuid) -> EngineResult<usize> {
    let id = metal_transaction_id.to_string();
    let fixings = conn.execute(
        "DELETE FROM transaction_fixings WHERE metal_transaction_id = ?1",
        params![id],
    )?;
    let prices = conn.execute(
        "DELETE FROM fixing_prices WHERE metal_transaction_id = ?1",
        params![id],
    )?;
    Ok(fixings + prices)
}
