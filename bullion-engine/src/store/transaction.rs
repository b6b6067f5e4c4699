use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;
use uuid::Uuid;

use bullion_core::MetalTransaction;

use super::{parse_timestamp, parse_uuid};
use crate::{EngineError, EngineResult};

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(code, _)
            if code.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

pub fn insert(conn: &Connection, tx: &MetalTransaction) -> EngineResult<()> {
    let result = conn.execute(
        "INSERT INTO metal_transactions (id, transaction_type, fixed, unfix, hedge,
                party_code, party_currency, item_currency, base_currency,
                voucher_date, voucher_number, hedge_voucher_number,
                stock_items, other_charges, total_summary, deal_order_id,
                created_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        params![
            tx.id.to_string(),
            tx.transaction_type.as_str(),
            tx.fixed as i64,
            tx.unfix as i64,
            tx.hedge as i64,
            tx.party_code,
            tx.party_currency,
            tx.item_currency,
            tx.base_currency,
            tx.voucher_date.to_rfc3339(),
            tx.voucher_number,
            tx.hedge_voucher_number,
            serde_json::to_string(&tx.stock_items)?,
            serde_json::to_string(&tx.other_charges)?,
            serde_json::to_string(&tx.total_summary)?,
            tx.deal_order_id,
            tx.created_by,
            tx.created_at.to_rfc3339(),
        ],
    );
    match result {
        Ok(_) => Ok(()),
        Err(err) if is_unique_violation(&err) => {
            Err(EngineError::DuplicateTransaction(tx.voucher_number.clone()))
        }
        Err(err) => Err(err.into()),
    }
}

pub fn update(conn: &Connection, tx: &MetalTransaction) -> EngineResult<()> {
    let result = conn.execute(
        "UPDATE metal_transactions SET transaction_type = ?2, fixed = ?3, unfix = ?4,
                hedge = ?5, party_code = ?6, party_currency = ?7,
                voucher_date = ?8, voucher_number = ?9, hedge_voucher_number = ?10,
                stock_items = ?11, other_charges = ?12, total_summary = ?13
         WHERE id = ?1",
        params![
            tx.id.to_string(),
            tx.transaction_type.as_str(),
            tx.fixed as i64,
            tx.unfix as i64,
            tx.hedge as i64,
            tx.party_code,
            tx.party_currency,
            tx.voucher_date.to_rfc3339(),
            tx.voucher_number,
            tx.hedge_voucher_number,
            serde_json::to_string(&tx.stock_items)?,
            serde_json::to_string(&tx.other_charges)?,
            serde_json::to_string(&tx.total_summary)?,
        ],
    );
    match result {
        Ok(0) => Err(EngineError::TransactionNotFound(tx.id)),
        Ok(_) => Ok(()),
        Err(err) if is_unique_violation(&err) => {
            Err(EngineError::DuplicateTransaction(tx.voucher_number.clone()))
        }
        Err(err) => Err(err.into()),
    }
}

pub fn find(conn: &Connection, id: Uuid) -> EngineResult<Option<MetalTransaction>> {
    conn.query_row(
        "SELECT id, transaction_type, fixed, unfix, hedge, party_code, party_currency,
                item_currency, base_currency, voucher_date, voucher_number,
                hedge_voucher_number, stock_items, other_charges, total_summary,
                deal_order_id, created_by, created_at
         FROM metal_transactions WHERE id = ?1",
        params![id.to_string()],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, String>(8)?,
                row.get::<_, String>(9)?,
                row.get::<_, String>(10)?,
                row.get::<_, Option<String>>(11)?,
                row.get::<_, String>(12)?,
                row.get::<_, String>(13)?,
                row.get::<_, String>(14)?,
                row.get::<_, Option<String>>(15)?,
                row.get::<_, String>(16)?,
                row.get::<_, String>(17)?,
            ))
        },
    )
    .optional()?
    .map(
        |(id, tx_type, fixed, unfix, hedge, party, party_ccy, item_ccy, base_ccy, vdate,
          vnum, hedge_vnum, items, charges, summary, deal, created_by, created_at)| {
            Ok(MetalTransaction {
                id: parse_uuid(id)?,
                transaction_type: tx_type
                    .parse()
                    .map_err(EngineError::InvalidTransactionType)?,
                fixed: fixed != 0,
                unfix: unfix != 0,
                hedge: hedge != 0,
                party_code: party,
                party_currency: party_ccy,
                item_currency: item_ccy,
                base_currency: base_ccy,
                voucher_date: parse_timestamp(vdate)?,
                voucher_number: vnum,
                hedge_voucher_number: hedge_vnum,
                stock_items: serde_json::from_str(&items)?,
                other_charges: serde_json::from_str(&charges)?,
                total_summary: serde_json::from_str(&summary)?,
                deal_order_id: deal,
                created_by,
                created_at: parse_timestamp(created_at)?,
            })
        },
    )
    .transpose()
}

pub fn require(conn: &Connection, id: Uuid) -> EngineResult<MetalTransaction> {
    find(conn, id)?.ok_or(EngineError::TransactionNotFound(id))
}

pub fn delete(conn: &Connection, id: Uuid) -> EngineResult<()> {
    let count = conn.execute(
        "DELETE FROM metal_transactions WHERE id = ?1",
        params![id.to_string()],
    )?;
    if count == 0 {
        return Err(EngineError::TransactionNotFound(id));
    }
    Ok(())
}

/// The hedge voucher is assigned once and never regenerated.
pub fn set_hedge_voucher(conn: &Connection, id: Uuid, voucher: &str) -> EngineResult<()> {
    conn.execute(
        "UPDATE metal_transactions SET hedge_voucher_number = ?2
         WHERE id = ?1 AND hedge_voucher_number IS NULL",
        params![id.to_string(), voucher],
    )?;
    Ok(())
}

pub fn insert_deal_order(conn: &Connection, id: &str, status: &str) -> EngineResult<()> {
    conn.execute(
        "INSERT INTO deal_orders (id, status) VALUES (?1, ?2)",
        params![id, status],
    )?;
    Ok(())
}

pub fn deal_order_status(conn: &Connection, id: &str) -> EngineResult<Option<String>> {
    Ok(conn
        .query_row(
            "SELECT status FROM deal_orders WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?)
}

/// Best-effort push of a linked deal order to `completed`; a failure is
/// logged and does not abort the posting.
pub fn mark_deal_order_completed(conn: &Connection, id: &str) {
    let result = conn.execute(
        "UPDATE deal_orders SET status = 'completed' WHERE id = ?1",
        params![id],
    );
    match result {
        Ok(0) => warn!(deal_order = id, "linked deal order not found"),
        Ok(_) => {}
        Err(err) => warn!(deal_order = id, "deal order update failed: {err}"),
    }
}
