//! Inventory adjuster. Each stock line moves pieces and gross weight on the
//! SKU's inventory row; pure weight is always revalued from the stored
//! purity, not accumulated, so rounding drift cannot build up.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;

use bullion_core::{InventoryAction, InventoryLog, StockItem, TransactionType};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::store::stock;

/// Apply one line's movement to its SKU and append the audit log row.
/// `reverse` negates the movement for deletions and re-posts.
#[allow(clippy::too_many_arguments)]
pub fn apply_line(
    conn: &Connection,
    config: &EngineConfig,
    transaction_type: TransactionType,
    line: &StockItem,
    voucher_number: &str,
    voucher_date: DateTime<Utc>,
    pcs_tracked: bool,
    created_by: &str,
    reverse: bool,
    now: DateTime<Utc>,
) -> EngineResult<()> {
    let mut factor = i64::from(transaction_type.inventory_factor());
    if reverse {
        factor = -factor;
    }
    let action = if factor > 0 {
        InventoryAction::Add
    } else {
        InventoryAction::Remove
    };
    let gross_delta = Decimal::from(factor) * line.gross_weight;

    let mut inventory = stock::inventory(conn, &line.stock_code)?;
    let new_pcs = inventory.pcs_count + factor * line.pieces;
    let new_gross = inventory.gross_weight + gross_delta;

    if config.enforce_stock_floor && (new_pcs < 0 || new_gross < Decimal::ZERO) {
        return Err(EngineError::InsufficientStock {
            code: line.stock_code.clone(),
            detail: format!(
                "movement of {} pcs / {} g would leave {} pcs / {} g",
                factor * line.pieces,
                gross_delta,
                new_pcs,
                new_gross
            ),
        });
    }

    inventory.pcs_count = new_pcs;
    inventory.gross_weight = new_gross;
    inventory.pure_weight = new_gross * inventory.purity;
    stock::save_inventory(conn, &inventory, now)?;

    stock::insert_log(
        conn,
        &InventoryLog {
            id: Uuid::new_v4(),
            stock_code: line.stock_code.clone(),
            voucher_number: voucher_number.to_string(),
            voucher_date,
            transaction_type,
            action,
            gross_weight: line.gross_weight,
            pcs: pcs_tracked,
            is_draft: None,
            created_by: created_by.to_string(),
            created_at: now,
        },
    )?;
    tracing::debug!(
        stock = %line.stock_code,
        action = action.as_str(),
        gross = %gross_delta,
        "inventory adjusted"
    );
    Ok(())
}
