//! Reversal of a persisted transaction snapshot: negated balance vector,
//! opposite inventory movement, and deletion of dependent rows by
//! back-reference. Registry rows are not replayed; an update writes a fresh
//! record of the new state afterwards.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;

use bullion_core::MetalTransaction;

use crate::balances::{self, balance_vector};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::inventory;
use crate::store::{fixing as fixing_store, stock as stock_store};
use crate::totals::totalize;

/// Undo the snapshot's balance and inventory footprint.
pub fn reverse_effects(
    conn: &Connection,
    config: &EngineConfig,
    snapshot: &MetalTransaction,
    now: DateTime<Utc>,
) -> EngineResult<()> {
    let totals = totalize(&snapshot.stock_items, &snapshot.total_summary, false);
    let change = balance_vector(snapshot.transaction_type, snapshot.mode(), &totals).negate();
    balances::apply_party_change(
        conn,
        &snapshot.party_code,
        &snapshot.party_currency,
        &change,
        now,
    )
    .map_err(|err| EngineError::ReverseBalancesFailed(err.to_string()))?;
    balances::apply_other_charges(
        conn,
        &snapshot.other_charges,
        &snapshot.party_currency,
        Decimal::NEGATIVE_ONE,
        now,
    )
    .map_err(|err| EngineError::ReverseBalancesFailed(err.to_string()))?;

    for line in &snapshot.stock_items {
        let pcs_tracked = stock_store::find_stock(conn, &line.stock_code)?
            .map(|stock| stock.pcs)
            .unwrap_or(line.pieces > 0);
        inventory::apply_line(
            conn,
            config,
            snapshot.transaction_type,
            line,
            &snapshot.voucher_number,
            snapshot.voucher_date,
            pcs_tracked,
            &snapshot.created_by,
            true,
            now,
        )?;
    }
    tracing::info!(
        transaction = %snapshot.id,
        voucher = %snapshot.voucher_number,
        "transaction effects reversed"
    );
    Ok(())
}

/// Remove registry, fixing, and inventory-log rows keyed by back-reference.
pub fn delete_dependents(conn: &Connection, snapshot: &MetalTransaction) -> EngineResult<()> {
    let registry_rows = bullion_ledger::sqlite::delete_by_transaction(conn, snapshot.id)
        .map_err(|err| EngineError::DeleteRegistryFailed(err.to_string()))?;
    let fixing_rows = fixing_store::delete_by_transaction(conn, snapshot.id)?;
    let log_rows = stock_store::delete_logs_by_voucher(conn, &snapshot.voucher_number)?;
    tracing::debug!(
        transaction = %snapshot.id,
        registry_rows,
        fixing_rows,
        log_rows,
        "dependent rows deleted"
    );
    Ok(())
}
