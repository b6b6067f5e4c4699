use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use uuid::Uuid;

use bullion_core::{
    Inventory, InventoryAction, InventoryLog, MakingUnit, MetalStock, TransactionType,
};

use super::{parse_decimal, parse_timestamp, parse_uuid};
use crate::{EngineError, EngineResult};

/// Persist a SKU and seed its zero-balance inventory row plus the opening
/// log entry.
pub fn insert_stock(conn: &Connection, stock: &MetalStock, created_by: &str) -> EngineResult<()> {
    conn.execute(
        "INSERT INTO metal_stocks (id, code, metal_type, karat, size, colour, brand,
                country, category, pcs, standard_purity, pass_purity_diff,
                exclude_vat, vat_on_making, wastage, making_unit)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            stock.id.to_string(),
            stock.code,
            stock.metal_type,
            stock.karat,
            stock.size,
            stock.colour,
            stock.brand,
            stock.country,
            stock.category,
            stock.pcs as i64,
            stock.standard_purity.to_string(),
            stock.pass_purity_diff as i64,
            stock.exclude_vat as i64,
            stock.vat_on_making as i64,
            stock.wastage as i64,
            stock.making_unit.map(making_unit_str),
        ],
    )?;
    let now = Utc::now();
    conn.execute(
        "INSERT INTO inventory (stock_code, pcs_count, gross_weight, pure_weight, purity, updated_at)
         VALUES (?1, 0, '0', '0', ?2, ?3)",
        params![stock.code, stock.standard_purity.to_string(), now.to_rfc3339()],
    )?;
    insert_log(
        conn,
        &InventoryLog {
            id: Uuid::new_v4(),
            stock_code: stock.code.clone(),
            voucher_number: "OPENING".to_string(),
            voucher_date: now,
            transaction_type: TransactionType::Purchase,
            action: InventoryAction::Add,
            gross_weight: Decimal::ZERO,
            pcs: stock.pcs,
            is_draft: None,
            created_by: created_by.to_string(),
            created_at: now,
        },
    )?;
    Ok(())
}

fn making_unit_str(unit: MakingUnit) -> &'static str {
    match unit {
        MakingUnit::Grams => "grams",
        MakingUnit::Pieces => "pieces",
        MakingUnit::Percentage => "percentage",
    }
}

fn making_unit_parse(raw: &str) -> Option<MakingUnit> {
    match raw {
        "grams" => Some(MakingUnit::Grams),
        "pieces" => Some(MakingUnit::Pieces),
        "percentage" => Some(MakingUnit::Percentage),
        _ => None,
    }
}

pub fn find_stock(conn: &Connection, code: &str) -> EngineResult<Option<MetalStock>> {
    conn.query_row(
        "SELECT id, code, metal_type, karat, size, colour, brand, country, category,
                pcs, standard_purity, pass_purity_diff, exclude_vat, vat_on_making,
                wastage, making_unit
         FROM metal_stocks WHERE code = ?1",
        params![code],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, Option<String>>(6)?,
                row.get::<_, Option<String>>(7)?,
                row.get::<_, Option<String>>(8)?,
                row.get::<_, i64>(9)?,
                row.get::<_, String>(10)?,
                row.get::<_, i64>(11)?,
                row.get::<_, i64>(12)?,
                row.get::<_, i64>(13)?,
                row.get::<_, i64>(14)?,
                row.get::<_, Option<String>>(15)?,
            ))
        },
    )
    .optional()?
    .map(
        |(id, code, metal, karat, size, colour, brand, country, category, pcs, purity, pass,
          ex_vat, vat_mk, wastage, unit)| {
            Ok(MetalStock {
                id: parse_uuid(id)?,
                code,
                metal_type: metal,
                karat,
                size,
                colour,
                brand,
                country,
                category,
                pcs: pcs != 0,
                standard_purity: parse_decimal(purity)?,
                pass_purity_diff: pass != 0,
                exclude_vat: ex_vat != 0,
                vat_on_making: vat_mk != 0,
                wastage: wastage != 0,
                making_unit: unit.as_deref().and_then(making_unit_parse),
            })
        },
    )
    .transpose()
}

pub fn inventory(conn: &Connection, stock_code: &str) -> EngineResult<Inventory> {
    conn.query_row(
        "SELECT stock_code, pcs_count, gross_weight, pure_weight, purity, updated_at
         FROM inventory WHERE stock_code = ?1",
        params![stock_code],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        },
    )
    .optional()?
    .map(|(code, pcs, gross, pure, purity, updated)| -> EngineResult<Inventory> {
        Ok(Inventory {
            stock_code: code,
            pcs_count: pcs,
            gross_weight: parse_decimal(gross)?,
            pure_weight: parse_decimal(pure)?,
            purity: parse_decimal(purity)?,
            updated_at: parse_timestamp(updated)?,
        })
    })
    .transpose()?
    .ok_or_else(|| EngineError::InventoryNotFound(stock_code.to_string()))
}

pub fn save_inventory(conn: &Connection, inv: &Inventory, now: DateTime<Utc>) -> EngineResult<()> {
    conn.execute(
        "UPDATE inventory SET pcs_count = ?2, gross_weight = ?3, pure_weight = ?4,
                updated_at = ?5
         WHERE stock_code = ?1",
        params![
            inv.stock_code,
            inv.pcs_count,
            inv.gross_weight.to_string(),
            inv.pure_weight.to_string(),
            now.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn insert_log(conn: &Connection, log: &InventoryLog) -> EngineResult<()> {
    conn.execute(
        "INSERT INTO inventory_logs (id, stock_code, voucher_number, voucher_date,
                transaction_type, action, gross_weight, pcs, is_draft, created_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            log.id.to_string(),
            log.stock_code,
            log.voucher_number,
            log.voucher_date.to_rfc3339(),
            log.transaction_type.as_str(),
            log.action.as_str(),
            log.gross_weight.to_string(),
            log.pcs as i64,
            log.is_draft.map(|d| d as i64),
            log.created_by,
            log.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn delete_logs_by_voucher(conn: &Connection, voucher_number: &str) -> EngineResult<usize> {
    // The seeded opening row is never tied to a commercial voucher.
    Ok(conn.execute(
        "DELETE FROM inventory_logs WHERE voucher_number = ?1",
        params![voucher_number],
    )?)
}

pub fn count_logs_by_voucher(conn: &Connection, voucher_number: &str) -> EngineResult<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM inventory_logs WHERE voucher_number = ?1",
        params![voucher_number],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}
