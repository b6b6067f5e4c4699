//! Input validation, run before any session opens. Shape and range checks
//! only; existence checks (party, inventory) happen inside the session.

use rust_decimal::Decimal;

use bullion_core::MetalTransaction;

use crate::error::{EngineError, EngineResult};

pub fn validate_transaction(transaction: &MetalTransaction) -> EngineResult<()> {
    let mut missing = Vec::new();
    if transaction.party_code.trim().is_empty() {
        missing.push("partyCode");
    }
    if transaction.party_currency.trim().is_empty() {
        missing.push("partyCurrency");
    }
    if transaction.voucher_number.trim().is_empty() {
        missing.push("voucherNumber");
    }
    if transaction.created_by.trim().is_empty() {
        missing.push("createdBy");
    }
    if !missing.is_empty() {
        return Err(EngineError::MissingRequiredFields(missing.join(", ")));
    }

    if transaction.stock_items.is_empty() {
        return Err(EngineError::InvalidStockItems(
            "transaction carries no stock items".to_string(),
        ));
    }
    for (index, line) in transaction.stock_items.iter().enumerate() {
        if line.stock_code.trim().is_empty() {
            return Err(EngineError::InvalidStockItems(format!(
                "line {index}: empty stock code"
            )));
        }
        if line.pieces < 0 {
            return Err(EngineError::InvalidStockItems(format!(
                "line {index}: negative pieces"
            )));
        }
        if line.gross_weight < Decimal::ZERO {
            return Err(EngineError::InvalidStockItems(format!(
                "line {index}: negative gross weight"
            )));
        }
        if line.purity <= Decimal::ZERO || line.purity > Decimal::ONE {
            return Err(EngineError::InvalidStockItems(format!(
                "line {index}: purity {} outside (0, 1]",
                line.purity
            )));
        }
        if line.purity_std <= Decimal::ZERO || line.purity_std > Decimal::ONE {
            return Err(EngineError::InvalidStockItems(format!(
                "line {index}: standard purity {} outside (0, 1]",
                line.purity_std
            )));
        }
        if line.item_total.base_amount < Decimal::ZERO {
            return Err(EngineError::InvalidStockItems(format!(
                "line {index}: negative gold value"
            )));
        }
    }

    for (index, charge) in transaction.other_charges.iter().enumerate() {
        if charge.debit.account.trim().is_empty() || charge.credit.account.trim().is_empty() {
            return Err(EngineError::Validation(format!(
                "other charge {index}: missing account code"
            )));
        }
        if charge.debit.amount < Decimal::ZERO
            || charge.credit.amount < Decimal::ZERO
            || charge.debit.base_amount < Decimal::ZERO
            || charge.credit.base_amount < Decimal::ZERO
        {
            return Err(EngineError::Validation(format!(
                "other charge {index}: negative amount"
            )));
        }
        if let Some(vat) = &charge.vat_details {
            if vat.vat_amount < Decimal::ZERO {
                return Err(EngineError::Validation(format!(
                    "other charge {index}: negative VAT"
                )));
            }
        }
    }

    if transaction.total_summary.net_amount < Decimal::ZERO
        || transaction.total_summary.item_total_amount < Decimal::ZERO
    {
        return Err(EngineError::Validation(
            "negative total summary".to_string(),
        ));
    }
    Ok(())
}
