//! Hedge and fixing recorder. Fix-mode postings snapshot the agreed rates;
//! hedged postings open a hedge record under a generated `HSM`/`HPM` id and
//! stamp the hedge voucher back onto the transaction.

use chrono::Utc;
use rand::Rng;
use rusqlite::Connection;
use rust_decimal::Decimal;
use uuid::Uuid;

use bullion_core::{
    ids, FixingOrder, FixingPrice, FixingStatus, HedgeKind, MetalTransaction, StockItem,
    TransactionFixing,
};

use crate::error::EngineResult;
use crate::store::fixing as fixing_store;

/// Source of hedge voucher numbers. Production wires this to the voucher
/// number series; tests substitute a fixed sequence.
pub trait HedgeVoucherProvider {
    fn next_hedge_voucher(&self) -> String;
}

/// Day-scoped sequential vouchers: `HV-<yyyymmdd>-<seq>`.
pub struct SequentialVoucherProvider {
    counter: std::sync::atomic::AtomicU64,
}

impl SequentialVoucherProvider {
    pub fn new() -> Self {
        Self {
            counter: std::sync::atomic::AtomicU64::new(1),
        }
    }
}

impl Default for SequentialVoucherProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl HedgeVoucherProvider for SequentialVoucherProvider {
    fn next_hedge_voucher(&self) -> String {
        let seq = self
            .counter
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        format!("HV-{}-{:05}", Utc::now().format("%Y%m%d"), seq)
    }
}

fn line_pure_weight(line: &StockItem) -> Decimal {
    line.pure_weight
        .unwrap_or(line.gross_weight * line.purity_std)
}

/// Snapshot the fixing rates of every line. Failures here must not abort
/// the posting; the snapshot is informational.
pub fn record_fixing_prices(conn: &Connection, transaction: &MetalTransaction) {
    for line in &transaction.stock_items {
        let price = FixingPrice {
            id: Uuid::new_v4(),
            metal_transaction_id: transaction.id,
            metal_rate: line.metal_rate,
            rate_in_gram: line.metal_rate_requirements.rate_in_gram,
            bid_value: line.metal_rate_requirements.bid_value,
            current_bid_value: line.metal_rate_requirements.current_bid_value,
            entered_by: transaction.created_by.clone(),
            created_at: Utc::now(),
            status: FixingStatus::Active,
        };
        if let Err(err) = fixing_store::insert_price(conn, &price) {
            tracing::warn!(
                transaction = %transaction.id,
                stock = %line.stock_code,
                error = %err,
                "fixing price snapshot skipped"
            );
        }
    }
}

/// Open the hedge record for a hedged posting. One order per stock line,
/// carried at full purity.
pub fn record_transaction_fixing<R: Rng>(
    conn: &Connection,
    transaction: &MetalTransaction,
    hedge_voucher: &str,
    rng: &mut R,
) -> EngineResult<TransactionFixing> {
    let transaction_id = ids::fixing_transaction_id(transaction.transaction_type, rng, |id| {
        fixing_store::fixing_id_taken(conn, id)
    });

    let orders = transaction
        .stock_items
        .iter()
        .map(|line| FixingOrder {
            commodity: line.stock_code.clone(),
            gross_weight: line.gross_weight,
            pure_weight: line_pure_weight(line),
            one_gram_rate: line.metal_rate_requirements.rate_in_gram,
            bid_value: line.metal_rate_requirements.bid_value,
            current_bid_value: line.metal_rate_requirements.current_bid_value,
            currency: transaction.party_currency.clone(),
            purity: Decimal::ONE,
            price: line.item_total.base_amount,
            metal_type: "GOLD".to_string(),
        })
        .collect();

    let fixing = TransactionFixing {
        id: Uuid::new_v4(),
        transaction_id,
        metal_transaction_id: transaction.id,
        fixing_type: HedgeKind::for_transaction(transaction.transaction_type),
        party_code: transaction.party_code.clone(),
        voucher_number: hedge_voucher.to_string(),
        reference_number: transaction.voucher_number.clone(),
        orders,
        status: FixingStatus::Active,
        notes: None,
        created_by: transaction.created_by.clone(),
        created_at: Utc::now(),
    };
    fixing_store::insert_fixing(conn, &fixing)?;
    tracing::info!(
        hedge_id = %fixing.transaction_id,
        voucher = hedge_voucher,
        kind = fixing.fixing_type.as_str(),
        "hedge record opened"
    );
    Ok(fixing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Db;
    use bullion_core::{
        ItemTotal, MetalRateRequirements, TotalSummary, TransactionType, VatCharge,
    };
    use rust_decimal_macros::dec;

    fn stock_item() -> StockItem {
        StockItem {
            stock_code: "BAR-1".into(),
            pieces: 1,
            gross_weight: dec!(100),
            purity: dec!(0.995),
            purity_std: dec!(0.995),
            pure_weight: None,
            item_total: ItemTotal {
                base_amount: dec!(21700),
                making_charges_total: Decimal::ZERO,
                premium_total: Decimal::ZERO,
            },
            metal_rate: dec!(218.34),
            metal_rate_requirements: MetalRateRequirements {
                rate_in_gram: dec!(218.34),
                bid_value: dec!(2040),
                current_bid_value: dec!(2043.5),
            },
            purity_difference: None,
            pass_purity_diff: None,
            exclude_vat: None,
            vat_on_making: None,
            currency_code: None,
            currency_rate: None,
            fx_gain: None,
            fx_loss: None,
            vat: VatCharge {
                amount: Decimal::ZERO,
            },
        }
    }

    fn transaction(tx_type: TransactionType) -> MetalTransaction {
        MetalTransaction {
            id: Uuid::new_v4(),
            transaction_type: tx_type,
            fixed: false,
            unfix: true,
            hedge: true,
            party_code: "P001".into(),
            party_currency: "AED".into(),
            item_currency: "AED".into(),
            base_currency: "AED".into(),
            voucher_date: Utc::now(),
            voucher_number: "PV-010".into(),
            hedge_voucher_number: None,
            stock_items: vec![stock_item()],
            other_charges: Vec::new(),
            total_summary: TotalSummary {
                item_total_amount: dec!(21700),
                total_vat_amount: Decimal::ZERO,
                net_amount: dec!(21700),
            },
            deal_order_id: None,
            created_by: "admin".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn sequential_vouchers_are_unique() {
        let provider = SequentialVoucherProvider::new();
        let first = provider.next_hedge_voucher();
        let second = provider.next_hedge_voucher();
        assert_ne!(first, second);
        assert!(first.starts_with("HV-"));
    }

    #[test]
    fn hedge_record_uses_family_prefix() {
        let db = Db::open_in_memory().unwrap();
        let tx = transaction(TransactionType::Purchase);
        let fixing = db
            .with_session(|session| {
                record_transaction_fixing(
                    session,
                    &tx,
                    "HV-20260830-00001",
                    &mut rand::thread_rng(),
                )
            })
            .unwrap();
        assert!(fixing.transaction_id.starts_with(ids::HEDGE_PREFIX_PARTY));
        assert_eq!(fixing.fixing_type, HedgeKind::SaleHedge);
        assert_eq!(fixing.voucher_number, "HV-20260830-00001");
        assert_eq!(fixing.reference_number, "PV-010");
        assert_eq!(fixing.orders.len(), 1);
        assert_eq!(fixing.orders[0].purity, Decimal::ONE);
        assert_eq!(fixing.orders[0].pure_weight, dec!(99.500));

        db.read(|conn| {
            let stored = fixing_store::fixings_for_transaction(conn, tx.id)?;
            assert_eq!(stored.len(), 1);
            assert!(fixing_store::fixing_id_taken(conn, &fixing.transaction_id));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn generated_ids_avoid_existing_rows() {
        let db = Db::open_in_memory().unwrap();
        let first_tx = transaction(TransactionType::Sale);
        let second_tx = transaction(TransactionType::Sale);
        let (first, second) = db
            .with_session(|session| {
                let first = record_transaction_fixing(
                    session,
                    &first_tx,
                    "HV-1",
                    &mut rand::thread_rng(),
                )?;
                let second = record_transaction_fixing(
                    session,
                    &second_tx,
                    "HV-2",
                    &mut rand::thread_rng(),
                )?;
                Ok((first, second))
            })
            .unwrap();
        assert_ne!(first.transaction_id, second.transaction_id);
        assert!(first.transaction_id.starts_with(ids::HEDGE_PREFIX_HOUSE));
    }

    #[test]
    fn price_snapshot_rows_per_line() {
        let db = Db::open_in_memory().unwrap();
        let tx = transaction(TransactionType::Purchase);
        db.with_session(|session| {
            record_fixing_prices(session, &tx);
            Ok(())
        })
        .unwrap();
        db.read(|conn| {
            let prices = fixing_store::prices_for_transaction(conn, tx.id)?;
            assert_eq!(prices.len(), 1);
            assert_eq!(prices[0].status, FixingStatus::Active);
            assert_eq!(prices[0].current_bid_value, dec!(2043.5));
            Ok(())
        })
        .unwrap();
    }
}
