use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::TransactionType;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixingStatus {
    Active,
    Closed,
}

impl FixingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FixingStatus::Active => "active",
            FixingStatus::Closed => "closed",
        }
    }
}

/// Which side of the book the hedge sits on. A purchase of physical metal
/// is offset by selling a hedge, and vice versa.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum HedgeKind {
    #[serde(rename = "SALE-HEDGE")]
    SaleHedge,
    #[serde(rename = "PURCHASE-HEDGE")]
    PurchaseHedge,
}

impl HedgeKind {
    pub fn for_transaction(tx_type: TransactionType) -> Self {
        if tx_type.is_purchase_family() {
            HedgeKind::SaleHedge
        } else {
            HedgeKind::PurchaseHedge
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HedgeKind::SaleHedge => "SALE-HEDGE",
            HedgeKind::PurchaseHedge => "PURCHASE-HEDGE",
        }
    }
}

impl fmt::Display for HedgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Price snapshot persisted when a transaction is posted in fix mode.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixingPrice {
    pub id: Uuid,
    pub metal_transaction_id: Uuid,
    pub metal_rate: Decimal,
    pub rate_in_gram: Decimal,
    pub bid_value: Decimal,
    pub current_bid_value: Decimal,
    pub entered_by: String,
    pub created_at: DateTime<Utc>,
    pub status: FixingStatus,
}

/// Single order carried on a [`TransactionFixing`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixingOrder {
    pub commodity: String,
    pub gross_weight: Decimal,
    pub pure_weight: Decimal,
    pub one_gram_rate: Decimal,
    pub bid_value: Decimal,
    pub current_bid_value: Decimal,
    pub currency: String,
    /// Hedge orders are always carried at full purity.
    pub purity: Decimal,
    pub price: Decimal,
    pub metal_type: String,
}

/// Hedge record opened alongside a commercial transaction when `hedge` is
/// requested. `transaction_id` is the generated `HSM`/`HPM` identifier.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFixing {
    pub id: Uuid,
    pub transaction_id: String,
    pub metal_transaction_id: Uuid,
    pub fixing_type: HedgeKind,
    pub party_code: String,
    /// The hedge voucher assigned to the parent transaction.
    pub voucher_number: String,
    /// The commercial voucher of the parent transaction.
    pub reference_number: String,
    pub orders: Vec<FixingOrder>,
    pub status: FixingStatus,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hedge_kind_by_family() {
        assert_eq!(
            HedgeKind::for_transaction(TransactionType::Purchase),
            HedgeKind::SaleHedge
        );
        assert_eq!(
            HedgeKind::for_transaction(TransactionType::PurchaseReturn),
            HedgeKind::SaleHedge
        );
        assert_eq!(
            HedgeKind::for_transaction(TransactionType::Sale),
            HedgeKind::PurchaseHedge
        );
        assert_eq!(
            HedgeKind::for_transaction(TransactionType::ExportSaleReturn),
            HedgeKind::PurchaseHedge
        );
        assert_eq!(HedgeKind::SaleHedge.as_str(), "SALE-HEDGE");
    }
}
