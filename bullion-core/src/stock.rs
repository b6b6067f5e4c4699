use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::TransactionType;

/// Unit used to price making charges on a SKU.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MakingUnit {
    Grams,
    Pieces,
    Percentage,
}

/// Stock-keeping unit for physical metal.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetalStock {
    pub id: Uuid,
    pub code: String,
    pub metal_type: String,
    pub karat: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub colour: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Pieces-tracked (true) versus weight-tracked.
    pub pcs: bool,
    /// Decimal purity in `[0, 1]`; karat masters holding percent are
    /// converted on sync via [`purity_from_percent`](Self::purity_from_percent).
    pub standard_purity: Decimal,
    #[serde(default)]
    pub pass_purity_diff: bool,
    #[serde(default)]
    pub exclude_vat: bool,
    #[serde(default)]
    pub vat_on_making: bool,
    /// Present on the master but not consumed by the posting engine.
    #[serde(default)]
    pub wastage: bool,
    #[serde(default)]
    pub making_unit: Option<MakingUnit>,
}

impl MetalStock {
    /// Karat masters store purity as percent; stock stores decimal.
    pub fn purity_from_percent(percent: Decimal) -> Decimal {
        percent / Decimal::ONE_HUNDRED
    }
}

/// Running physical balance per SKU. Seeded with zeros when the SKU is
/// created and adjusted only through the posting engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    pub stock_code: String,
    pub pcs_count: i64,
    pub gross_weight: Decimal,
    /// Always `gross_weight * purity`, recomputed on every adjustment.
    pub pure_weight: Decimal,
    pub purity: Decimal,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryAction {
    Add,
    Remove,
}

impl InventoryAction {
    pub fn as_str(self) -> &'static str {
        match self {
            InventoryAction::Add => "add",
            InventoryAction::Remove => "remove",
        }
    }
}

/// Append-only audit row written alongside every inventory adjustment.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryLog {
    pub id: Uuid,
    pub stock_code: String,
    pub voucher_number: String,
    pub voucher_date: DateTime<Utc>,
    pub transaction_type: TransactionType,
    pub action: InventoryAction,
    pub gross_weight: Decimal,
    pub pcs: bool,
    #[serde(default)]
    pub is_draft: Option<bool>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}
