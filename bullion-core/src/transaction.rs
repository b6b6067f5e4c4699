use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The eight commercial event kinds handled by the posting engine.
///
/// Wire strings are stable; downstream reports match on them verbatim.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionType {
    Purchase,
    Sale,
    PurchaseReturn,
    SaleReturn,
    ImportPurchase,
    ImportPurchaseReturn,
    ExportSale,
    ExportSaleReturn,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Purchase => "purchase",
            TransactionType::Sale => "sale",
            TransactionType::PurchaseReturn => "purchaseReturn",
            TransactionType::SaleReturn => "saleReturn",
            TransactionType::ImportPurchase => "importPurchase",
            TransactionType::ImportPurchaseReturn => "importPurchaseReturn",
            TransactionType::ExportSale => "exportSale",
            TransactionType::ExportSaleReturn => "exportSaleReturn",
        }
    }

    /// True for the column of the directional matrix where the party is
    /// credited: purchases and sale-returns bring metal into the house.
    pub fn credits_party(self) -> bool {
        matches!(
            self,
            TransactionType::Purchase
                | TransactionType::ImportPurchase
                | TransactionType::SaleReturn
                | TransactionType::ExportSaleReturn
        )
    }

    /// Signed direction applied to physical inventory. Matches
    /// [`credits_party`](Self::credits_party): metal received is `+1`.
    pub fn inventory_factor(self) -> i8 {
        if self.credits_party() {
            1
        } else {
            -1
        }
    }

    /// True for the purchase family (including its returns), used to pick
    /// the hedge id prefix and hedge kind.
    pub fn is_purchase_family(self) -> bool {
        matches!(
            self,
            TransactionType::Purchase
                | TransactionType::ImportPurchase
                | TransactionType::PurchaseReturn
                | TransactionType::ImportPurchaseReturn
        )
    }

}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "purchase" => Ok(TransactionType::Purchase),
            "sale" => Ok(TransactionType::Sale),
            "purchaseReturn" => Ok(TransactionType::PurchaseReturn),
            "saleReturn" => Ok(TransactionType::SaleReturn),
            "importPurchase" => Ok(TransactionType::ImportPurchase),
            "importPurchaseReturn" => Ok(TransactionType::ImportPurchaseReturn),
            "exportSale" => Ok(TransactionType::ExportSale),
            "exportSaleReturn" => Ok(TransactionType::ExportSaleReturn),
            other => Err(format!("unknown transaction type: {other}")),
        }
    }
}

/// Whether the gold leg is priced (fix) or carried as a metal balance (unfix).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionMode {
    Fix,
    Unfix,
}

impl TransactionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionMode::Fix => "fix",
            TransactionMode::Unfix => "unfix",
        }
    }
}

/// Per-line monetary subtotal coming from the validated request.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemTotal {
    #[serde(default)]
    pub base_amount: Decimal,
    #[serde(default)]
    pub making_charges_total: Decimal,
    #[serde(default)]
    pub premium_total: Decimal,
}

/// Market snapshot attached to a line at entry time.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetalRateRequirements {
    #[serde(default)]
    pub rate_in_gram: Decimal,
    #[serde(default)]
    pub bid_value: Decimal,
    #[serde(default)]
    pub current_bid_value: Decimal,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VatCharge {
    #[serde(default)]
    pub amount: Decimal,
}

/// One stock line of a commercial transaction.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub stock_code: String,
    #[serde(default)]
    pub pieces: i64,
    pub gross_weight: Decimal,
    /// Line-level tested purity, decimal in `[0, 1]`.
    pub purity: Decimal,
    /// Standard purity copied from the SKU master.
    pub purity_std: Decimal,
    /// Optional override; when absent `purity * gross_weight` is used.
    #[serde(default)]
    pub pure_weight: Option<Decimal>,
    #[serde(default)]
    pub item_total: ItemTotal,
    #[serde(default)]
    pub metal_rate: Decimal,
    #[serde(default)]
    pub metal_rate_requirements: MetalRateRequirements,
    #[serde(default)]
    pub purity_difference: Option<Decimal>,
    /// Line overrides for SKU policy flags; `None` defers to the SKU.
    #[serde(default)]
    pub pass_purity_diff: Option<bool>,
    #[serde(default)]
    pub exclude_vat: Option<bool>,
    #[serde(default)]
    pub vat_on_making: Option<bool>,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub currency_rate: Option<Decimal>,
    #[serde(default, rename = "FXGain")]
    pub fx_gain: Option<Decimal>,
    #[serde(default, rename = "FXLoss")]
    pub fx_loss: Option<Decimal>,
    #[serde(default)]
    pub vat: VatCharge,
}

/// One side of an other-charge entry: the account it hits and the amount
/// expressed in base currency and in the charge's own currency.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeLeg {
    pub account: String,
    #[serde(default, rename = "baseCurrency")]
    pub base_amount: Decimal,
    #[serde(default, rename = "currency")]
    pub amount: Decimal,
    #[serde(default)]
    pub currency_code: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VatDetails {
    #[serde(default)]
    pub vat_rate: Decimal,
    #[serde(default)]
    pub vat_amount: Decimal,
}

/// Arbitrary debit/credit pair attached to a transaction, unrelated to the
/// metal leg.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherCharge {
    pub description: String,
    pub debit: ChargeLeg,
    pub credit: ChargeLeg,
    #[serde(default)]
    pub vat_details: Option<VatDetails>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalSummary {
    #[serde(default)]
    pub item_total_amount: Decimal,
    #[serde(default)]
    pub total_vat_amount: Decimal,
    #[serde(default)]
    pub net_amount: Decimal,
}

/// The commercial event the posting engine consumes. Input is assumed to
/// have passed the request-validation shell already.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetalTransaction {
    pub id: Uuid,
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub fixed: bool,
    #[serde(default)]
    pub unfix: bool,
    #[serde(default)]
    pub hedge: bool,
    pub party_code: String,
    pub party_currency: String,
    pub item_currency: String,
    pub base_currency: String,
    pub voucher_date: DateTime<Utc>,
    pub voucher_number: String,
    /// Assigned exactly once across the transaction lifetime.
    #[serde(default)]
    pub hedge_voucher_number: Option<String>,
    pub stock_items: Vec<StockItem>,
    #[serde(default)]
    pub other_charges: Vec<OtherCharge>,
    #[serde(default)]
    pub total_summary: TotalSummary,
    #[serde(default)]
    pub deal_order_id: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl MetalTransaction {
    /// Resolve the posting mode from the `fixed`/`unfix` pair. Unfix wins
    /// when both are set; neither set defaults to unfix.
    pub fn mode(&self) -> TransactionMode {
        if self.fixed && !self.unfix {
            TransactionMode::Fix
        } else {
            TransactionMode::Unfix
        }
    }
}
