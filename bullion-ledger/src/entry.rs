use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Closed set of posting classes written to the registry. The wire strings
/// are consumed by downstream reports and must never change.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum PostingClass {
    #[serde(rename = "PARTY_GOLD_BALANCE")]
    PartyGoldBalance,
    #[serde(rename = "PARTY_CASH_BALANCE")]
    PartyCashBalance,
    #[serde(rename = "PARTY_HEDGE_ENTRY")]
    PartyHedgeEntry,
    #[serde(rename = "HEDGE_ENTRY")]
    HedgeEntry,
    #[serde(rename = "PARTY-GOLD")]
    PartyGold,
    #[serde(rename = "PARTY_MAKING_CHARGES")]
    PartyMakingCharges,
    #[serde(rename = "MAKING_CHARGES")]
    MakingCharges,
    #[serde(rename = "FX_EXCHANGE")]
    FxExchange,
    #[serde(rename = "OTHER-CHARGE")]
    OtherCharge,
    #[serde(rename = "PARTY_VAT_AMOUNT")]
    PartyVatAmount,
    #[serde(rename = "VAT_AMOUNT")]
    VatAmount,
    #[serde(rename = "PARTY_PREMIUM")]
    PartyPremium,
    #[serde(rename = "PREMIUM")]
    Premium,
    #[serde(rename = "PARTY_DISCOUNT")]
    PartyDiscount,
    #[serde(rename = "DISCOUNT")]
    Discount,
    #[serde(rename = "GOLD")]
    Gold,
    #[serde(rename = "GOLD_STOCK")]
    GoldStock,
    #[serde(rename = "PURITY_DIFFERENCE")]
    PurityDifference,
}

impl PostingClass {
    pub fn as_str(self) -> &'static str {
        match self {
            PostingClass::PartyGoldBalance => "PARTY_GOLD_BALANCE",
            PostingClass::PartyCashBalance => "PARTY_CASH_BALANCE",
            PostingClass::PartyHedgeEntry => "PARTY_HEDGE_ENTRY",
            PostingClass::HedgeEntry => "HEDGE_ENTRY",
            PostingClass::PartyGold => "PARTY-GOLD",
            PostingClass::PartyMakingCharges => "PARTY_MAKING_CHARGES",
            PostingClass::MakingCharges => "MAKING_CHARGES",
            PostingClass::FxExchange => "FX_EXCHANGE",
            PostingClass::OtherCharge => "OTHER-CHARGE",
            PostingClass::PartyVatAmount => "PARTY_VAT_AMOUNT",
            PostingClass::VatAmount => "VAT_AMOUNT",
            PostingClass::PartyPremium => "PARTY_PREMIUM",
            PostingClass::Premium => "PREMIUM",
            PostingClass::PartyDiscount => "PARTY_DISCOUNT",
            PostingClass::Discount => "DISCOUNT",
            PostingClass::Gold => "GOLD",
            PostingClass::GoldStock => "GOLD_STOCK",
            PostingClass::PurityDifference => "PURITY_DIFFERENCE",
        }
    }

    /// Metal legs carry weight and purity metadata; cash legs carry money.
    pub fn is_bullion(self) -> bool {
        matches!(
            self,
            PostingClass::PartyGoldBalance
                | PostingClass::PartyHedgeEntry
                | PostingClass::HedgeEntry
                | PostingClass::PartyGold
                | PostingClass::Gold
                | PostingClass::GoldStock
                | PostingClass::PurityDifference
        )
    }
}

impl fmt::Display for PostingClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostingClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PARTY_GOLD_BALANCE" => Ok(PostingClass::PartyGoldBalance),
            "PARTY_CASH_BALANCE" => Ok(PostingClass::PartyCashBalance),
            "PARTY_HEDGE_ENTRY" => Ok(PostingClass::PartyHedgeEntry),
            "HEDGE_ENTRY" => Ok(PostingClass::HedgeEntry),
            "PARTY-GOLD" => Ok(PostingClass::PartyGold),
            "PARTY_MAKING_CHARGES" => Ok(PostingClass::PartyMakingCharges),
            "MAKING_CHARGES" => Ok(PostingClass::MakingCharges),
            "FX_EXCHANGE" => Ok(PostingClass::FxExchange),
            "OTHER-CHARGE" => Ok(PostingClass::OtherCharge),
            "PARTY_VAT_AMOUNT" => Ok(PostingClass::PartyVatAmount),
            "VAT_AMOUNT" => Ok(PostingClass::VatAmount),
            "PARTY_PREMIUM" => Ok(PostingClass::PartyPremium),
            "PREMIUM" => Ok(PostingClass::Premium),
            "PARTY_DISCOUNT" => Ok(PostingClass::PartyDiscount),
            "DISCOUNT" => Ok(PostingClass::Discount),
            "GOLD" => Ok(PostingClass::Gold),
            "GOLD_STOCK" => Ok(PostingClass::GoldStock),
            "PURITY_DIFFERENCE" => Ok(PostingClass::PurityDifference),
            other => Err(format!("unknown posting class: {other}")),
        }
    }
}

/// Human-readable type tags retained on zero-value rows: unpriced or
/// fixing metal legs legitimately post with no valuation.
const ZERO_VALUE_TAGS: [&str; 4] = [
    "purchase-fixing",
    "sale-fixing",
    "purchase-unfix",
    "sale-unfix",
];

/// One immutable ledger posting. Exactly one of `debit`/`credit` is
/// non-zero; the cash/gold quad mirrors it so downstream readers can
/// filter on either representation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    pub id: Uuid,
    /// Group key shared by every row of one posting run (`TXN...`).
    pub transaction_id: String,
    pub metal_transaction_id: Uuid,
    /// Human-readable tag, e.g. `purchase`, `sale-fixing`, `purchase-unfix`.
    pub transaction_type: String,
    #[serde(rename = "type")]
    pub entry_type: PostingClass,
    pub description: String,
    pub party: Option<String>,
    pub is_bullion: bool,
    pub value: Decimal,
    pub debit: Decimal,
    pub credit: Decimal,
    pub cash_debit: Decimal,
    pub cash_credit: Decimal,
    pub gold_debit: Decimal,
    pub gold_credit: Decimal,
    pub gold_bid_value: Decimal,
    pub gross_weight: Decimal,
    pub pure_weight: Decimal,
    pub purity: Decimal,
    pub transaction_date: DateTime<Utc>,
    /// Voucher for party rows, hedge voucher for counterpart hedge rows.
    pub reference: String,
    pub hedge_reference: Option<String>,
    /// Currency code of the cash leg.
    pub asset_type: String,
    pub currency_rate: Decimal,
    pub deal_order_id: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub running_balance: Decimal,
    pub previous_balance: Decimal,
}

impl RegistryEntry {
    pub fn new(
        entry_type: PostingClass,
        transaction_id: impl Into<String>,
        metal_transaction_id: Uuid,
        transaction_type: impl Into<String>,
        transaction_date: DateTime<Utc>,
        reference: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            transaction_id: transaction_id.into(),
            metal_transaction_id,
            transaction_type: transaction_type.into(),
            entry_type,
            description: String::new(),
            party: None,
            is_bullion: entry_type.is_bullion(),
            value: Decimal::ZERO,
            debit: Decimal::ZERO,
            credit: Decimal::ZERO,
            cash_debit: Decimal::ZERO,
            cash_credit: Decimal::ZERO,
            gold_debit: Decimal::ZERO,
            gold_credit: Decimal::ZERO,
            gold_bid_value: Decimal::ZERO,
            gross_weight: Decimal::ZERO,
            pure_weight: Decimal::ZERO,
            purity: Decimal::ZERO,
            transaction_date,
            reference: reference.into(),
            hedge_reference: None,
            asset_type: "AED".to_string(),
            currency_rate: Decimal::ONE,
            deal_order_id: None,
            created_by: created_by.into(),
            created_at: Utc::now(),
            running_balance: Decimal::ZERO,
            previous_balance: Decimal::ZERO,
        }
    }

    /// Place `amount` on the debit side, mirrored into the cash or gold
    /// quad depending on the leg kind.
    pub fn debit(mut self, amount: Decimal) -> Self {
        self.debit = amount;
        if self.is_bullion {
            self.gold_debit = amount;
        } else {
            self.cash_debit = amount;
        }
        self
    }

    /// Place `amount` on the credit side, mirrored into the quad.
    pub fn credit(mut self, amount: Decimal) -> Self {
        self.credit = amount;
        if self.is_bullion {
            self.gold_credit = amount;
        } else {
            self.cash_credit = amount;
        }
        self
    }

    /// Debit carried in the summary pair only. Used by statistical rows
    /// (gross stock, purity difference, FX) that have no quad counterpart.
    pub fn debit_memo(mut self, amount: Decimal) -> Self {
        self.debit = amount;
        self
    }

    pub fn credit_memo(mut self, amount: Decimal) -> Self {
        self.credit = amount;
        self
    }

    /// Raw cash-quad setter for rows whose summary pair is denominated in
    /// grams but whose monetary counterweight sits on the cash leg
    /// (fixing and hedge rows).
    pub fn with_cash_quad(mut self, debit: Decimal, credit: Decimal) -> Self {
        self.cash_debit = debit;
        self.cash_credit = credit;
        self
    }

    pub fn with_value(mut self, value: Decimal) -> Self {
        self.value = value;
        self
    }

    pub fn with_party(mut self, party: impl Into<String>) -> Self {
        self.party = Some(party.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_weights(mut self, gross: Decimal, pure: Decimal, purity: Decimal) -> Self {
        self.gross_weight = gross;
        self.pure_weight = pure;
        self.purity = purity;
        self
    }

    pub fn with_currency(mut self, asset_type: impl Into<String>, rate: Decimal) -> Self {
        self.asset_type = asset_type.into();
        self.currency_rate = rate;
        self
    }

    pub fn with_bid(mut self, bid: Decimal) -> Self {
        self.gold_bid_value = bid;
        self
    }

    pub fn with_hedge_reference(mut self, hedge_voucher: impl Into<String>) -> Self {
        self.hedge_reference = Some(hedge_voucher.into());
        self
    }

    pub fn with_deal_order(mut self, deal_order_id: Option<String>) -> Self {
        self.deal_order_id = deal_order_id;
        self
    }

    pub fn with_balance_chain(mut self, previous: Decimal, running: Decimal) -> Self {
        self.previous_balance = previous;
        self.running_balance = running;
        self
    }

    /// Zero-value rows are dropped before insert unless their class or tag
    /// is allow-listed.
    pub fn retains_zero_value(&self) -> bool {
        matches!(
            self.entry_type,
            PostingClass::HedgeEntry
                | PostingClass::PartyCashBalance
                | PostingClass::PartyGoldBalance
        ) || ZERO_VALUE_TAGS.contains(&self.transaction_type.as_str())
    }
}
