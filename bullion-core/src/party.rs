use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unpriced metal owed to or by the party, in grams plus a valuation.
/// `total_grams` may go negative (short position).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoldBalance {
    pub total_grams: Decimal,
    pub total_value: Decimal,
    pub last_updated: Option<DateTime<Utc>>,
}

/// One cash row per currency; a party holds at most one row per currency id.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashBalance {
    pub currency: String,
    pub amount: Decimal,
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyBalances {
    pub gold_balance: GoldBalance,
    pub cash_balance: Vec<CashBalance>,
    pub last_balance_update: Option<DateTime<Utc>>,
}

/// A tradeable counterparty: customer, supplier, or an other-charge account.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub is_active: bool,
    #[serde(default)]
    pub balances: PartyBalances,
}

impl Party {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            name: name.into(),
            is_active: true,
            balances: PartyBalances::default(),
        }
    }

    /// Cash amount held in `currency`, zero when no row exists yet.
    pub fn cash_amount(&self, currency: &str) -> Decimal {
        self.balances
            .cash_balance
            .iter()
            .find(|row| row.currency == currency)
            .map(|row| row.amount)
            .unwrap_or(Decimal::ZERO)
    }
}
