//! Party balance updater. The per-line change vector is a fixed function of
//! `(type, mode)`: unfixed lines move grams, gold value and the money
//! components separately; fixed lines move only the priced settlement total.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;

use bullion_core::{OtherCharge, TransactionMode, TransactionType};

use crate::error::EngineResult;
use crate::store::party;
use crate::totals::LineTotals;

/// Signed deltas to apply to one party's balances, in party currency.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceChange {
    pub gold_grams: Decimal,
    pub gold_value: Decimal,
    pub making: Decimal,
    pub premium: Decimal,
    pub discount: Decimal,
    pub vat: Decimal,
    /// Settlement total of fixed lines; zero for unfixed lines.
    pub fixed_total: Decimal,
}

impl BalanceChange {
    /// Net cash movement: the sum of the cash-bearing components.
    pub fn net_cash(&self) -> Decimal {
        self.making + self.premium + self.discount + self.vat + self.fixed_total
    }

    pub fn negate(&self) -> BalanceChange {
        BalanceChange {
            gold_grams: -self.gold_grams,
            gold_value: -self.gold_value,
            making: -self.making,
            premium: -self.premium,
            discount: -self.discount,
            vat: -self.vat,
            fixed_total: -self.fixed_total,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == BalanceChange::default()
    }
}

/// Change vector for one line. The sign follows the party-credit direction
/// of the transaction type; discounts run against it.
pub fn balance_vector(
    transaction_type: TransactionType,
    mode: TransactionMode,
    totals: &LineTotals,
) -> BalanceChange {
    let sign = if transaction_type.credits_party() {
        Decimal::ONE
    } else {
        Decimal::NEGATIVE_ONE
    };
    match mode {
        TransactionMode::Unfix => BalanceChange {
            gold_grams: sign * totals.pure_weight,
            gold_value: sign * totals.gold_value,
            making: sign * totals.making_charges,
            premium: sign * totals.premium,
            discount: -sign * totals.discount,
            vat: if totals.exclude_vat {
                Decimal::ZERO
            } else {
                sign * totals.vat_amount
            },
            fixed_total: Decimal::ZERO,
        },
        TransactionMode::Fix => BalanceChange {
            fixed_total: sign * totals.total_amount,
            ..BalanceChange::default()
        },
    }
}

/// Apply an accumulated change vector to the party's stored balances.
pub fn apply_party_change(
    conn: &Connection,
    party_code: &str,
    currency: &str,
    change: &BalanceChange,
    now: DateTime<Utc>,
) -> EngineResult<()> {
    if change.is_zero() {
        return Ok(());
    }
    party::ensure_cash_row(conn, party_code, currency)?;
    party::inc_cash(conn, party_code, currency, change.net_cash(), now)?;
    party::inc_gold(conn, party_code, change.gold_grams, change.gold_value, now)?;
    tracing::debug!(
        party = party_code,
        cash = %change.net_cash(),
        grams = %change.gold_grams,
        "party balances updated"
    );
    Ok(())
}

/// Apply other-charge account movements. Debit legs decrease the account
/// balance, credit legs increase it; VAT rides on both legs. `sign` is `1`
/// for posting and `-1` for reversal.
pub fn apply_other_charges(
    conn: &Connection,
    charges: &[OtherCharge],
    fallback_currency: &str,
    sign: Decimal,
    now: DateTime<Utc>,
) -> EngineResult<()> {
    for charge in charges {
        let vat_amount = charge
            .vat_details
            .as_ref()
            .map(|vat| vat.vat_amount)
            .unwrap_or(Decimal::ZERO);

        let legs = [(&charge.debit, Decimal::NEGATIVE_ONE), (&charge.credit, Decimal::ONE)];
        for (leg, direction) in legs {
            let amount = if leg.amount.is_zero() {
                leg.base_amount
            } else {
                leg.amount
            };
            let delta = sign * direction * (amount + vat_amount);
            if delta.is_zero() {
                continue;
            }
            let currency = leg
                .currency_code
                .as_deref()
                .unwrap_or(fallback_currency);
            party::ensure_account(conn, &leg.account)?;
            party::ensure_cash_row(conn, &leg.account, currency)?;
            party::inc_cash(conn, &leg.account, currency, delta, now)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Db;
    use crate::totals::totalize;
    use bullion_core::{
        ChargeLeg, ItemTotal, MetalRateRequirements, Party, StockItem, TotalSummary, VatCharge,
        VatDetails,
    };
    use rust_decimal_macros::dec;

    fn line() -> StockItem {
        StockItem {
            stock_code: "G24-001".into(),
            pieces: 0,
            gross_weight: dec!(100),
            purity: dec!(0.916),
            purity_std: dec!(0.916),
            pure_weight: None,
            item_total: ItemTotal {
                base_amount: dec!(20000),
                making_charges_total: dec!(500),
                premium_total: dec!(0),
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
            vat: VatCharge { amount: dec!(1025) },
        }
    }

    fn summary() -> TotalSummary {
        TotalSummary {
            item_total_amount: dec!(21525),
            total_vat_amount: dec!(1025),
            net_amount: dec!(21525),
        }
    }

    #[test]
    fn unfixed_purchase_vector_credits_gold_and_charges() {
        let totals = totalize(&[line()], &summary(), false);
        let change = balance_vector(
            TransactionType::Purchase,
            TransactionMode::Unfix,
            &totals,
        );
        assert_eq!(change.gold_grams, dec!(91.6));
        assert_eq!(change.gold_value, dec!(20000));
        assert_eq!(change.net_cash(), dec!(1525));
        assert_eq!(change.fixed_total, Decimal::ZERO);
    }

    #[test]
    fn fixed_sale_vector_moves_settlement_only() {
        let totals = totalize(&[line()], &summary(), false);
        let change = balance_vector(TransactionType::Sale, TransactionMode::Fix, &totals);
        assert_eq!(change.gold_grams, Decimal::ZERO);
        assert_eq!(change.gold_value, Decimal::ZERO);
        assert_eq!(change.net_cash(), dec!(-21525));
    }

    #[test]
    fn negate_round_trips() {
        let totals = totalize(&[line()], &summary(), false);
        let change = balance_vector(
            TransactionType::SaleReturn,
            TransactionMode::Unfix,
            &totals,
        );
        assert_eq!(change.negate().negate(), change);
        assert_eq!(
            change.net_cash() + change.negate().net_cash(),
            Decimal::ZERO
        );
    }

    #[test]
    fn other_charges_move_both_accounts_with_vat() {
        let db = Db::open_in_memory().unwrap();
        let now = Utc::now();
        let charge = OtherCharge {
            description: "Freight".into(),
            debit: ChargeLeg {
                account: "ACC-X".into(),
                base_amount: dec!(100),
                amount: dec!(100),
                currency_code: None,
            },
            credit: ChargeLeg {
                account: "ACC-Y".into(),
                base_amount: dec!(100),
                amount: dec!(100),
                currency_code: None,
            },
            vat_details: Some(VatDetails {
                vat_rate: dec!(5),
                vat_amount: dec!(5),
            }),
        };
        db.with_session(|tx| apply_other_charges(tx, &[charge.clone()], "AED", Decimal::ONE, now))
            .unwrap();
        db.read(|conn| {
            assert_eq!(party::cash_amount(conn, "ACC-X", "AED")?, dec!(-105));
            assert_eq!(party::cash_amount(conn, "ACC-Y", "AED")?, dec!(105));
            Ok(())
        })
        .unwrap();

        // Reversal restores both accounts exactly.
        db.with_session(|tx| {
            apply_other_charges(tx, &[charge], "AED", Decimal::NEGATIVE_ONE, now)
        })
        .unwrap();
        db.read(|conn| {
            assert_eq!(party::cash_amount(conn, "ACC-X", "AED")?, Decimal::ZERO);
            assert_eq!(party::cash_amount(conn, "ACC-Y", "AED")?, Decimal::ZERO);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn apply_party_change_updates_stored_balances() {
        let db = Db::open_in_memory().unwrap();
        let now = Utc::now();
        db.with_session(|tx| party::insert(tx, &Party::new("P001", "Al Noor")))
            .unwrap();

        let totals = totalize(&[line()], &summary(), false);
        let change = balance_vector(
            TransactionType::Purchase,
            TransactionMode::Unfix,
            &totals,
        );
        db.with_session(|tx| apply_party_change(tx, "P001", "AED", &change, now))
            .unwrap();

        db.read(|conn| {
            let stored = party::find(conn, "P001")?.unwrap();
            assert_eq!(stored.balances.gold_balance.total_grams, dec!(91.6));
            assert_eq!(stored.balances.gold_balance.total_value, dec!(20000));
            assert_eq!(party::cash_amount(conn, "P001", "AED")?, dec!(1525));
            Ok(())
        })
        .unwrap();
    }
}
