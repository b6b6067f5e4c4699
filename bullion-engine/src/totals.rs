//! Line totaliser: folds stock lines into one normalised totals record.
//!
//! Pure over validated input; every downstream component (entry builder,
//! balance vector, hedge recorder) consumes this shape instead of raw lines.

use rust_decimal::Decimal;

use bullion_core::{StockItem, TotalSummary};

/// Normalised totals over one or more stock lines.
#[derive(Clone, Debug, Default)]
pub struct LineTotals {
    pub stock_code: String,
    pub pieces: i64,
    pub making_charges: Decimal,
    pub premium: Decimal,
    pub discount: Decimal,
    pub vat_amount: Decimal,
    /// Base amount of the gold leg.
    pub gold_value: Decimal,
    pub gross_weight: Decimal,
    /// Pure weight actually carried on postings, after the purity
    /// pass-through decision.
    pub pure_weight: Decimal,
    pub pure_weight_std: Decimal,
    pub purity: Decimal,
    pub purity_std: Decimal,
    pub purity_difference: Decimal,
    pub metal_rate: Decimal,
    pub rate_in_gram: Decimal,
    pub bid_value: Decimal,
    pub current_bid_value: Decimal,
    pub currency_code: Option<String>,
    pub currency_rate: Decimal,
    pub exclude_vat: bool,
    pub vat_on_making: bool,
    pub fx_gain: Decimal,
    pub fx_loss: Decimal,
    /// `totalSummary.itemTotalAmount`, the priced total used in fix mode.
    pub total_amount: Decimal,
}

/// Fold `lines` into a totals record. `is_registry` applies each line's
/// currency rate so registry rows come out in base currency; balance
/// updates pass `false` and stay in party currency.
pub fn totalize(lines: &[StockItem], summary: &TotalSummary, is_registry: bool) -> LineTotals {
    let mut totals = LineTotals {
        currency_rate: Decimal::ONE,
        total_amount: summary.item_total_amount,
        ..LineTotals::default()
    };

    for line in lines {
        let fx = if is_registry {
            line.currency_rate.unwrap_or(Decimal::ONE)
        } else {
            Decimal::ONE
        };

        totals.making_charges += line.item_total.making_charges_total * fx;
        let premium = line.item_total.premium_total;
        if premium > Decimal::ZERO {
            totals.premium += premium * fx;
        } else {
            totals.discount += premium.abs() * fx;
        }
        totals.vat_amount += line.vat.amount * fx;
        totals.gold_value += line.item_total.base_amount * fx;

        totals.gross_weight += line.gross_weight;
        let pure_std = line.purity_std * line.gross_weight;
        totals.pure_weight_std += pure_std;

        let difference = line.purity_difference.unwrap_or(Decimal::ZERO);
        let pass = line.pass_purity_diff.unwrap_or(false);
        if difference > Decimal::ZERO && pass {
            // Supplier's measured purity is passed through to the party.
            totals.pure_weight += line
                .pure_weight
                .unwrap_or(line.purity * line.gross_weight);
            totals.purity = line.purity;
        } else {
            totals.pure_weight += pure_std;
            totals.purity = line.purity_std;
        }
        totals.purity_difference += difference;
        totals.purity_std = line.purity_std;

        totals.pieces += line.pieces;
        totals.metal_rate = line.metal_rate;
        totals.rate_in_gram = line.metal_rate_requirements.rate_in_gram;
        totals.bid_value = line.metal_rate_requirements.bid_value;
        totals.current_bid_value = line.metal_rate_requirements.current_bid_value;
        if line.currency_code.is_some() {
            totals.currency_code = line.currency_code.clone();
        }
        if let Some(rate) = line.currency_rate {
            totals.currency_rate = rate;
        }
        if let Some(exclude) = line.exclude_vat {
            totals.exclude_vat = exclude;
        }
        if let Some(on_making) = line.vat_on_making {
            totals.vat_on_making = on_making;
        }
        totals.fx_gain += line.fx_gain.unwrap_or(Decimal::ZERO);
        totals.fx_loss += line.fx_loss.unwrap_or(Decimal::ZERO);
        if totals.stock_code.is_empty() {
            totals.stock_code = line.stock_code.clone();
        }
    }

    totals
}
