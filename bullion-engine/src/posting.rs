//! Registry entry builder: turns one stock line's totals into the full set
//! of posting rows for the requested `(type, mode, hedge)` combination.
//!
//! Direction rules: purchases and sale-returns credit the party and debit
//! inventory/expense; sales and purchase-returns flip. Metal legs balance
//! in the gold quad, money legs in the cash quad, and statistical rows
//! (gross stock, purity difference, FX) carry summary amounts only.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use bullion_core::{OtherCharge, Party, TransactionMode, TransactionType};
use bullion_ledger::{PostingClass, RegistryEntry};

use crate::totals::LineTotals;

/// Everything the builder needs besides the line totals.
pub struct BuildContext<'a> {
    pub transaction_type: TransactionType,
    pub mode: TransactionMode,
    pub hedge: bool,
    pub party: &'a Party,
    pub party_currency: &'a str,
    pub base_currency: &'a str,
    pub voucher_date: DateTime<Utc>,
    pub voucher_number: &'a str,
    pub hedge_voucher_number: Option<&'a str>,
    /// Registry group id (`TXN...`) shared by all rows of this posting run.
    pub group_id: &'a str,
    pub metal_transaction_id: Uuid,
    pub created_by: &'a str,
    pub deal_order_id: Option<&'a str>,
    /// Party cash balance before this call, in party currency; threads the
    /// running-balance chain across lines.
    pub opening_cash: Decimal,
}

pub struct BuildOutput {
    pub entries: Vec<RegistryEntry>,
    /// Party cash balance after the chain of this call's party rows.
    pub closing_cash: Decimal,
}

/// Build the posting rows for one line. `other_charges` is passed on the
/// first line of a transaction only; charge rows are per transaction.
pub fn build_entries(
    ctx: &BuildContext<'_>,
    totals: &LineTotals,
    other_charges: &[OtherCharge],
) -> BuildOutput {
    let mut builder = Builder {
        ctx,
        totals,
        cash: ctx.opening_cash,
        entries: Vec::new(),
    };

    builder.metal_leg();
    builder.gold_inventory();
    builder.money_legs();
    builder.fx_legs();
    builder.purity_difference();
    for charge in other_charges {
        builder.other_charge(charge);
    }

    let entries = builder
        .entries
        .into_iter()
        .filter(|entry| entry.value > Decimal::ZERO || entry.retains_zero_value())
        .collect();
    BuildOutput {
        entries,
        closing_cash: builder.cash,
    }
}

struct Builder<'a> {
    ctx: &'a BuildContext<'a>,
    totals: &'a LineTotals,
    cash: Decimal,
    entries: Vec<RegistryEntry>,
}

impl<'a> Builder<'a> {
    fn credits_party(&self) -> bool {
        self.ctx.transaction_type.credits_party()
    }

    fn tag(&self) -> &'static str {
        self.ctx.transaction_type.as_str()
    }

    fn row(&self, class: PostingClass, tag: &str) -> RegistryEntry {
        self.row_with_reference(class, tag, self.ctx.voucher_number)
    }

    fn row_with_reference(&self, class: PostingClass, tag: &str, reference: &str) -> RegistryEntry {
        let currency = self
            .totals
            .currency_code
            .as_deref()
            .unwrap_or(self.ctx.base_currency);
        RegistryEntry::new(
            class,
            self.ctx.group_id,
            self.ctx.metal_transaction_id,
            tag,
            self.ctx.voucher_date,
            reference,
            self.ctx.created_by,
        )
        .with_currency(currency, self.totals.currency_rate)
        .with_deal_order(self.ctx.deal_order_id.map(str::to_string))
    }

    /// Advance the party cash chain over a party-side money row.
    fn chain(&mut self, entry: RegistryEntry) -> RegistryEntry {
        let previous = self.cash;
        self.cash += entry.cash_credit - entry.cash_debit;
        entry.with_balance_chain(previous, self.cash)
    }

    fn metal_leg(&mut self) {
        let totals = self.totals;
        if self.ctx.mode == TransactionMode::Fix {
            self.fixing_rows();
        }
        if self.ctx.hedge {
            self.hedge_rows();
        }
        if self.ctx.mode == TransactionMode::Unfix && !self.ctx.hedge {
            let tag = if self.credits_party() {
                "purchase-unfix"
            } else {
                "sale-unfix"
            };
            let description = if self.credits_party() {
                format!("Unfixed gold payable to {}", self.ctx.party.name)
            } else {
                format!("Unfixed gold receivable from {}", self.ctx.party.name)
            };
            let row = self
                .row(PostingClass::PartyGoldBalance, tag)
                .with_party(&self.ctx.party.code)
                .with_value(totals.gold_value)
                .with_weights(totals.gross_weight, totals.pure_weight, totals.purity)
                .with_bid(totals.current_bid_value)
                .with_description(description);
            let row = if self.credits_party() {
                row.credit(totals.pure_weight)
            } else {
                row.debit(totals.pure_weight)
            };
            self.entries.push(row);
        }
    }

    /// Fix mode transfers the position out of the party gold balance into
    /// priced gold: the `PARTY-GOLD` row carries grams against the cash
    /// counterweight, and the party cash row settles the priced total.
    fn fixing_rows(&mut self) {
        let totals = self.totals;
        let tag = if self.credits_party() {
            "purchase-fixing"
        } else {
            "sale-fixing"
        };
        let fixing = self
            .row(PostingClass::PartyGold, tag)
            .with_party(&self.ctx.party.code)
            .with_value(totals.gold_value)
            .with_weights(totals.gross_weight, totals.pure_weight, totals.purity)
            .with_bid(totals.bid_value)
            .with_description(format!("Gold fixing at {}", totals.metal_rate));
        let fixing = if self.credits_party() {
            fixing
                .credit(totals.pure_weight)
                .with_cash_quad(totals.total_amount, Decimal::ZERO)
        } else {
            fixing
                .debit(totals.pure_weight)
                .with_cash_quad(Decimal::ZERO, totals.total_amount)
        };
        self.entries.push(fixing);

        let settlement = self
            .row(PostingClass::PartyCashBalance, self.tag())
            .with_party(&self.ctx.party.code)
            .with_value(totals.total_amount)
            .with_description(format!(
                "Fixed gold settlement for {}",
                self.ctx.voucher_number
            ));
        let settlement = if self.credits_party() {
            settlement.credit(totals.total_amount)
        } else {
            settlement.debit(totals.total_amount)
        };
        let settlement = self.chain(settlement);
        self.entries.push(settlement);
    }

    /// Hedge triple: party-side gold at bid, a party cash marker, and the
    /// house-side hedge entry referenced by the hedge voucher.
    fn hedge_rows(&mut self) {
        let totals = self.totals;
        let hedge_voucher = self
            .ctx
            .hedge_voucher_number
            .unwrap_or(self.ctx.voucher_number);

        let party_hedge = self
            .row(PostingClass::PartyHedgeEntry, self.tag())
            .with_party(&self.ctx.party.code)
            .with_value(totals.gold_value)
            .with_weights(totals.gross_weight, totals.pure_weight, totals.purity)
            .with_bid(totals.current_bid_value)
            .with_hedge_reference(hedge_voucher)
            .with_description(format!("Hedged gold at bid {}", totals.current_bid_value));
        let party_hedge = if self.credits_party() {
            party_hedge.credit(totals.pure_weight)
        } else {
            party_hedge.debit(totals.pure_weight)
        };
        self.entries.push(party_hedge);

        let cash_marker = self
            .row(PostingClass::PartyCashBalance, self.tag())
            .with_party(&self.ctx.party.code)
            .with_value(totals.gold_value)
            .with_hedge_reference(hedge_voucher)
            .with_description(format!(
                "Hedge cash leg for {}",
                self.ctx.voucher_number
            ));
        let cash_marker = if self.credits_party() {
            cash_marker.credit(totals.gold_value)
        } else {
            cash_marker.debit(totals.gold_value)
        };
        let cash_marker = self.chain(cash_marker);
        self.entries.push(cash_marker);

        let house = self
            .row_with_reference(PostingClass::HedgeEntry, self.tag(), hedge_voucher)
            .with_value(totals.gold_value)
            .with_weights(totals.gross_weight, totals.pure_weight, totals.purity)
            .with_bid(totals.current_bid_value)
            .with_hedge_reference(hedge_voucher)
            .with_description(format!("Hedge entry at bid {}", totals.current_bid_value));
        let house = if self.credits_party() {
            house
                .debit_memo(totals.gold_value)
                .with_cash_quad(totals.gold_value, Decimal::ZERO)
        } else {
            house
                .credit_memo(totals.gold_value)
                .with_cash_quad(Decimal::ZERO, totals.gold_value)
        };
        self.entries.push(house);
    }

    fn gold_inventory(&mut self) {
        let totals = self.totals;
        if totals.pure_weight_std > Decimal::ZERO {
            let row = self
                .row(PostingClass::Gold, self.tag())
                .with_value(totals.gold_value)
                .with_weights(totals.gross_weight, totals.pure_weight, totals.purity)
                .with_description(format!("Gold inventory - {}", totals.stock_code));
            let row = if self.credits_party() {
                row.debit(totals.pure_weight)
            } else {
                row.credit(totals.pure_weight)
            };
            self.entries.push(row);
        }
        if totals.gross_weight > Decimal::ZERO {
            let row = self
                .row(PostingClass::GoldStock, self.tag())
                .with_value(totals.gold_value)
                .with_weights(totals.gross_weight, totals.pure_weight, totals.purity)
                .with_description(format!("Stock gross weight - {}", totals.stock_code));
            let row = if self.credits_party() {
                row.debit_memo(totals.gross_weight)
            } else {
                row.credit_memo(totals.gross_weight)
            };
            self.entries.push(row);
        }
    }

    fn money_legs(&mut self) {
        let totals = self.totals;
        if totals.making_charges > Decimal::ZERO {
            self.money_pair(
                PostingClass::PartyMakingCharges,
                PostingClass::MakingCharges,
                totals.making_charges,
                "Making charges".to_string(),
                self.credits_party(),
            );
        }
        if totals.premium > Decimal::ZERO {
            self.money_pair(
                PostingClass::PartyPremium,
                PostingClass::Premium,
                totals.premium,
                "Premium".to_string(),
                self.credits_party(),
            );
        }
        if totals.discount > Decimal::ZERO {
            // Discounts run against the trade direction.
            self.money_pair(
                PostingClass::PartyDiscount,
                PostingClass::Discount,
                totals.discount,
                "Discount".to_string(),
                !self.credits_party(),
            );
        }
        if totals.vat_amount > Decimal::ZERO && !totals.exclude_vat {
            let base = if totals.vat_on_making {
                "making charges"
            } else {
                "gold value"
            };
            self.money_pair(
                PostingClass::PartyVatAmount,
                PostingClass::VatAmount,
                totals.vat_amount,
                format!("VAT on {base}"),
                self.credits_party(),
            );
        }
    }

    /// Emit the party row and its expense/income counterpart for one money
    /// component. `party_gets_credit` reflects the directional matrix.
    fn money_pair(
        &mut self,
        party_class: PostingClass,
        counter_class: PostingClass,
        amount: Decimal,
        description: String,
        party_gets_credit: bool,
    ) {
        let party_row = self
            .row(party_class, self.tag())
            .with_party(&self.ctx.party.code)
            .with_value(amount)
            .with_description(description.clone());
        let party_row = if party_gets_credit {
            party_row.credit(amount)
        } else {
            party_row.debit(amount)
        };
        let party_row = self.chain(party_row);
        self.entries.push(party_row);

        let counter = self
            .row(counter_class, self.tag())
            .with_value(amount)
            .with_description(description);
        let counter = if party_gets_credit {
            counter.debit(amount)
        } else {
            counter.credit(amount)
        };
        self.entries.push(counter);
    }

    /// FX gain/loss rows keep the same direction on both trade sides.
    fn fx_legs(&mut self) {
        let totals = self.totals;
        if totals.fx_gain > Decimal::ZERO {
            let row = self
                .row(PostingClass::FxExchange, self.tag())
                .with_value(totals.fx_gain)
                .credit_memo(totals.fx_gain)
                .with_description(format!("FX gain on {}", self.ctx.voucher_number));
            self.entries.push(row);
        }
        if totals.fx_loss > Decimal::ZERO {
            let row = self
                .row(PostingClass::FxExchange, self.tag())
                .with_value(totals.fx_loss)
                .debit_memo(totals.fx_loss)
                .with_description(format!("FX loss on {}", self.ctx.voucher_number));
            self.entries.push(row);
        }
    }

    fn purity_difference(&mut self) {
        let difference = self.totals.purity_difference;
        if difference.is_zero() {
            return;
        }
        let magnitude = difference.abs();
        let row = self
            .row(PostingClass::PurityDifference, self.tag())
            .with_value(magnitude)
            .with_weights(
                self.totals.gross_weight,
                self.totals.pure_weight,
                self.totals.purity,
            );
        let row = if difference < Decimal::ZERO {
            row.debit_memo(magnitude)
                .with_description(format!("Purity difference (Loss {magnitude})"))
        } else {
            row.credit_memo(magnitude)
                .with_description(format!("Purity difference (Gain {magnitude})"))
        };
        self.entries.push(row);
    }

    /// Up to four rows per charge: each leg plus its VAT (`093`) row, all
    /// denominated in the charge's own currency.
    fn other_charge(&mut self, charge: &OtherCharge) {
        let vat_amount = charge
            .vat_details
            .as_ref()
            .map(|vat| vat.vat_amount)
            .unwrap_or(Decimal::ZERO);

        let legs = [(&charge.debit, true), (&charge.credit, false)];
        for (leg, is_debit) in legs {
            let amount = if leg.amount.is_zero() {
                leg.base_amount
            } else {
                leg.amount
            };
            let currency = leg
                .currency_code
                .as_deref()
                .unwrap_or(self.ctx.party_currency);

            let row = self
                .row(PostingClass::OtherCharge, self.tag())
                .with_party(&leg.account)
                .with_value(amount)
                .with_currency(currency, Decimal::ONE)
                .with_description(charge.description.clone());
            let row = if is_debit {
                row.debit(amount)
            } else {
                row.credit(amount)
            };
            self.entries.push(row);

            if vat_amount > Decimal::ZERO {
                let vat_row = self
                    .row(PostingClass::OtherCharge, "093")
                    .with_party(&leg.account)
                    .with_value(vat_amount)
                    .with_currency(currency, Decimal::ONE)
                    .with_description(format!("VAT on {}", charge.description));
                let vat_row = if is_debit {
                    vat_row.debit(vat_amount)
                } else {
                    vat_row.credit(vat_amount)
                };
                self.entries.push(vat_row);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::totals::totalize;
    use bullion_core::{
        ChargeLeg, ItemTotal, MetalRateRequirements, StockItem, TotalSummary, VatCharge,
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

    fn context<'a>(
        party: &'a Party,
        tx_type: TransactionType,
        mode: TransactionMode,
        hedge: bool,
        hedge_voucher: Option<&'a str>,
    ) -> BuildContext<'a> {
        BuildContext {
            transaction_type: tx_type,
            mode,
            hedge,
            party,
            party_currency: "AED",
            base_currency: "AED",
            voucher_date: Utc::now(),
            voucher_number: "PV-001",
            hedge_voucher_number: hedge_voucher,
            group_id: "TXN2026123",
            metal_transaction_id: Uuid::new_v4(),
            created_by: "admin",
            deal_order_id: None,
            opening_cash: Decimal::ZERO,
        }
    }

    fn classes(entries: &[RegistryEntry]) -> Vec<PostingClass> {
        entries.iter().map(|e| e.entry_type).collect()
    }

    fn assert_quads_balance(entries: &[RegistryEntry]) {
        let cash_debit: Decimal = entries.iter().map(|e| e.cash_debit).sum();
        let cash_credit: Decimal = entries.iter().map(|e| e.cash_credit).sum();
        let gold_debit: Decimal = entries.iter().map(|e| e.gold_debit).sum();
        let gold_credit: Decimal = entries.iter().map(|e| e.gold_credit).sum();
        assert_eq!(cash_debit, cash_credit, "cash leg out of balance");
        assert_eq!(gold_debit, gold_credit, "gold leg out of balance");
        for entry in entries {
            assert!(
                entry.debit.is_zero() || entry.credit.is_zero(),
                "both sides set on {:?}",
                entry.entry_type
            );
        }
    }

    #[test]
    fn unfixed_purchase_emits_full_row_set() {
        let party = Party::new("P001", "Al Noor");
        let ctx = context(
            &party,
            TransactionType::Purchase,
            TransactionMode::Unfix,
            false,
            None,
        );
        let totals = totalize(&[line()], &summary(), true);
        let output = build_entries(&ctx, &totals, &[]);
        let classes = classes(&output.entries);
        assert!(classes.contains(&PostingClass::PartyGoldBalance));
        assert!(classes.contains(&PostingClass::Gold));
        assert!(classes.contains(&PostingClass::GoldStock));
        assert!(classes.contains(&PostingClass::PartyMakingCharges));
        assert!(classes.contains(&PostingClass::MakingCharges));
        assert!(classes.contains(&PostingClass::PartyVatAmount));
        assert!(classes.contains(&PostingClass::VatAmount));
        assert!(!classes.contains(&PostingClass::PartyGold));

        let gold_balance = output.entries.iter()
            .find(|e| e.entry_type == PostingClass::PartyGoldBalance)
            .unwrap();
        assert_eq!(gold_balance.credit, dec!(91.6));
        assert_eq!(gold_balance.gold_credit, dec!(91.6));
        assert_eq!(gold_balance.transaction_type, "purchase-unfix");
        assert_eq!(gold_balance.party.as_deref(), Some("P001"));

        assert_quads_balance(&output.entries);
        // Chain advanced by making + VAT only.
        assert_eq!(output.closing_cash, dec!(1525));
    }

    #[test]
    fn fixed_sale_replaces_gold_balance_with_fixing_pair() {
        let party = Party::new("P001", "Al Noor");
        let ctx = context(
            &party,
            TransactionType::Sale,
            TransactionMode::Fix,
            false,
            None,
        );
        let totals = totalize(&[line()], &summary(), true);
        let output = build_entries(&ctx, &totals, &[]);
        let classes = classes(&output.entries);
        assert!(!classes.contains(&PostingClass::PartyGoldBalance));
        assert!(classes.contains(&PostingClass::PartyGold));

        let fixing = output.entries.iter()
            .find(|e| e.entry_type == PostingClass::PartyGold)
            .unwrap();
        assert_eq!(fixing.transaction_type, "sale-fixing");
        assert_eq!(fixing.debit, dec!(91.6));

        let settlement = output.entries.iter()
            .find(|e| e.entry_type == PostingClass::PartyCashBalance)
            .unwrap();
        assert_eq!(settlement.debit, dec!(21525));
        assert_quads_balance(&output.entries);
    }

    #[test]
    fn hedge_emits_triple_with_hedge_reference() {
        let party = Party::new("P001", "Al Noor");
        let ctx = context(
            &party,
            TransactionType::Purchase,
            TransactionMode::Unfix,
            true,
            Some("HV-00001"),
        );
        let totals = totalize(&[line()], &summary(), true);
        let output = build_entries(&ctx, &totals, &[]);
        let classes = classes(&output.entries);
        assert!(classes.contains(&PostingClass::PartyHedgeEntry));
        assert!(classes.contains(&PostingClass::PartyCashBalance));
        assert!(classes.contains(&PostingClass::HedgeEntry));
        // Hedge replaces the unfixed party gold balance.
        assert!(!classes.contains(&PostingClass::PartyGoldBalance));

        let house = output.entries.iter()
            .find(|e| e.entry_type == PostingClass::HedgeEntry)
            .unwrap();
        assert_eq!(house.reference, "HV-00001");
        let party_side = output.entries.iter()
            .find(|e| e.entry_type == PostingClass::PartyHedgeEntry)
            .unwrap();
        assert_eq!(party_side.reference, "PV-001");
        assert_eq!(party_side.hedge_reference.as_deref(), Some("HV-00001"));
        assert_quads_balance(&output.entries);
    }

    #[test]
    fn purity_gain_row_matches_difference() {
        let mut tested = line();
        tested.purity = dec!(0.9995);
        tested.purity_difference = Some(dec!(8.35));
        tested.pass_purity_diff = Some(true);
        let party = Party::new("P001", "Al Noor");
        let ctx = context(
            &party,
            TransactionType::Purchase,
            TransactionMode::Unfix,
            false,
            None,
        );
        let totals = totalize(&[tested], &summary(), true);
        let output = build_entries(&ctx, &totals, &[]);
        let diff = output.entries.iter()
            .find(|e| e.entry_type == PostingClass::PurityDifference)
            .unwrap();
        assert_eq!(diff.value, dec!(8.35));
        assert_eq!(diff.credit, dec!(8.35));
        assert!(diff.description.contains("(Gain 8.35)"));

        let gold = output.entries.iter()
            .find(|e| e.entry_type == PostingClass::Gold)
            .unwrap();
        assert_eq!(gold.pure_weight, dec!(99.95));
    }

    #[test]
    fn vat_gated_by_exclude_flag() {
        let mut no_vat = line();
        no_vat.exclude_vat = Some(true);
        let party = Party::new("P001", "Al Noor");
        let ctx = context(
            &party,
            TransactionType::Purchase,
            TransactionMode::Unfix,
            false,
            None,
        );
        let totals = totalize(&[no_vat], &summary(), true);
        let output = build_entries(&ctx, &totals, &[]);
        assert!(!classes(&output.entries).contains(&PostingClass::VatAmount));
        assert!(!classes(&output.entries).contains(&PostingClass::PartyVatAmount));
    }

    #[test]
    fn other_charge_emits_four_rows_with_vat() {
        let party = Party::new("P001", "Al Noor");
        let ctx = context(
            &party,
            TransactionType::Purchase,
            TransactionMode::Unfix,
            false,
            None,
        );
        let totals = totalize(&[line()], &summary(), true);
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
        let output = build_entries(&ctx, &totals, &[charge]);
        let charge_rows: Vec<_> = output.entries.iter()
            .filter(|e| e.entry_type == PostingClass::OtherCharge)
            .collect();
        assert_eq!(charge_rows.len(), 4);
        assert_eq!(
            charge_rows.iter().filter(|r| r.transaction_type == "093").count(),
            2
        );
        assert_quads_balance(&output.entries);
    }

    #[test]
    fn returns_mirror_their_originals() {
        let party = Party::new("P001", "Al Noor");
        let totals = totalize(&[line()], &summary(), true);

        let purchase_ctx = context(
            &party,
            TransactionType::Purchase,
            TransactionMode::Unfix,
            false,
            None,
        );
        let purchase = build_entries(&purchase_ctx, &totals, &[]);

        let return_ctx = context(
            &party,
            TransactionType::PurchaseReturn,
            TransactionMode::Unfix,
            false,
            None,
        );
        let purchase_return = build_entries(&return_ctx, &totals, &[]);

        let original = purchase.entries.iter()
            .find(|e| e.entry_type == PostingClass::PartyGoldBalance)
            .unwrap();
        let reversed = purchase_return.entries.iter()
            .find(|e| e.entry_type == PostingClass::PartyGoldBalance)
            .unwrap();
        assert_eq!(original.credit, reversed.debit);
        assert_quads_balance(&purchase_return.entries);
    }
}
