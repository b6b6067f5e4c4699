//! Transaction orchestrator: wraps create, update, and delete in one
//! database session and drives the totaliser, entry builder, balance
//! updater, inventory adjuster, and hedge recorder in order.

use chrono::Utc;
use rusqlite::Connection;
use rust_decimal::Decimal;
use uuid::Uuid;

use bullion_core::{ids, MetalTransaction};
use bullion_ledger::{RegistryEntry, RegistryQuery};

use crate::balances::{self, balance_vector};
use crate::config::EngineConfig;
use crate::db::Db;
use crate::error::EngineResult;
use crate::fixing::{self, HedgeVoucherProvider, SequentialVoucherProvider};
use crate::inventory;
use crate::posting::{build_entries, BuildContext};
use crate::reversal;
use crate::store::{party as party_store, stock as stock_store, transaction as tx_store};
use crate::totals::totalize;
use crate::validate::validate_transaction;

/// The posting engine. Holds the shared database handle, the effective
/// configuration, and the hedge voucher source.
pub struct PostingEngine<V = SequentialVoucherProvider> {
    db: Db,
    config: EngineConfig,
    vouchers: V,
}

impl PostingEngine<SequentialVoucherProvider> {
    pub fn new(db: Db, config: EngineConfig) -> Self {
        Self::with_voucher_provider(db, config, SequentialVoucherProvider::new())
    }

    /// Open (or create) the database at `config.db_path` and build an
    /// engine over it.
    pub fn open(config: EngineConfig) -> EngineResult<Self> {
        let db = Db::open(&config.db_path)?;
        Ok(Self::new(db, config))
    }
}

impl<V: HedgeVoucherProvider> PostingEngine<V> {
    pub fn with_voucher_provider(db: Db, config: EngineConfig, vouchers: V) -> Self {
        Self {
            db,
            config,
            vouchers,
        }
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    /// Post a new transaction. Validation runs before the session opens;
    /// everything else is all-or-nothing.
    pub fn create(&self, mut transaction: MetalTransaction) -> EngineResult<MetalTransaction> {
        validate_transaction(&transaction)?;
        self.db.with_session(|session| {
            tx_store::insert(session, &transaction)?;
            self.post(session, &mut transaction)
        })?;
        tracing::info!(
            transaction = %transaction.id,
            voucher = %transaction.voucher_number,
            kind = transaction.transaction_type.as_str(),
            "transaction created"
        );
        Ok(transaction)
    }

    /// Reverse the stored state, apply the allowed fields from `patch`, and
    /// re-post. The hedge voucher survives the rewrite.
    pub fn update(&self, id: Uuid, patch: MetalTransaction) -> EngineResult<MetalTransaction> {
        validate_transaction(&patch)?;
        let updated = self.db.with_session(|session| {
            let snapshot = tx_store::require(session, id)?;
            reversal::delete_dependents(session, &snapshot)?;
            reversal::reverse_effects(session, &self.config, &snapshot, Utc::now())?;

            let mut updated = apply_patch(snapshot, patch);
            tx_store::update(session, &updated)?;
            self.post(session, &mut updated)?;
            Ok(updated)
        })?;
        tracing::info!(transaction = %id, "transaction updated");
        Ok(updated)
    }

    /// Reverse and hard-delete a transaction.
    pub fn delete(&self, id: Uuid) -> EngineResult<()> {
        self.db.with_session(|session| {
            let snapshot = tx_store::require(session, id)?;
            reversal::reverse_effects(session, &self.config, &snapshot, Utc::now())?;
            reversal::delete_dependents(session, &snapshot)?;
            tx_store::delete(session, id)
        })?;
        tracing::info!(transaction = %id, "transaction deleted");
        Ok(())
    }

    pub fn find(&self, id: Uuid) -> EngineResult<Option<MetalTransaction>> {
        self.db.read(|conn| tx_store::find(conn, id))
    }

    /// Registry rows of one transaction, in insertion order.
    pub fn registry_entries(&self, id: Uuid) -> EngineResult<Vec<RegistryEntry>> {
        self.db.read(|conn| {
            Ok(bullion_ledger::sqlite::query(
                conn,
                &RegistryQuery::for_transaction(id),
            )?)
        })
    }

    /// Shared post-persistence pipeline: hedge voucher, registry rows,
    /// balances, inventory, fixings, deal order.
    fn post(&self, session: &Connection, transaction: &mut MetalTransaction) -> EngineResult<()> {
        let now = Utc::now();
        let mut rng = rand::thread_rng();

        if transaction.hedge && transaction.hedge_voucher_number.is_none() {
            let voucher = self.vouchers.next_hedge_voucher();
            tx_store::set_hedge_voucher(session, transaction.id, &voucher)?;
            transaction.hedge_voucher_number = Some(voucher);
        }

        let party = party_store::find_active(session, &transaction.party_code)?;
        let group_id = ids::registry_group_id(now, &mut rng);
        let mode = transaction.mode();

        let mut entries = Vec::new();
        let mut opening_cash = party.cash_amount(&transaction.party_currency);
        for (index, line) in transaction.stock_items.iter().enumerate() {
            let mut totals = totalize(
                std::slice::from_ref(line),
                &transaction.total_summary,
                true,
            );
            if index > 0 {
                // The priced settlement is posted once per transaction.
                totals.total_amount = Decimal::ZERO;
            }
            let context = BuildContext {
                transaction_type: transaction.transaction_type,
                mode,
                hedge: transaction.hedge,
                party: &party,
                party_currency: &transaction.party_currency,
                base_currency: &self.config.base_currency,
                voucher_date: transaction.voucher_date,
                voucher_number: &transaction.voucher_number,
                hedge_voucher_number: transaction.hedge_voucher_number.as_deref(),
                group_id: &group_id,
                metal_transaction_id: transaction.id,
                created_by: &transaction.created_by,
                deal_order_id: transaction.deal_order_id.as_deref(),
                opening_cash,
            };
            let charges = if index == 0 {
                transaction.other_charges.as_slice()
            } else {
                &[]
            };
            let output = build_entries(&context, &totals, charges);
            opening_cash = output.closing_cash;
            entries.extend(output.entries);
        }
        let inserted = bullion_ledger::sqlite::insert_unordered(session, &entries)?;
        tracing::debug!(
            transaction = %transaction.id,
            rows = inserted,
            group = %group_id,
            "registry rows written"
        );

        let totals = totalize(&transaction.stock_items, &transaction.total_summary, false);
        let change = balance_vector(transaction.transaction_type, mode, &totals);
        balances::apply_party_change(
            session,
            &transaction.party_code,
            &transaction.party_currency,
            &change,
            now,
        )?;
        balances::apply_other_charges(
            session,
            &transaction.other_charges,
            &transaction.party_currency,
            Decimal::ONE,
            now,
        )?;

        for line in &transaction.stock_items {
            let pcs_tracked = stock_store::find_stock(session, &line.stock_code)?
                .map(|stock| stock.pcs)
                .unwrap_or(line.pieces > 0);
            inventory::apply_line(
                session,
                &self.config,
                transaction.transaction_type,
                line,
                &transaction.voucher_number,
                transaction.voucher_date,
                pcs_tracked,
                &transaction.created_by,
                false,
                now,
            )?;
        }

        if mode == bullion_core::TransactionMode::Fix {
            fixing::record_fixing_prices(session, transaction);
        }
        if transaction.hedge {
            let voucher = transaction
                .hedge_voucher_number
                .clone()
                .unwrap_or_else(|| transaction.voucher_number.clone());
            fixing::record_transaction_fixing(session, transaction, &voucher, &mut rng)?;
        }

        if let Some(deal_order_id) = transaction.deal_order_id.as_deref() {
            tx_store::mark_deal_order_completed(session, deal_order_id);
        }
        Ok(())
    }
}

/// Merge the updatable fields of `patch` onto the stored snapshot. Identity,
/// audit fields, and an already assigned hedge voucher are preserved.
fn apply_patch(snapshot: MetalTransaction, patch: MetalTransaction) -> MetalTransaction {
    MetalTransaction {
        transaction_type: patch.transaction_type,
        fixed: patch.fixed,
        unfix: patch.unfix,
        hedge: patch.hedge,
        party_code: patch.party_code,
        party_currency: patch.party_currency,
        item_currency: patch.item_currency,
        base_currency: patch.base_currency,
        voucher_date: patch.voucher_date,
        voucher_number: patch.voucher_number,
        stock_items: patch.stock_items,
        other_charges: patch.other_charges,
        total_summary: patch.total_summary,
        deal_order_id: patch.deal_order_id.or_else(|| snapshot.deal_order_id.clone()),
        ..snapshot
    }
}
