use rusqlite::Connection;

use crate::EngineResult;

const STORE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS parties (
    id TEXT PRIMARY KEY,
    code TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    gold_grams TEXT NOT NULL DEFAULT '0',
    gold_value TEXT NOT NULL DEFAULT '0',
    gold_last_updated TEXT,
    last_balance_update TEXT
);
CREATE TABLE IF NOT EXISTS party_cash_balances (
    party_code TEXT NOT NULL,
    currency TEXT NOT NULL,
    amount TEXT NOT NULL DEFAULT '0',
    is_default INTEGER NOT NULL DEFAULT 0,
    last_updated TEXT,
    PRIMARY KEY (party_code, currency)
);
CREATE TABLE IF NOT EXISTS metal_stocks (
    id TEXT PRIMARY KEY,
    code TEXT NOT NULL UNIQUE,
    metal_type TEXT NOT NULL,
    karat TEXT NOT NULL,
    size TEXT,
    colour TEXT,
    brand TEXT,
    country TEXT,
    category TEXT,
    pcs INTEGER NOT NULL,
    standard_purity TEXT NOT NULL,
    pass_purity_diff INTEGER NOT NULL DEFAULT 0,
    exclude_vat INTEGER NOT NULL DEFAULT 0,
    vat_on_making INTEGER NOT NULL DEFAULT 0,
    wastage INTEGER NOT NULL DEFAULT 0,
    making_unit TEXT
);
CREATE TABLE IF NOT EXISTS inventory (
    stock_code TEXT PRIMARY KEY,
    pcs_count INTEGER NOT NULL DEFAULT 0,
    gross_weight TEXT NOT NULL DEFAULT '0',
    pure_weight TEXT NOT NULL DEFAULT '0',
    purity TEXT NOT NULL DEFAULT '0',
    updated_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS inventory_logs (
    id TEXT PRIMARY KEY,
    stock_code TEXT NOT NULL,
    voucher_number TEXT NOT NULL,
    voucher_date TEXT NOT NULL,
    transaction_type TEXT NOT NULL,
    action TEXT NOT NULL,
    gross_weight TEXT NOT NULL,
    pcs INTEGER NOT NULL,
    is_draft INTEGER,
    created_by TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS inventory_logs_idx_voucher
    ON inventory_logs(voucher_number);
CREATE TABLE IF NOT EXISTS metal_transactions (
    id TEXT PRIMARY KEY,
    transaction_type TEXT NOT NULL,
    fixed INTEGER NOT NULL,
    unfix INTEGER NOT NULL,
    hedge INTEGER NOT NULL,
    party_code TEXT NOT NULL,
    party_currency TEXT NOT NULL,
    item_currency TEXT NOT NULL,
    base_currency TEXT NOT NULL,
    voucher_date TEXT NOT NULL,
    voucher_number TEXT NOT NULL UNIQUE,
    hedge_voucher_number TEXT,
    stock_items TEXT NOT NULL,
    other_charges TEXT NOT NULL,
    total_summary TEXT NOT NULL,
    deal_order_id TEXT,
    created_by TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS fixing_prices (
    id TEXT PRIMARY KEY,
    metal_transaction_id TEXT NOT NULL,
    metal_rate TEXT NOT NULL,
    rate_in_gram TEXT NOT NULL,
    bid_value TEXT NOT NULL,
    current_bid_value TEXT NOT NULL,
    entered_by TEXT NOT NULL,
    created_at TEXT NOT NULL,
    status TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS fixing_prices_idx_transaction
    ON fixing_prices(metal_transaction_id);
CREATE TABLE IF NOT EXISTS transaction_fixings (
    id TEXT PRIMARY KEY,
    transaction_id TEXT NOT NULL UNIQUE,
    metal_transaction_id TEXT NOT NULL,
    fixing_type TEXT NOT NULL,
    party_code TEXT NOT NULL,
    voucher_number TEXT NOT NULL,
    reference_number TEXT NOT NULL,
    orders TEXT NOT NULL,
    status TEXT NOT NULL,
    notes TEXT,
    created_by TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS transaction_fixings_idx_transaction
    ON transaction_fixings(metal_transaction_id);
CREATE TABLE IF NOT EXISTS deal_orders (
    id TEXT PRIMARY KEY,
    status TEXT NOT NULL
);
"#;

pub fn init(conn: &Connection) -> EngineResult<()> {
    conn.execute_batch(STORE_SCHEMA)?;
    Ok(())
}
