use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use bullion_core::{CashBalance, GoldBalance, Party, PartyBalances};

use super::{parse_decimal, parse_timestamp, parse_uuid};
use crate::{EngineError, EngineResult};

pub fn insert(conn: &Connection, party: &Party) -> EngineResult<()> {
    conn.execute(
        "INSERT INTO parties (id, code, name, is_active, gold_grams, gold_value)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            party.id.to_string(),
            party.code,
            party.name,
            party.is_active as i64,
            party.balances.gold_balance.total_grams.to_string(),
            party.balances.gold_balance.total_value.to_string(),
        ],
    )?;
    for row in &party.balances.cash_balance {
        conn.execute(
            "INSERT INTO party_cash_balances (party_code, currency, amount, is_default)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                party.code,
                row.currency,
                row.amount.to_string(),
                row.is_default as i64
            ],
        )?;
    }
    Ok(())
}

pub fn find(conn: &Connection, code: &str) -> EngineResult<Option<Party>> {
    let head = conn
        .query_row(
            "SELECT id, code, name, is_active, gold_grams, gold_value,
                    gold_last_updated, last_balance_update
             FROM parties WHERE code = ?1",
            params![code],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, Option<String>>(6)?,
                    row.get::<_, Option<String>>(7)?,
                ))
            },
        )
        .optional()?;
    let Some((id, code, name, active, grams, value, gold_at, bal_at)) = head else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT currency, amount, is_default, last_updated
         FROM party_cash_balances WHERE party_code = ?1 ORDER BY currency",
    )?;
    let mut rows = stmt.query(params![code])?;
    let mut cash = Vec::new();
    while let Some(row) = rows.next()? {
        cash.push(CashBalance {
            currency: row.get(0)?,
            amount: parse_decimal(row.get(1)?)?,
            is_default: row.get::<_, i64>(2)? != 0,
            last_updated: row
                .get::<_, Option<String>>(3)?
                .map(parse_timestamp)
                .transpose()?,
        });
    }

    Ok(Some(Party {
        id: parse_uuid(id)?,
        code,
        name,
        is_active: active != 0,
        balances: PartyBalances {
            gold_balance: GoldBalance {
                total_grams: parse_decimal(grams)?,
                total_value: parse_decimal(value)?,
                last_updated: gold_at.map(parse_timestamp).transpose()?,
            },
            cash_balance: cash,
            last_balance_update: bal_at.map(parse_timestamp).transpose()?,
        },
    }))
}

/// Load a party for posting: missing is `PARTY_NOT_FOUND`, inactive is
/// `INVALID_PARTY`.
pub fn find_active(conn: &Connection, code: &str) -> EngineResult<Party> {
    let party = find(conn, code)?.ok_or_else(|| EngineError::PartyNotFound(code.to_string()))?;
    if !party.is_active {
        return Err(EngineError::InvalidParty(code.to_string()));
    }
    Ok(party)
}

/// Make sure an account row exists for an other-charge account code. Charge
/// accounts live in the same table space as trading parties.
pub fn ensure_account(conn: &Connection, code: &str) -> EngineResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO parties (id, code, name, is_active)
         VALUES (?1, ?2, ?2, 1)",
        params![uuid::Uuid::new_v4().to_string(), code],
    )?;
    Ok(())
}

/// Idempotent: add a zero cash row for `currency` when the party has none.
pub fn ensure_cash_row(conn: &Connection, code: &str, currency: &str) -> EngineResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO party_cash_balances (party_code, currency, amount)
         VALUES (?1, ?2, '0')",
        params![code, currency],
    )?;
    Ok(())
}

/// Increment the matching cash row. The session transaction serialises
/// concurrent writers, so read-modify-write here is atomic.
pub fn inc_cash(
    conn: &Connection,
    code: &str,
    currency: &str,
    delta: Decimal,
    now: DateTime<Utc>,
) -> EngineResult<()> {
    if delta.is_zero() {
        return Ok(());
    }
    let current: String = conn.query_row(
        "SELECT amount FROM party_cash_balances WHERE party_code = ?1 AND currency = ?2",
        params![code, currency],
        |row| row.get(0),
    )?;
    let next = parse_decimal(current)? + delta;
    conn.execute(
        "UPDATE party_cash_balances SET amount = ?3, last_updated = ?4
         WHERE party_code = ?1 AND currency = ?2",
        params![code, currency, next.to_string(), now.to_rfc3339()],
    )?;
    conn.execute(
        "UPDATE parties SET last_balance_update = ?2 WHERE code = ?1",
        params![code, now.to_rfc3339()],
    )?;
    Ok(())
}

/// Increment the party gold balance (grams and valuation together).
pub fn inc_gold(
    conn: &Connection,
    code: &str,
    grams_delta: Decimal,
    value_delta: Decimal,
    now: DateTime<Utc>,
) -> EngineResult<()> {
    if grams_delta.is_zero() && value_delta.is_zero() {
        return Ok(());
    }
    let (grams, value): (String, String) = conn.query_row(
        "SELECT gold_grams, gold_value FROM parties WHERE code = ?1",
        params![code],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    let grams = parse_decimal(grams)? + grams_delta;
    let value = parse_decimal(value)? + value_delta;
    conn.execute(
        "UPDATE parties SET gold_grams = ?2, gold_value = ?3,
                gold_last_updated = ?4, last_balance_update = ?4
         WHERE code = ?1",
        params![
            code,
            grams.to_string(),
            value.to_string(),
            now.to_rfc3339()
        ],
    )?;
    Ok(())
}

pub fn cash_amount(conn: &Connection, code: &str, currency: &str) -> EngineResult<Decimal> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT amount FROM party_cash_balances WHERE party_code = ?1 AND currency = ?2",
            params![code, currency],
            |row| row.get(0),
        )
        .optional()?;
    raw.map(parse_decimal).transpose().map(Option::unwrap_or_default)
}

pub fn gold_balance(conn: &Connection, code: &str) -> EngineResult<(Decimal, Decimal)> {
    let (grams, value): (String, String) = conn.query_row(
        "SELECT gold_grams, gold_value FROM parties WHERE code = ?1",
        params![code],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok((parse_decimal(grams)?, parse_decimal(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Db;
    use rust_decimal_macros::dec;

    #[test]
    fn ensure_and_increment_cash() {
        let db = Db::open_in_memory().unwrap();
        db.with_session(|tx| {
            insert(tx, &Party::new("P001", "Al Noor"))?;
            ensure_cash_row(tx, "P001", "AED")?;
            ensure_cash_row(tx, "P001", "AED")?; // idempotent
            inc_cash(tx, "P001", "AED", dec!(21525), Utc::now())?;
            inc_cash(tx, "P001", "AED", dec!(-525), Utc::now())?;
            Ok(())
        })
        .unwrap();
        let amount = db.read(|c| cash_amount(c, "P001", "AED")).unwrap();
        assert_eq!(amount, dec!(21000));
        let usd = db.read(|c| cash_amount(c, "P001", "USD")).unwrap();
        assert_eq!(usd, Decimal::ZERO);
    }

    #[test]
    fn gold_balance_can_go_short() {
        let db = Db::open_in_memory().unwrap();
        db.with_session(|tx| {
            insert(tx, &Party::new("P002", "Dhabi Metals"))?;
            inc_gold(tx, "P002", dec!(-50.5), dec!(-11000), Utc::now())?;
            Ok(())
        })
        .unwrap();
        let (grams, value) = db.read(|c| gold_balance(c, "P002")).unwrap();
        assert_eq!(grams, dec!(-50.5));
        assert_eq!(value, dec!(-11000));
    }

    #[test]
    fn find_active_enforces_flags() {
        let db = Db::open_in_memory().unwrap();
        db.with_session(|tx| {
            let mut party = Party::new("P003", "Closed Partner");
            party.is_active = false;
            insert(tx, &party)
        })
        .unwrap();
        let missing = db.read(|c| find_active(c, "NOPE").map(|_| ()));
        assert!(matches!(missing, Err(EngineError::PartyNotFound(_))));
        let inactive = db.read(|c| find_active(c, "P003").map(|_| ()));
        assert!(matches!(inactive, Err(EngineError::InvalidParty(_))));
    }
}
