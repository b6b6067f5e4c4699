use chrono::{DateTime, Datelike, Utc};
use rand::Rng;

use crate::TransactionType;

/// Prefix for hedges on the party side of the book (purchase family).
pub const HEDGE_PREFIX_PARTY: &str = "HSM";
/// Prefix for hedges on the house side of the book (sale family).
pub const HEDGE_PREFIX_HOUSE: &str = "HPM";

/// Registry group id shared by every row of one posting run:
/// `TXN<year><3 random digits>`.
pub fn registry_group_id<R: Rng>(at: DateTime<Utc>, rng: &mut R) -> String {
    format!("TXN{:04}{:03}", at.year(), rng.gen_range(0..1000))
}

/// Generate a hedge fixing id, `HSM`/`HPM` plus four random digits,
/// retrying while `taken` reports a collision.
pub fn fixing_transaction_id<R, F>(tx_type: TransactionType, rng: &mut R, taken: F) -> String
where
    R: Rng,
    F: Fn(&str) -> bool,
{
    let prefix = if tx_type.is_purchase_family() {
        HEDGE_PREFIX_PARTY
    } else {
        HEDGE_PREFIX_HOUSE
    };
    loop {
        let candidate = format!("{prefix}{:04}", rng.gen_range(0..10_000));
        if !taken(&candidate) {
            return candidate;
        }
    }
}
