//! Domain model for the bullion back-office: parties, metal stocks,
//! commercial transactions, and hedge/fix records.

mod fixing;
pub mod ids;
mod party;
mod stock;
mod transaction;

pub use fixing::{FixingOrder, FixingPrice, FixingStatus, HedgeKind, TransactionFixing};
pub use ids::{fixing_transaction_id, registry_group_id, HEDGE_PREFIX_HOUSE, HEDGE_PREFIX_PARTY};
pub use party::{CashBalance, GoldBalance, Party, PartyBalances};
pub use stock::{Inventory, InventoryAction, InventoryLog, MakingUnit, MetalStock};
pub use transaction::{
    ChargeLeg, ItemTotal, MetalRateRequirements, MetalTransaction, OtherCharge, StockItem,
    TotalSummary, TransactionMode, TransactionType, VatCharge, VatDetails,
};
