use bullion_ledger::LedgerError;
use thiserror::Error;
use uuid::Uuid;

/// Result alias for posting-engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Error taxonomy surfaced to callers. Each variant carries a stable code
/// and an HTTP-style status so the transport shell can translate without
/// inspecting messages.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("missing required fields: {0}")]
    MissingRequiredFields(String),
    #[error("invalid stock items: {0}")]
    InvalidStockItems(String),
    #[error("invalid transaction type: {0}")]
    InvalidTransactionType(String),
    #[error("party {0} is not active")]
    InvalidParty(String),
    #[error("party {0} not found")]
    PartyNotFound(String),
    #[error("transaction {0} not found")]
    TransactionNotFound(Uuid),
    #[error("no inventory record for stock {0}")]
    InventoryNotFound(String),
    #[error("insufficient stock for {code}: {detail}")]
    InsufficientStock { code: String, detail: String },
    #[error("duplicate transaction for voucher {0}")]
    DuplicateTransaction(String),
    #[error("failed to delete registry rows: {0}")]
    DeleteRegistryFailed(String),
    #[error("inventory update failed: {0}")]
    InventoryUpdateFailed(String),
    #[error("failed to reverse balances: {0}")]
    ReverseBalancesFailed(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "VALIDATION_ERROR",
            EngineError::MissingRequiredFields(_) => "MISSING_REQUIRED_FIELDS",
            EngineError::InvalidStockItems(_) => "INVALID_STOCK_ITEMS",
            EngineError::InvalidTransactionType(_) => "INVALID_TRANSACTION_TYPE",
            EngineError::InvalidParty(_) => "INVALID_PARTY",
            EngineError::PartyNotFound(_) => "PARTY_NOT_FOUND",
            EngineError::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            EngineError::InventoryNotFound(_) => "INVENTORY_NOT_FOUND",
            EngineError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            EngineError::DuplicateTransaction(_) => "DUPLICATE_TRANSACTION",
            EngineError::DeleteRegistryFailed(_) => "DELETE_REGISTRY_FAILED",
            EngineError::InventoryUpdateFailed(_) => "INVENTORY_UPDATE_FAILED",
            EngineError::ReverseBalancesFailed(_) => "REVERSE_BALANCES_FAILED",
            EngineError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            EngineError::Validation(_)
            | EngineError::MissingRequiredFields(_)
            | EngineError::InvalidStockItems(_)
            | EngineError::InvalidTransactionType(_)
            | EngineError::InvalidParty(_) => 400,
            EngineError::PartyNotFound(_)
            | EngineError::TransactionNotFound(_)
            | EngineError::InventoryNotFound(_) => 404,
            EngineError::DuplicateTransaction(_) => 409,
            EngineError::InsufficientStock { .. } => 422,
            EngineError::DeleteRegistryFailed(_)
            | EngineError::InventoryUpdateFailed(_)
            | EngineError::ReverseBalancesFailed(_)
            | EngineError::Internal(_) => 500,
        }
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(value: rusqlite::Error) -> Self {
        EngineError::Internal(value.to_string())
    }
}

impl From<LedgerError> for EngineError {
    fn from(value: LedgerError) -> Self {
        EngineError::Internal(value.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(value: serde_json::Error) -> Self {
        EngineError::Internal(format!("payload serialization: {value}"))
    }
}
