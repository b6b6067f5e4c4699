use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{EngineError, EngineResult};

/// Engine configuration, loadable from a TOML file.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Path of the SQLite database file opened by
    /// [`PostingEngine::open`](crate::PostingEngine::open).
    pub db_path: PathBuf,
    /// Currency assumed when a line carries no currency code.
    pub base_currency: String,
    /// Reject postings that would push inventory pieces or gross weight
    /// below zero.
    pub enforce_stock_floor: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("bullion.db"),
            base_currency: "AED".to_string(),
            enforce_stock_floor: true,
        }
    }
}

impl EngineConfig {
    pub fn from_path(path: impl AsRef<Path>) -> EngineResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|err| EngineError::Internal(format!("read config: {err}")))?;
        toml::from_str(&raw).map_err(|err| EngineError::Internal(format!("parse config: {err}")))
    }
}
