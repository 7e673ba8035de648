use std::path::Path;

use crate::errors::CoreError;
use crate::models::portfolio::Portfolio;

use super::format;

/// High-level storage operations: save/load a portfolio to/from JSON text or files.
///
/// Only editable fields travel through here; market data is rebuilt by the
/// next aggregation pass.
pub struct StorageManager;

impl StorageManager {
    pub fn save_to_string(portfolio: &Portfolio) -> Result<String, CoreError> {
        format::write_portfolio(portfolio)
    }

    pub fn load_from_str(json: &str) -> Result<Portfolio, CoreError> {
        format::read_portfolio(json)
    }

    pub fn save_to_file(portfolio: &Portfolio, path: impl AsRef<Path>) -> Result<(), CoreError> {
        let json = Self::save_to_string(portfolio)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Portfolio, CoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::load_from_str(&json)
    }
}
