//! Portfolio file format.
//!
//! ```json
//! {
//!     "PETR4.SA": { "average_price": 31.5, "quantity": 100, "category": ["Energy"] },
//!     "AAPL":     { "average_price": 150.0, "quantity": 10 }
//! }
//! ```
//!
//! Keys keep their file order and are trimmed; two keys naming the same
//! ticker are rejected. Only editable fields are stored; `category`
//! is omitted when a holding has no explicit tag, and the universal tag is
//! never written.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::CoreError;
use crate::models::holding::Holding;
use crate::models::portfolio::Portfolio;

/// On-disk shape of one holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingRecord {
    pub average_price: f64,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<String>>,
}

impl HoldingRecord {
    pub fn from_holding(holding: &Holding) -> Self {
        let category = if holding.categories.is_empty() {
            None
        } else {
            Some(holding.categories.iter().cloned().collect())
        };
        Self {
            average_price: holding.average_price,
            quantity: holding.quantity,
            category,
        }
    }

    pub fn into_holding(self, symbol: &str) -> Holding {
        Holding::new(symbol, self.quantity, self.average_price)
            .with_categories(self.category.unwrap_or_default())
    }
}

/// Decode a portfolio document.
pub fn read_portfolio(json: &str) -> Result<Portfolio, CoreError> {
    let document: Value = serde_json::from_str(json)?;
    let Value::Object(entries) = document else {
        return Err(CoreError::InvalidFileFormat(
            "portfolio must be a JSON object keyed by ticker".into(),
        ));
    };

    let mut portfolio = Portfolio::new();
    for (symbol, entry) in entries {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(CoreError::InvalidFileFormat("empty ticker symbol".into()));
        }
        if portfolio.contains(symbol) {
            return Err(CoreError::InvalidFileFormat(format!(
                "duplicate ticker symbol {symbol}"
            )));
        }
        let record: HoldingRecord = serde_json::from_value(entry).map_err(|e| {
            CoreError::InvalidFileFormat(format!("invalid entry for {symbol}: {e}"))
        })?;
        if !record.average_price.is_finite() {
            return Err(CoreError::InvalidFileFormat(format!(
                "average_price of {symbol} is not a finite number"
            )));
        }
        portfolio.insert(record.into_holding(symbol));
    }
    Ok(portfolio)
}

/// Encode a portfolio document, pretty-printed with 4-space indentation.
pub fn write_portfolio(portfolio: &Portfolio) -> Result<String, CoreError> {
    let mut entries = Map::new();
    for holding in portfolio {
        let record = serde_json::to_value(HoldingRecord::from_holding(holding))
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        entries.insert(holding.symbol.clone(), record);
    }

    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    Value::Object(entries)
        .serialize(&mut serializer)
        .map_err(|e| CoreError::Serialization(e.to_string()))?;

    String::from_utf8(out).map_err(|e| CoreError::Serialization(e.to_string()))
}
