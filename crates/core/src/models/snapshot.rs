use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field names of the provider snapshot that the engine reads.
pub mod fields {
    pub const LONG_NAME: &str = "longName";
    pub const SHORT_NAME: &str = "shortName";
    pub const DIVIDEND_YIELD: &str = "dividendYield";
    pub const FIVE_YEAR_AVG_DIVIDEND_YIELD: &str = "fiveYearAvgDividendYield";
    pub const FORWARD_PE: &str = "forwardPE";
    pub const FORWARD_EPS: &str = "forwardEps";
    pub const TRAILING_PE: &str = "trailingPE";
    pub const TRAILING_EPS: &str = "trailingEps";
    pub const PEG_RATIO: &str = "pegRatio";
    pub const BOOK_VALUE: &str = "bookValue";
    pub const PRICE_TO_BOOK: &str = "priceToBook";
    pub const RETURN_ON_EQUITY: &str = "returnOnEquity";
    pub const PAYOUT_RATIO: &str = "payoutRatio";
    pub const PROFIT_MARGINS: &str = "profitMargins";
    pub const SECTOR: &str = "sector";
    pub const INDUSTRY: &str = "industry";
    pub const CURRENCY: &str = "currency";
}

/// Placeholder for text fields the provider did not supply.
pub const NOT_AVAILABLE: &str = "N/A";

/// Name/value fundamentals snapshot for one ticker.
///
/// Any field may be absent and types vary by field, so values are kept as
/// raw JSON and read through typed accessors that reject anything unusable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InfoSnapshot {
    fields: Map<String, Value>,
}

impl InfoSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Builder-style insert, mostly useful when assembling snapshots by hand.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Finite numeric value of a field. Strings and non-finite numbers yield `None`.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.fields
            .get(key)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
    }

    /// Numeric value of a field only when strictly positive.
    pub fn positive(&self, key: &str) -> Option<f64> {
        self.number(key).filter(|v| *v > 0.0)
    }

    /// Numeric value or NaN.
    pub fn number_or_nan(&self, key: &str) -> f64 {
        self.number(key).unwrap_or(f64::NAN)
    }

    /// Trimmed, non-blank text value of a field.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Text value or `"N/A"`.
    pub fn text_or_na(&self, key: &str) -> String {
        self.text(key).unwrap_or(NOT_AVAILABLE).to_string()
    }
}

/// Lightweight quote: last traded price plus the short display name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FastInfo {
    pub last_price: Option<f64>,
    pub short_name: Option<String>,
}
