use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::history::PriceHistory;

/// Tag every holding implicitly carries; its category lists the whole portfolio.
pub const UNIVERSAL_CATEGORY: &str = "*";

/// Market data attached to a holding by the last aggregation pass.
///
/// Numeric fields are NaN and text fields `"N/A"` when no source could
/// supply them. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    pub current_price: f64,
    pub long_name: String,
    pub dividend_yield: f64,
    pub five_year_avg_dividend_yield: f64,
    pub forward_pe: f64,
    pub peg_ratio: f64,
    pub trailing_eps: f64,
    pub book_value: f64,
    pub price_to_book: f64,
    pub return_on_equity: f64,
    pub payout_ratio: f64,
    pub profit_margins: f64,
    pub sector: String,
    pub industry: String,
    pub currency: String,
    pub history: PriceHistory,
    pub updated_at: DateTime<Utc>,
}

/// Position value derived from quantity, average price and current price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    /// current_price * quantity
    pub total_amount: f64,
    /// average_price * quantity
    pub initial_amount: f64,
    /// total_amount - initial_amount
    pub capital_gain: f64,
    /// capital_gain / initial_amount, 0.0 when nothing was invested
    pub capital_gain_ratio: f64,
}

impl Valuation {
    pub fn compute(quantity: i64, average_price: f64, current_price: f64) -> Self {
        let quantity = quantity as f64;
        let total_amount = current_price * quantity;
        let initial_amount = average_price * quantity;
        let capital_gain = total_amount - initial_amount;
        let capital_gain_ratio = if initial_amount == 0.0 {
            0.0
        } else {
            capital_gain / initial_amount
        };
        Self {
            total_amount,
            initial_amount,
            capital_gain,
            capital_gain_ratio,
        }
    }
}

/// One position in the portfolio, keyed by its exchange-qualified ticker.
///
/// `quantity`, `average_price` and `categories` are user data and get
/// persisted. `market` and `valuation` are owned by the aggregator; the
/// setters below keep `valuation` consistent with user edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub quantity: i64,
    pub average_price: f64,
    /// Explicit tags only. The universal tag is implied, never stored.
    pub categories: BTreeSet<String>,
    #[serde(default)]
    pub market: Option<MarketData>,
    #[serde(default)]
    pub valuation: Option<Valuation>,
}

impl Holding {
    pub fn new(symbol: impl Into<String>, quantity: i64, average_price: f64) -> Self {
        Self {
            symbol: symbol.into().trim().to_string(),
            quantity,
            average_price,
            categories: BTreeSet::new(),
            market: None,
            valuation: None,
        }
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_categories(categories);
        self
    }

    /// Last resolved price, NaN before the first successful pass.
    pub fn current_price(&self) -> f64 {
        self.market.as_ref().map_or(f64::NAN, |m| m.current_price)
    }

    /// Explicit tags followed by the universal tag.
    pub fn all_categories(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(UNIVERSAL_CATEGORY))
    }

    pub fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
        self.recompute_valuation();
    }

    pub fn set_average_price(&mut self, average_price: f64) {
        self.average_price = average_price;
        self.recompute_valuation();
    }

    /// Replace the explicit tags. Blank labels and the universal tag are dropped.
    pub fn set_categories<I, S>(&mut self, categories: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories
            .into_iter()
            .map(|c| c.into().trim().to_string())
            .filter(|c| !c.is_empty() && c != UNIVERSAL_CATEGORY)
            .collect();
    }

    /// Install fresh market data and derive the valuation from it.
    pub fn apply_market_data(&mut self, market: MarketData) {
        self.market = Some(market);
        self.recompute_valuation();
    }

    /// Recompute the valuation from the current editable fields.
    /// Holdings without market data keep no valuation.
    pub fn recompute_valuation(&mut self) {
        self.valuation = self
            .market
            .as_ref()
            .map(|m| Valuation::compute(self.quantity, self.average_price, m.current_price));
    }
}
