use serde::{Deserialize, Serialize};

/// Totals across the whole portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Number of holdings in the portfolio
    pub holdings: usize,

    /// Holdings that have no market data yet (never refreshed or failed every pass)
    pub without_market_data: usize,

    /// Sum of current values, skipping unknown prices
    pub total_amount: f64,

    /// Sum of invested amounts of the holdings counted in `total_amount`
    pub initial_amount: f64,

    /// total_amount - initial_amount
    pub capital_gain: f64,

    /// capital_gain / initial_amount, 0.0 when nothing was invested
    pub capital_gain_ratio: f64,
}

/// Market value of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Up,
    Down,
}

/// Change over a price window, first close to last close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceTrend {
    pub change_percent: f64,
    pub direction: TrendDirection,
}

impl PriceTrend {
    /// `None` for an empty window or a zero first close.
    pub fn from_closes(closes: &[f64]) -> Option<Self> {
        let first = *closes.first()?;
        let last = *closes.last()?;
        if first == 0.0 {
            return None;
        }
        let direction = if first < last {
            TrendDirection::Up
        } else {
            TrendDirection::Down
        };
        Some(Self {
            change_percent: (last - first) * 100.0 / first,
            direction,
        })
    }
}
