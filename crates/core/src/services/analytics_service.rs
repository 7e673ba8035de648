use std::cmp::Ordering;

use crate::models::analytics::{CategoryTotal, PortfolioSummary};
use crate::models::category::CategoryIndex;
use crate::models::holding::UNIVERSAL_CATEGORY;
use crate::models::portfolio::Portfolio;

/// Portfolio-level figures derived from already-enriched holdings.
///
/// Pure business logic: no I/O, no API calls.
pub struct AnalyticsService;

impl AnalyticsService {
    pub fn new() -> Self {
        Self
    }

    /// Totals over every holding with a known valuation.
    pub fn summary(&self, portfolio: &Portfolio) -> PortfolioSummary {
        let mut total_amount = 0.0;
        let mut initial_amount = 0.0;
        let mut without_market_data = 0;

        for holding in portfolio {
            match &holding.valuation {
                Some(v) if v.total_amount.is_finite() && v.initial_amount.is_finite() => {
                    total_amount += v.total_amount;
                    initial_amount += v.initial_amount;
                }
                Some(_) => {}
                None => without_market_data += 1,
            }
        }

        let capital_gain = total_amount - initial_amount;
        let capital_gain_ratio = if initial_amount == 0.0 {
            0.0
        } else {
            capital_gain / initial_amount
        };

        PortfolioSummary {
            holdings: portfolio.len(),
            without_market_data,
            total_amount,
            initial_amount,
            capital_gain,
            capital_gain_ratio,
        }
    }

    /// Market value of each explicit category, smallest first.
    ///
    /// A holding with no known price contributes nothing. The universal
    /// category is left out.
    pub fn category_totals(&self, portfolio: &Portfolio, index: &CategoryIndex) -> Vec<CategoryTotal> {
        let mut totals: Vec<CategoryTotal> = index
            .iter()
            .filter(|(category, _)| *category != UNIVERSAL_CATEGORY)
            .map(|(category, symbols)| {
                let value = symbols
                    .iter()
                    .filter_map(|s| portfolio.get(s))
                    .map(|h| {
                        let price = h.current_price();
                        if price.is_finite() {
                            h.quantity as f64 * price
                        } else {
                            0.0
                        }
                    })
                    .sum();
                CategoryTotal {
                    category: category.to_string(),
                    value,
                }
            })
            .collect();

        totals.sort_by(|a, b| a.value.partial_cmp(&b.value).unwrap_or(Ordering::Equal));
        totals
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new()
    }
}
