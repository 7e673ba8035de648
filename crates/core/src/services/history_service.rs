use std::sync::Arc;

use log::debug;

use crate::models::history::{HistoryPeriod, Interval, PriceHistory};
use crate::providers::traits::MarketDataProvider;

/// Window tried when the requested one comes back empty.
const FALLBACK_PERIOD: HistoryPeriod = HistoryPeriod::FiveDays;

/// Fetches closing-price series for sparklines and quote fallbacks.
pub struct HistoryService {
    provider: Arc<dyn MarketDataProvider>,
}

impl HistoryService {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    /// Finite closes for `period`, oldest first.
    ///
    /// Falls back to the 5-day window when the requested one errors or is
    /// empty; returns an empty series when both do.
    pub async fn closes(&self, symbol: &str, period: HistoryPeriod, interval: Interval) -> Vec<f64> {
        let mut periods = vec![period];
        if period != FALLBACK_PERIOD {
            periods.push(FALLBACK_PERIOD);
        }

        for p in periods {
            match self.provider.get_price_history(symbol, p, interval).await {
                Ok(points) => {
                    let closes: Vec<f64> = points
                        .into_iter()
                        .map(|pt| pt.price)
                        .filter(|price| price.is_finite())
                        .collect();
                    if !closes.is_empty() {
                        return closes;
                    }
                    debug!("{p} history for {symbol} is empty");
                }
                Err(e) => debug!("{p} history for {symbol} failed: {e}"),
            }
        }
        Vec::new()
    }

    /// The three daily windows shown next to each holding.
    pub async fn sparklines(&self, symbol: &str) -> PriceHistory {
        PriceHistory {
            two_years: self.closes(symbol, HistoryPeriod::TwoYears, Interval::OneDay).await,
            six_months: self.closes(symbol, HistoryPeriod::SixMonths, Interval::OneDay).await,
            one_month: self.closes(symbol, HistoryPeriod::OneMonth, Interval::OneDay).await,
        }
    }
}
