use std::sync::Arc;

use crate::models::history::{HistoryPeriod, Interval};
use crate::providers::traits::MarketDataProvider;
use crate::services::fallback::FallbackChain;
use crate::services::history_service::HistoryService;

/// Resolves the current price of a ticker.
///
/// Order: fast quote, then the last minute close of the most recent
/// session. Never fails: a ticker no source can price resolves to NaN so
/// that downstream arithmetic carries "unknown" instead of aborting.
pub struct QuoteResolver {
    provider: Arc<dyn MarketDataProvider>,
    history: HistoryService,
}

impl QuoteResolver {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            history: HistoryService::new(Arc::clone(&provider)),
            provider,
        }
    }

    pub async fn resolve_current_price(&self, symbol: &str) -> f64 {
        FallbackChain::new("current price", symbol)
            .then("fast quote", async move {
                let info = self.provider.get_fast_info(symbol).await?;
                Ok(info.last_price.filter(|p| p.is_finite()))
            })
            .then("intraday history", async move {
                let closes = self
                    .history
                    .closes(symbol, HistoryPeriod::OneDay, Interval::OneMinute)
                    .await;
                Ok(closes.last().copied())
            })
            .resolve_or(f64::NAN)
            .await
    }
}
