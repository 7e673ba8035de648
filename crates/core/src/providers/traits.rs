use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::history::{DividendPayment, HistoryPeriod, Interval, PricePoint};
use crate::models::snapshot::{FastInfo, InfoSnapshot};

/// Trait abstraction over the external market-data collaborator.
///
/// The resolvers only ever talk to this trait, so a provider can be swapped
/// (or mocked in tests) without touching the fallback logic.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Fundamentals snapshot for a ticker.
    async fn get_info(&self, symbol: &str) -> Result<InfoSnapshot, CoreError>;

    /// Low-latency quote: last traded price and, if cheap to get, short name.
    async fn get_fast_info(&self, symbol: &str) -> Result<FastInfo, CoreError>;

    /// Short display name. Only the long-name fallback asks for it, so
    /// providers that need an extra request for it should override this.
    async fn get_short_name(&self, symbol: &str) -> Result<Option<String>, CoreError> {
        Ok(self.get_fast_info(symbol).await?.short_name)
    }

    /// Closing prices for the requested window, oldest first.
    /// Adjusted closes are preferred when the provider has them.
    async fn get_price_history(
        &self,
        symbol: &str,
        period: HistoryPeriod,
        interval: Interval,
    ) -> Result<Vec<PricePoint>, CoreError>;

    /// Every dividend payment the provider knows of, oldest first.
    async fn get_dividends(&self, symbol: &str) -> Result<Vec<DividendPayment>, CoreError>;

    /// Yearly net income, oldest fiscal year first.
    async fn get_annual_net_income(&self, symbol: &str) -> Result<Vec<f64>, CoreError>;
}
