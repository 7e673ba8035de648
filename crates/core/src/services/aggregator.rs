use chrono::Utc;
use log::{error, info, warn};
use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::holding::MarketData;
use crate::models::portfolio::Portfolio;
use crate::models::settings::EngineSettings;
use crate::models::snapshot::{fields, InfoSnapshot};
use crate::providers::traits::MarketDataProvider;
use crate::services::fundamentals_resolver::{FundamentalsResolver, ResolveContext};
use crate::services::history_service::HistoryService;
use crate::services::progress::ProgressSink;
use crate::services::quote_resolver::QuoteResolver;

/// A ticker that could not be refreshed during a pass.
#[derive(Debug)]
pub struct TickerFailure {
    pub symbol: String,
    pub error: CoreError,
}

/// Outcome of one aggregation pass.
#[derive(Debug, Default)]
pub struct AggregationReport {
    /// Symbols whose market data was replaced, in portfolio order.
    pub refreshed: Vec<String>,
    /// Symbols left untouched, with the reason.
    pub failures: Vec<TickerFailure>,
}

impl AggregationReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_symbols(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.symbol.as_str()).collect()
    }
}

/// Enriches every holding of a portfolio with market data.
///
/// Tickers are processed one after another. A ticker that cannot be
/// priced and has no snapshot either is reported and skipped, keeping
/// whatever data it had; the rest of the batch carries on.
pub struct PortfolioAggregator {
    provider: Arc<dyn MarketDataProvider>,
    quotes: QuoteResolver,
    fundamentals: FundamentalsResolver,
    history: HistoryService,
    settings: EngineSettings,
}

impl PortfolioAggregator {
    pub fn new(provider: Arc<dyn MarketDataProvider>, settings: EngineSettings) -> Self {
        Self {
            quotes: QuoteResolver::new(Arc::clone(&provider)),
            fundamentals: FundamentalsResolver::new(
                Arc::clone(&provider),
                settings.peg_lookback_years,
            ),
            history: HistoryService::new(Arc::clone(&provider)),
            provider,
            settings,
        }
    }

    /// Replace the fundamentals resolver, e.g. to pin its reference date.
    pub fn with_fundamentals(mut self, fundamentals: FundamentalsResolver) -> Self {
        self.fundamentals = fundamentals;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Refresh every holding without progress feedback.
    pub async fn aggregate(&self, portfolio: &mut Portfolio) -> AggregationReport {
        let mut ignore = |_: usize, _: usize| {};
        self.aggregate_with_progress(portfolio, &mut ignore).await
    }

    /// Refresh every holding, reporting `(done, total)` after each ticker.
    pub async fn aggregate_with_progress(
        &self,
        portfolio: &mut Portfolio,
        progress: &mut (dyn ProgressSink + Send),
    ) -> AggregationReport {
        let symbols = portfolio.symbols();
        let total = symbols.len();
        let mut report = AggregationReport::default();

        info!(
            "Refreshing {total} holdings from {}",
            self.provider.name()
        );

        for (idx, symbol) in symbols.iter().enumerate() {
            if idx > 0 && self.settings.inter_ticker_delay_ms > 0 {
                tokio::time::sleep(self.settings.inter_ticker_delay()).await;
            }

            match self.fetch_market_data(symbol).await {
                Ok(market) => {
                    if let Some(holding) = portfolio.get_mut(symbol) {
                        holding.apply_market_data(market);
                    }
                    report.refreshed.push(symbol.clone());
                }
                Err(e) => {
                    error!("Error refreshing {symbol}: {e}");
                    progress.on_ticker_error(symbol, &e);
                    report.failures.push(TickerFailure {
                        symbol: symbol.clone(),
                        error: e,
                    });
                }
            }

            progress.on_progress(idx + 1, total);
        }

        info!(
            "Refreshed {} of {total} holdings ({} failed)",
            report.refreshed.len(),
            report.failures.len()
        );
        report
    }

    /// Resolve everything shown for one ticker.
    pub async fn fetch_market_data(&self, symbol: &str) -> Result<MarketData, CoreError> {
        let (info, snapshot_error) = match self.provider.get_info(symbol).await {
            Ok(info) => (info, None),
            Err(e) => {
                warn!("Snapshot for {symbol} unavailable, continuing without it: {e}");
                (InfoSnapshot::new(), Some(e))
            }
        };

        let current_price = self.quotes.resolve_current_price(symbol).await;

        if current_price.is_nan() {
            if let Some(e) = snapshot_error {
                return Err(CoreError::TickerUnavailable {
                    symbol: symbol.to_string(),
                    reason: format!("no quote and no snapshot ({e})"),
                });
            }
        }

        let ctx = ResolveContext::new(symbol, &info, current_price);
        let f = &self.fundamentals;

        Ok(MarketData {
            current_price,
            long_name: f.resolve_long_name(&ctx).await,
            dividend_yield: f.resolve_dividend_yield(&ctx).await,
            five_year_avg_dividend_yield: f.resolve_five_year_avg_dividend_yield(&ctx).await,
            forward_pe: f.resolve_forward_pe(&ctx).await,
            peg_ratio: f.resolve_peg_ratio(&ctx).await,
            trailing_eps: info.number_or_nan(fields::TRAILING_EPS),
            book_value: info.number_or_nan(fields::BOOK_VALUE),
            price_to_book: info.number_or_nan(fields::PRICE_TO_BOOK),
            return_on_equity: info.number_or_nan(fields::RETURN_ON_EQUITY),
            payout_ratio: info.number_or_nan(fields::PAYOUT_RATIO),
            profit_margins: info.number_or_nan(fields::PROFIT_MARGINS),
            sector: info.text_or_na(fields::SECTOR),
            industry: info.text_or_na(fields::INDUSTRY),
            currency: info.text_or_na(fields::CURRENCY),
            history: self.history.sparklines(symbol).await,
            updated_at: Utc::now(),
        })
    }
}
