pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::path::Path;
use std::sync::Arc;

use models::{
    analytics::{CategoryTotal, PortfolioSummary},
    category::CategoryIndex,
    holding::Holding,
    portfolio::Portfolio,
    settings::EngineSettings,
};
use providers::{b3_history::B3History, traits::MarketDataProvider};
use services::{
    aggregator::{AggregationReport, PortfolioAggregator},
    analytics_service::AnalyticsService,
    grouping,
    progress::ProgressSink,
};
use storage::manager::StorageManager;

use errors::CoreError;

/// Main entry point for the Stock Viewer core library.
///
/// Owns the holdings being viewed, their category index and the engine
/// services. A presentation layer loads a portfolio file, calls
/// [`StockViewer::refresh`], renders holdings and categories, and routes
/// cell edits back through the setters so derived values stay consistent.
#[must_use]
pub struct StockViewer {
    portfolio: Portfolio,
    categories: CategoryIndex,
    aggregator: PortfolioAggregator,
    analytics_service: AnalyticsService,
    /// Tracks whether any editable field changed since the last save/load.
    dirty: bool,
}

impl std::fmt::Debug for StockViewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockViewer")
            .field("holdings", &self.portfolio.len())
            .field("categories", &self.categories.len())
            .field("settings", self.aggregator.settings())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl StockViewer {
    /// Create a viewer with an empty portfolio.
    pub fn new(provider: Arc<dyn MarketDataProvider>, settings: EngineSettings) -> Self {
        Self::with_portfolio(provider, settings, Portfolio::new())
    }

    /// Create a viewer around an existing portfolio.
    pub fn with_portfolio(
        provider: Arc<dyn MarketDataProvider>,
        settings: EngineSettings,
        portfolio: Portfolio,
    ) -> Self {
        Self::with_aggregator(PortfolioAggregator::new(provider, settings), portfolio)
    }

    /// Create a viewer around a preconfigured aggregator.
    pub fn with_aggregator(aggregator: PortfolioAggregator, portfolio: Portfolio) -> Self {
        let categories = grouping::categorize(&portfolio);
        Self {
            portfolio,
            categories,
            aggregator,
            analytics_service: AnalyticsService::new(),
            dirty: false,
        }
    }

    // ── Persistence ─────────────────────────────────────────────────

    /// Replace the holdings with the contents of a portfolio file.
    /// Market data of the previous holdings is discarded.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), CoreError> {
        let portfolio = StorageManager::load_from_file(path)?;
        self.replace_portfolio(portfolio);
        Ok(())
    }

    /// Replace the holdings with a portfolio document.
    pub fn load_str(&mut self, json: &str) -> Result<(), CoreError> {
        let portfolio = StorageManager::load_from_str(json)?;
        self.replace_portfolio(portfolio);
        Ok(())
    }

    /// Write editable fields to a portfolio file.
    /// Clears the unsaved-changes flag on success.
    pub fn save_file(&mut self, path: impl AsRef<Path>) -> Result<(), CoreError> {
        StorageManager::save_to_file(&self.portfolio, path)?;
        self.dirty = false;
        Ok(())
    }

    /// Serialize editable fields to a portfolio document.
    pub fn save_string(&self) -> Result<String, CoreError> {
        StorageManager::save_to_string(&self.portfolio)
    }

    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ── Market Data ─────────────────────────────────────────────────

    /// Run an aggregation pass over every holding.
    ///
    /// Takes `&mut self`, so no edit can happen while the pass runs.
    pub async fn refresh(&mut self) -> AggregationReport {
        let report = self.aggregator.aggregate(&mut self.portfolio).await;
        self.categories = grouping::categorize(&self.portfolio);
        report
    }

    /// Run an aggregation pass, reporting progress after each ticker.
    pub async fn refresh_with_progress(
        &mut self,
        progress: &mut (dyn ProgressSink + Send),
    ) -> AggregationReport {
        let report = self
            .aggregator
            .aggregate_with_progress(&mut self.portfolio, progress)
            .await;
        self.categories = grouping::categorize(&self.portfolio);
        report
    }

    /// Load B3 exchange history using this viewer's cache directory.
    pub async fn load_b3_history(
        &self,
        progress: &mut (dyn ProgressSink + Send),
    ) -> Result<B3History, CoreError> {
        B3History::load(self.aggregator.settings(), progress).await
    }

    // ── Holdings ────────────────────────────────────────────────────

    #[must_use]
    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    #[must_use]
    pub fn holding(&self, symbol: &str) -> Option<&Holding> {
        self.portfolio.get(symbol)
    }

    /// Holdings of one category, in portfolio order.
    #[must_use]
    pub fn holdings_in(&self, category: &str) -> Vec<&Holding> {
        self.categories
            .members(category)
            .iter()
            .filter_map(|s| self.portfolio.get(s))
            .collect()
    }

    /// Add a holding, or replace the one with the same symbol.
    pub fn upsert_holding(&mut self, holding: Holding) {
        self.portfolio.insert(holding);
        self.categories = grouping::categorize(&self.portfolio);
        self.dirty = true;
    }

    pub fn remove_holding(&mut self, symbol: &str) -> Result<Holding, CoreError> {
        let removed = self
            .portfolio
            .remove(symbol)
            .ok_or_else(|| CoreError::HoldingNotFound(symbol.to_string()))?;
        self.categories = grouping::categorize(&self.portfolio);
        self.dirty = true;
        Ok(removed)
    }

    /// Edit the share count; the valuation follows immediately.
    pub fn set_quantity(&mut self, symbol: &str, quantity: i64) -> Result<&Holding, CoreError> {
        let holding = self.holding_mut(symbol)?;
        holding.set_quantity(quantity);
        self.dirty = true;
        self.holding_ref(symbol)
    }

    /// Edit the average price; the valuation follows immediately.
    pub fn set_average_price(
        &mut self,
        symbol: &str,
        average_price: f64,
    ) -> Result<&Holding, CoreError> {
        if !average_price.is_finite() {
            return Err(CoreError::ValidationError(format!(
                "average price of {symbol} must be a finite number"
            )));
        }
        let holding = self.holding_mut(symbol)?;
        holding.set_average_price(average_price);
        self.dirty = true;
        self.holding_ref(symbol)
    }

    /// Replace the explicit tags of a holding and rebuild the category index.
    pub fn set_categories<I, S>(&mut self, symbol: &str, categories: I) -> Result<(), CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.holding_mut(symbol)?.set_categories(categories);
        self.categories = grouping::categorize(&self.portfolio);
        self.dirty = true;
        Ok(())
    }

    // ── Categories & Analytics ──────────────────────────────────────

    #[must_use]
    pub fn categories(&self) -> &CategoryIndex {
        &self.categories
    }

    #[must_use]
    pub fn summary(&self) -> PortfolioSummary {
        self.analytics_service.summary(&self.portfolio)
    }

    /// Market value per explicit category, smallest first.
    #[must_use]
    pub fn category_totals(&self) -> Vec<CategoryTotal> {
        self.analytics_service
            .category_totals(&self.portfolio, &self.categories)
    }

    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        self.aggregator.settings()
    }

    fn replace_portfolio(&mut self, portfolio: Portfolio) {
        self.categories = grouping::categorize(&portfolio);
        self.portfolio = portfolio;
        self.dirty = false;
    }

    fn holding_mut(&mut self, symbol: &str) -> Result<&mut Holding, CoreError> {
        self.portfolio
            .get_mut(symbol)
            .ok_or_else(|| CoreError::HoldingNotFound(symbol.to_string()))
    }

    fn holding_ref(&self, symbol: &str) -> Result<&Holding, CoreError> {
        self.portfolio
            .get(symbol)
            .ok_or_else(|| CoreError::HoldingNotFound(symbol.to_string()))
    }
}
