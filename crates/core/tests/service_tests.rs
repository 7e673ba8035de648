// ═══════════════════════════════════════════════════════════════════
// Service Tests: AnalyticsService, HistoryService
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use stock_viewer_core::errors::CoreError;
use stock_viewer_core::models::history::{
    DividendPayment, HistoryPeriod, Interval, PriceHistory, PricePoint,
};
use stock_viewer_core::models::holding::{Holding, MarketData};
use stock_viewer_core::models::portfolio::Portfolio;
use stock_viewer_core::models::snapshot::{FastInfo, InfoSnapshot};
use stock_viewer_core::providers::traits::MarketDataProvider;
use stock_viewer_core::services::analytics_service::AnalyticsService;
use stock_viewer_core::services::grouping::categorize;
use stock_viewer_core::services::history_service::HistoryService;

fn priced(symbol: &str, quantity: i64, average_price: f64, price: f64) -> Holding {
    let mut h = Holding::new(symbol, quantity, average_price);
    h.apply_market_data(MarketData {
        current_price: price,
        long_name: symbol.into(),
        dividend_yield: f64::NAN,
        five_year_avg_dividend_yield: f64::NAN,
        forward_pe: f64::NAN,
        peg_ratio: f64::NAN,
        trailing_eps: f64::NAN,
        book_value: f64::NAN,
        price_to_book: f64::NAN,
        return_on_equity: f64::NAN,
        payout_ratio: f64::NAN,
        profit_margins: f64::NAN,
        sector: "N/A".into(),
        industry: "N/A".into(),
        currency: "N/A".into(),
        history: PriceHistory::default(),
        updated_at: Utc::now(),
    });
    h
}

// ═══════════════════════════════════════════════════════════════════
// AnalyticsService: summary
// ═══════════════════════════════════════════════════════════════════

mod summary {
    use super::*;

    #[test]
    fn totals_over_priced_holdings() {
        let portfolio: Portfolio = [priced("A", 10, 10.0, 12.0), priced("B", 5, 20.0, 18.0)]
            .into_iter()
            .collect();

        let s = AnalyticsService::new().summary(&portfolio);
        assert_eq!(s.holdings, 2);
        assert_eq!(s.without_market_data, 0);
        assert_eq!(s.total_amount, 210.0);
        assert_eq!(s.initial_amount, 200.0);
        assert_eq!(s.capital_gain, 10.0);
        assert_eq!(s.capital_gain_ratio, 0.05);
    }

    #[test]
    fn unpriced_holdings_are_left_out() {
        let portfolio: Portfolio = [
            priced("A", 10, 10.0, 12.0),
            priced("B", 5, 20.0, f64::NAN),
            Holding::new("C", 1, 99.0),
        ]
        .into_iter()
        .collect();

        let s = AnalyticsService::new().summary(&portfolio);
        assert_eq!(s.holdings, 3);
        assert_eq!(s.without_market_data, 1);
        assert_eq!(s.total_amount, 120.0);
        assert_eq!(s.initial_amount, 100.0);
    }

    #[test]
    fn empty_portfolio() {
        let s = AnalyticsService::default().summary(&Portfolio::new());
        assert_eq!(s.holdings, 0);
        assert_eq!(s.total_amount, 0.0);
        assert_eq!(s.capital_gain_ratio, 0.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// AnalyticsService: category totals
// ═══════════════════════════════════════════════════════════════════

mod category_totals {
    use super::*;

    #[test]
    fn sorted_ascending_without_universal() {
        let portfolio: Portfolio = [
            priced("A", 10, 1.0, 30.0).with_categories(["Big"]),
            priced("B", 1, 1.0, 5.0).with_categories(["Small", "Big"]),
            priced("C", 2, 1.0, 10.0).with_categories(["Mid"]),
        ]
        .into_iter()
        .collect();
        let index = categorize(&portfolio);

        let totals = AnalyticsService::new().category_totals(&portfolio, &index);
        let view: Vec<(&str, f64)> = totals
            .iter()
            .map(|t| (t.category.as_str(), t.value))
            .collect();
        assert_eq!(view, vec![("Small", 5.0), ("Mid", 20.0), ("Big", 305.0)]);
    }

    #[test]
    fn unknown_price_counts_as_zero() {
        let portfolio: Portfolio = [
            Holding::new("A", 10, 1.0).with_categories(["Tech"]),
            priced("B", 2, 1.0, 4.0).with_categories(["Tech"]),
        ]
        .into_iter()
        .collect();
        let index = categorize(&portfolio);

        let totals = AnalyticsService::new().category_totals(&portfolio, &index);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].value, 8.0);
    }

    #[test]
    fn untagged_portfolio_has_no_totals() {
        let portfolio: Portfolio = [priced("A", 1, 1.0, 1.0)].into_iter().collect();
        let index = categorize(&portfolio);
        assert!(AnalyticsService::new()
            .category_totals(&portfolio, &index)
            .is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// HistoryService
// ═══════════════════════════════════════════════════════════════════

/// Serves fixed series per period and counts history requests.
struct SeriesProvider {
    series: Vec<(HistoryPeriod, Vec<f64>)>,
    broken: Option<HistoryPeriod>,
    requests: AtomicUsize,
}

impl SeriesProvider {
    fn new(series: Vec<(HistoryPeriod, Vec<f64>)>) -> Self {
        Self {
            series,
            broken: None,
            requests: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MarketDataProvider for SeriesProvider {
    fn name(&self) -> &str {
        "Series"
    }

    async fn get_info(&self, _symbol: &str) -> Result<InfoSnapshot, CoreError> {
        Ok(InfoSnapshot::new())
    }

    async fn get_fast_info(&self, _symbol: &str) -> Result<FastInfo, CoreError> {
        Ok(FastInfo::default())
    }

    async fn get_price_history(
        &self,
        _symbol: &str,
        period: HistoryPeriod,
        _interval: Interval,
    ) -> Result<Vec<PricePoint>, CoreError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.broken == Some(period) {
            return Err(CoreError::Network("timeout".into()));
        }
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        Ok(self
            .series
            .iter()
            .find(|(p, _)| *p == period)
            .map(|(_, closes)| {
                closes
                    .iter()
                    .enumerate()
                    .map(|(i, c)| PricePoint::new(start + chrono::Duration::days(i as i64), *c))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_dividends(&self, _symbol: &str) -> Result<Vec<DividendPayment>, CoreError> {
        Ok(Vec::new())
    }

    async fn get_annual_net_income(&self, _symbol: &str) -> Result<Vec<f64>, CoreError> {
        Ok(Vec::new())
    }
}

mod history_service {
    use super::*;

    #[tokio::test]
    async fn returns_requested_window() {
        let provider = Arc::new(SeriesProvider::new(vec![(
            HistoryPeriod::OneMonth,
            vec![1.0, 2.0],
        )]));
        let service = HistoryService::new(provider.clone());

        let closes = service
            .closes("X", HistoryPeriod::OneMonth, Interval::OneDay)
            .await;
        assert_eq!(closes, vec![1.0, 2.0]);
        assert_eq!(provider.requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_finite_closes_are_dropped() {
        let provider = Arc::new(SeriesProvider::new(vec![(
            HistoryPeriod::OneMonth,
            vec![1.0, f64::NAN, 3.0],
        )]));
        let service = HistoryService::new(provider);

        let closes = service
            .closes("X", HistoryPeriod::OneMonth, Interval::OneDay)
            .await;
        assert_eq!(closes, vec![1.0, 3.0]);
    }

    #[tokio::test]
    async fn failed_window_falls_back_to_five_days() {
        let mut provider = SeriesProvider::new(vec![
            (HistoryPeriod::TwoYears, vec![1.0]),
            (HistoryPeriod::FiveDays, vec![4.0, 5.0]),
        ]);
        provider.broken = Some(HistoryPeriod::TwoYears);
        let service = HistoryService::new(Arc::new(provider));

        let closes = service
            .closes("X", HistoryPeriod::TwoYears, Interval::OneDay)
            .await;
        assert_eq!(closes, vec![4.0, 5.0]);
    }

    #[tokio::test]
    async fn five_day_request_is_not_retried() {
        let provider = Arc::new(SeriesProvider::new(Vec::new()));
        let service = HistoryService::new(provider.clone());

        let closes = service
            .closes("X", HistoryPeriod::FiveDays, Interval::OneDay)
            .await;
        assert!(closes.is_empty());
        assert_eq!(provider.requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn sparklines_fill_three_windows() {
        let provider = Arc::new(SeriesProvider::new(vec![
            (HistoryPeriod::TwoYears, vec![1.0, 2.0, 3.0]),
            (HistoryPeriod::SixMonths, vec![2.0, 3.0]),
            (HistoryPeriod::OneMonth, vec![3.0]),
        ]));
        let service = HistoryService::new(provider);

        let history = service.sparklines("X").await;
        assert_eq!(history.two_years, vec![1.0, 2.0, 3.0]);
        assert_eq!(history.six_months, vec![2.0, 3.0]);
        assert_eq!(history.one_month, vec![3.0]);
    }
}
