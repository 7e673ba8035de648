use chrono::{Datelike, Duration, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::history::{DividendPayment, HistoryPeriod, Interval, PricePoint};
use crate::models::snapshot::{fields, InfoSnapshot};
use crate::providers::traits::MarketDataProvider;
use crate::services::fallback::FallbackChain;

/// Days counted as the trailing year for dividend yield.
const TRAILING_YEAR_DAYS: i64 = 365;

/// Fewest yearly yields accepted for a five-year average.
const MIN_YIELD_YEARS: usize = 2;

/// Ticker suffixes that get a readable exchange label when no name is known.
const EXCHANGE_SUFFIXES: &[(&str, &str)] = &[(".SA", "B3")];

/// What every metric resolver gets to work with for one ticker.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub symbol: &'a str,
    pub info: &'a InfoSnapshot,
    /// Already resolved by the quote resolver; may be NaN.
    pub current_price: f64,
}

impl<'a> ResolveContext<'a> {
    pub fn new(symbol: &'a str, info: &'a InfoSnapshot, current_price: f64) -> Self {
        Self {
            symbol,
            info,
            current_price,
        }
    }

    fn positive_price(&self) -> Option<f64> {
        Some(self.current_price).filter(|p| p.is_finite() && *p > 0.0)
    }
}

/// Resolves fundamentals, each metric through its own fallback chain:
/// the provider's snapshot field first, then a local estimate computed
/// from raw series, then NaN.
pub struct FundamentalsResolver {
    provider: Arc<dyn MarketDataProvider>,
    peg_lookback_years: u32,
    as_of: Option<NaiveDate>,
}

impl FundamentalsResolver {
    pub fn new(provider: Arc<dyn MarketDataProvider>, peg_lookback_years: u32) -> Self {
        Self {
            provider,
            peg_lookback_years: peg_lookback_years.max(1),
            as_of: None,
        }
    }

    /// Pin the reference date used for trailing windows (defaults to today, UTC).
    /// Payments dated after it are ignored.
    pub fn with_as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = Some(date);
        self
    }

    fn reference_date(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }

    pub async fn resolve_dividend_yield(&self, ctx: &ResolveContext<'_>) -> f64 {
        FallbackChain::new("dividend yield", ctx.symbol)
            .then_value("provider", ctx.info.positive(fields::DIVIDEND_YIELD))
            .then("trailing dividends", async move {
                let Some(price) = ctx.positive_price() else {
                    return Ok(None);
                };
                let dividends = self.provider.get_dividends(ctx.symbol).await?;
                Ok(trailing_dividend_yield(&dividends, price, self.reference_date()))
            })
            .resolve_or(f64::NAN)
            .await
    }

    pub async fn resolve_five_year_avg_dividend_yield(&self, ctx: &ResolveContext<'_>) -> f64 {
        FallbackChain::new("five-year average dividend yield", ctx.symbol)
            .then_value(
                "provider",
                ctx.info.positive(fields::FIVE_YEAR_AVG_DIVIDEND_YIELD),
            )
            .then("yearly dividends over yearly prices", async move {
                let dividends = self.provider.get_dividends(ctx.symbol).await?;
                if dividends.is_empty() {
                    return Ok(None);
                }
                let prices = self
                    .provider
                    .get_price_history(ctx.symbol, HistoryPeriod::FiveYears, Interval::OneDay)
                    .await?;
                Ok(average_yearly_yield(&dividends, &prices))
            })
            .resolve_or(f64::NAN)
            .await
    }

    pub async fn resolve_forward_pe(&self, ctx: &ResolveContext<'_>) -> f64 {
        FallbackChain::new("forward P/E", ctx.symbol)
            .then_value("provider", ctx.info.positive(fields::FORWARD_PE))
            .then_value(
                "price over forward EPS",
                ctx.positive_price()
                    .zip(ctx.info.positive(fields::FORWARD_EPS))
                    .map(|(price, eps)| price / eps),
            )
            .resolve_or(f64::NAN)
            .await
    }

    pub async fn resolve_peg_ratio(&self, ctx: &ResolveContext<'_>) -> f64 {
        let years = self.peg_lookback_years;
        FallbackChain::new("PEG ratio", ctx.symbol)
            .then_value("provider", ctx.info.positive(fields::PEG_RATIO))
            .then("trailing P/E over net income growth", async move {
                let Some(pe) = ctx.info.positive(fields::TRAILING_PE) else {
                    return Ok(None);
                };
                let net_income = self.provider.get_annual_net_income(ctx.symbol).await?;
                Ok(net_income_growth(&net_income, years).map(|growth| pe / (growth * 100.0)))
            })
            .resolve_or(f64::NAN)
            .await
    }

    pub async fn resolve_long_name(&self, ctx: &ResolveContext<'_>) -> String {
        let provider_name = ctx
            .info
            .text(fields::LONG_NAME)
            .or_else(|| ctx.info.text(fields::SHORT_NAME))
            .map(str::to_string);

        FallbackChain::new("long name", ctx.symbol)
            .then_value("provider", provider_name)
            .then("provider short name", async move {
                let name = self.provider.get_short_name(ctx.symbol).await?;
                Ok(name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()))
            })
            .resolve_or(ticker_label(ctx.symbol))
            .await
    }
}

/// Sum of the last year of payments divided by the price.
///
/// The year runs back from the latest payment on or before `as_of`, so a
/// ticker that stopped paying still reports its last known yearly yield.
/// `None` when the ticker has no dividend history at all.
pub fn trailing_dividend_yield(
    dividends: &[DividendPayment],
    price: f64,
    as_of: NaiveDate,
) -> Option<f64> {
    if dividends.is_empty() || price.is_nan() || price <= 0.0 {
        return None;
    }
    let Some(latest) = dividends.iter().map(|d| d.date).filter(|d| *d <= as_of).max() else {
        return Some(0.0);
    };
    let since = latest - Duration::days(TRAILING_YEAR_DAYS);
    // fold from +0.0; Sum for f64 starts at -0.0
    let total = dividends
        .iter()
        .filter(|d| d.date > since && d.date <= latest)
        .map(|d| d.amount)
        .fold(0.0, |acc, amount| acc + amount);
    Some(total / price)
}

/// Mean of per-year yields (yearly dividend sum / yearly mean close).
///
/// Only years present in both series count; years with a non-positive or
/// non-finite yield are dropped. `None` below two usable years.
pub fn average_yearly_yield(dividends: &[DividendPayment], prices: &[PricePoint]) -> Option<f64> {
    let mut yearly_dividends: BTreeMap<i32, f64> = BTreeMap::new();
    for d in dividends {
        *yearly_dividends.entry(d.date.year()).or_default() += d.amount;
    }

    let mut yearly_prices: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    for p in prices.iter().filter(|p| p.price.is_finite()) {
        let entry = yearly_prices.entry(p.date.year()).or_default();
        entry.0 += p.price;
        entry.1 += 1;
    }

    let yields: Vec<f64> = yearly_dividends
        .iter()
        .filter_map(|(year, dividend)| {
            let (sum, count) = yearly_prices.get(year)?;
            let mean_price = sum / *count as f64;
            Some(dividend / mean_price)
        })
        .filter(|y| y.is_finite() && *y > 0.0)
        .collect();

    if yields.len() < MIN_YIELD_YEARS {
        return None;
    }
    Some(yields.iter().sum::<f64>() / yields.len() as f64)
}

/// Annualized net income growth over the last `years` years.
///
/// Needs `years + 1` yearly values (oldest first) with a strictly positive
/// start and end. Flat or shrinking income yields `None`.
pub fn net_income_growth(net_income: &[f64], years: u32) -> Option<f64> {
    let span = years as usize;
    if years == 0 || net_income.len() < span + 1 {
        return None;
    }
    let start = net_income[net_income.len() - (span + 1)];
    let end = net_income[net_income.len() - 1];
    if start.is_nan() || end.is_nan() || start <= 0.0 || end <= 0.0 {
        return None;
    }
    let growth = (end / start).powf(1.0 / years as f64) - 1.0;
    (growth.is_finite() && growth > 0.0).then_some(growth)
}

/// Readable name built from the ticker alone, e.g. `PETR4.SA` → `PETR4 (B3)`.
pub fn ticker_label(symbol: &str) -> String {
    let symbol = symbol.trim();
    for (suffix, exchange) in EXCHANGE_SUFFIXES {
        if let Some(base) = symbol.strip_suffix(suffix) {
            return format!("{base} ({exchange})");
        }
    }
    symbol.to_string()
}
