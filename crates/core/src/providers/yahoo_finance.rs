use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use reqwest::{header, Client};
use serde_json::{Map, Value};
use std::sync::Mutex;

use crate::errors::CoreError;
use crate::models::history::{DividendPayment, HistoryPeriod, Interval, PricePoint};
use crate::models::snapshot::{FastInfo, InfoSnapshot};
use super::traits::MarketDataProvider;

const PROVIDER_NAME: &str = "Yahoo Finance";
const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";
const QUOTE_SUMMARY_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// quoteSummary modules merged into the fundamentals snapshot, in priority order.
const SNAPSHOT_MODULES: &[&str] = &[
    "price",
    "summaryDetail",
    "defaultKeyStatistics",
    "financialData",
    "summaryProfile",
];

#[derive(Debug, Clone)]
struct Crumb {
    cookie: String,
    value: String,
}

/// Yahoo Finance market-data provider.
///
/// - **Free**: No API key required.
/// - **Chart data** (quotes, ranges, dividend events, ticker search) goes
///   through the `yahoo_finance_api` connector.
/// - **Fundamentals** come from the `quoteSummary` endpoint, which needs a
///   cookie + crumb pair. The pair is fetched lazily and cached on this
///   instance; a rejected request drops it so the next call re-authenticates.
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
    client: Client,
    crumb: Mutex<Option<Crumb>>,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new()
            .map_err(|e| api_error(format!("Failed to create connector: {e}")))?;
        Ok(Self {
            connector,
            client: Client::new(),
            crumb: Mutex::new(None),
        })
    }

    /// Convert a unix timestamp (seconds) to `chrono::NaiveDate`.
    fn timestamp_to_naive_date(ts: i64) -> Option<NaiveDate> {
        chrono::DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
    }

    async fn crumb(&self) -> Result<Crumb, CoreError> {
        let cached = {
            let guard = self
                .crumb
                .lock()
                .map_err(|_| api_error("Crumb lock poisoned".into()))?;
            guard.clone()
        };
        if let Some(crumb) = cached {
            return Ok(crumb);
        }

        let crumb = self.fetch_crumb().await?;
        if let Ok(mut guard) = self.crumb.lock() {
            *guard = Some(crumb.clone());
        }
        Ok(crumb)
    }

    fn forget_crumb(&self) {
        if let Ok(mut guard) = self.crumb.lock() {
            *guard = None;
        }
    }

    async fn fetch_crumb(&self) -> Result<Crumb, CoreError> {
        let response = self
            .client
            .get(COOKIE_URL)
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split_once(';').map(|(value, _)| value.to_string()))
            .ok_or_else(|| api_error("Missing authentication cookie".into()))?;

        let value = self
            .client
            .get(CRUMB_URL)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::COOKIE, &cookie)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        if value.trim().is_empty() {
            return Err(api_error("Empty authentication crumb".into()));
        }

        Ok(Crumb {
            cookie,
            value: value.trim().to_string(),
        })
    }

    /// Fetch `quoteSummary` modules and return the first result object.
    async fn quote_summary(&self, symbol: &str, modules: &[&str]) -> Result<Value, CoreError> {
        let crumb = self.crumb().await?;
        let url = format!(
            "{QUOTE_SUMMARY_URL}/{symbol}?modules={}&crumb={}",
            modules.join(","),
            crumb.value
        );

        let response = self
            .client
            .get(&url)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::COOKIE, &crumb.cookie)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            if status == reqwest::StatusCode::UNAUTHORIZED {
                debug!("Crumb rejected for {symbol}; re-authenticating on next call");
                self.forget_crumb();
            }
            return Err(api_error(format!(
                "quoteSummary for {symbol} returned HTTP {status}"
            )));
        }

        let body: Value = response.json().await?;
        body.pointer("/quoteSummary/result/0")
            .cloned()
            .ok_or_else(|| CoreError::DataNotAvailable {
                symbol: symbol.to_string(),
                what: "quote summary".into(),
            })
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn get_info(&self, symbol: &str) -> Result<InfoSnapshot, CoreError> {
        let result = self.quote_summary(symbol, SNAPSHOT_MODULES).await?;
        Ok(flatten_quote_summary(&result, SNAPSHOT_MODULES))
    }

    async fn get_fast_info(&self, symbol: &str) -> Result<FastInfo, CoreError> {
        let resp = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| api_error(format!("Latest quote for {symbol} failed: {e}")))?;

        let last_price = resp
            .last_quote()
            .ok()
            .map(|q| q.close)
            .filter(|p| p.is_finite())
            .ok_or_else(|| CoreError::DataNotAvailable {
                symbol: symbol.to_string(),
                what: "fast quote".into(),
            })?;

        Ok(FastInfo {
            last_price: Some(last_price),
            short_name: None,
        })
    }

    /// Short name from the ticker search, matched on the exact symbol.
    async fn get_short_name(&self, symbol: &str) -> Result<Option<String>, CoreError> {
        let found = self
            .connector
            .search_ticker(symbol)
            .await
            .map_err(|e| api_error(format!("Ticker search for {symbol} failed: {e}")))?;

        Ok(found
            .quotes
            .into_iter()
            .find(|item| item.symbol == symbol)
            .map(|item| item.short_name.trim().to_string())
            .filter(|name| !name.is_empty()))
    }

    async fn get_price_history(
        &self,
        symbol: &str,
        period: HistoryPeriod,
        interval: Interval,
    ) -> Result<Vec<PricePoint>, CoreError> {
        let resp = self
            .connector
            .get_quote_range(symbol, interval.as_str(), period.as_range())
            .await
            .map_err(|e| {
                api_error(format!(
                    "Failed to fetch {period} history for {symbol}: {e}"
                ))
            })?;

        let quotes = resp
            .quotes()
            .map_err(|e| api_error(format!("Failed to parse quotes for {symbol}: {e}")))?;

        let points = quotes
            .iter()
            .filter_map(|q| {
                let date = Self::timestamp_to_naive_date(q.timestamp)?;
                let price = if q.adjclose.is_finite() && q.adjclose > 0.0 {
                    q.adjclose
                } else {
                    q.close
                };
                price.is_finite().then_some(PricePoint { date, price })
            })
            .collect();

        Ok(points)
    }

    async fn get_dividends(&self, symbol: &str) -> Result<Vec<DividendPayment>, CoreError> {
        let resp = self
            .connector
            .get_quote_range(symbol, "1mo", "max")
            .await
            .map_err(|e| api_error(format!("Failed to fetch dividends for {symbol}: {e}")))?;

        let dividends = resp
            .dividends()
            .map_err(|e| api_error(format!("Failed to parse dividends for {symbol}: {e}")))?;

        let mut payments: Vec<DividendPayment> = dividends
            .iter()
            .filter_map(|d| {
                let date = Self::timestamp_to_naive_date(d.date as i64)?;
                d.amount
                    .is_finite()
                    .then_some(DividendPayment::new(date, d.amount))
            })
            .collect();
        payments.sort_by_key(|p| p.date);

        Ok(payments)
    }

    async fn get_annual_net_income(&self, symbol: &str) -> Result<Vec<f64>, CoreError> {
        let result = self
            .quote_summary(symbol, &["incomeStatementHistory"])
            .await?;
        Ok(parse_annual_net_income(&result))
    }
}

fn api_error(message: String) -> CoreError {
    CoreError::Api {
        provider: PROVIDER_NAME.into(),
        message,
    }
}

/// Merge the requested `quoteSummary` modules into one flat snapshot.
///
/// Yahoo wraps numbers as `{"raw": 0.05, "fmt": "5.00%"}`; the raw value is
/// kept. Plain strings and numbers are kept as-is, anything else (empty
/// objects, nested lists) is dropped. When two modules carry the same
/// field, the earlier module in `modules` wins.
pub fn flatten_quote_summary(result: &Value, modules: &[&str]) -> InfoSnapshot {
    let mut fields = Map::new();

    for module in modules {
        let Some(entries) = result.get(*module).and_then(Value::as_object) else {
            continue;
        };
        for (key, value) in entries {
            let flat = match value {
                Value::Object(obj) => match obj.get("raw") {
                    Some(raw) if !raw.is_null() => raw.clone(),
                    _ => continue,
                },
                Value::Number(_) | Value::String(_) | Value::Bool(_) => value.clone(),
                _ => continue,
            };
            fields.entry(key.clone()).or_insert(flat);
        }
    }

    InfoSnapshot::from_map(fields)
}

/// Yearly net income from an `incomeStatementHistory` module, oldest first.
pub fn parse_annual_net_income(result: &Value) -> Vec<f64> {
    let statements = result
        .pointer("/incomeStatementHistory/incomeStatementHistory")
        .and_then(Value::as_array);

    let mut rows: Vec<(i64, f64)> = statements
        .into_iter()
        .flatten()
        .filter_map(|statement| {
            let end = statement.pointer("/endDate/raw").and_then(Value::as_i64)?;
            let income = statement
                .pointer("/netIncome/raw")
                .and_then(Value::as_f64)
                .filter(|v| v.is_finite())?;
            Some((end, income))
        })
        .collect();

    rows.sort_by_key(|(end, _)| *end);
    rows.into_iter().map(|(_, income)| income).collect()
}
