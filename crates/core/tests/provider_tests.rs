// ═══════════════════════════════════════════════════════════════════
// Provider Tests: Yahoo quoteSummary parsing, provider wiring
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use serde_json::json;

use stock_viewer_core::errors::CoreError;
use stock_viewer_core::models::history::{DividendPayment, HistoryPeriod, Interval, PricePoint};
use stock_viewer_core::models::snapshot::{FastInfo, InfoSnapshot};
use stock_viewer_core::providers::traits::MarketDataProvider;
use stock_viewer_core::providers::yahoo_finance::{
    flatten_quote_summary, parse_annual_net_income, YahooFinanceProvider,
};

// ═══════════════════════════════════════════════════════════════════
// flatten_quote_summary
// ═══════════════════════════════════════════════════════════════════

mod flatten {
    use super::*;

    fn result() -> serde_json::Value {
        json!({
            "price": {
                "longName": "Apple Inc.",
                "shortName": "Apple Inc.",
                "currency": "USD",
                "regularMarketPrice": { "raw": 201.5, "fmt": "201.50" }
            },
            "summaryDetail": {
                "dividendYield": { "raw": 0.0048, "fmt": "0.48%" },
                "fiveYearAvgDividendYield": { "raw": 0.62, "fmt": "0.62" },
                "forwardPE": {},
                "currency": "EUR"
            },
            "defaultKeyStatistics": {
                "pegRatio": { "raw": 2.3 },
                "bookValue": { "raw": 4.4 },
                "trailingEps": { "raw": 6.4 },
                "forwardEps": { "raw": null }
            },
            "summaryProfile": {
                "sector": "Technology",
                "industry": "Consumer Electronics",
                "companyOfficers": []
            }
        })
    }

    const MODULES: &[&str] = &[
        "price",
        "summaryDetail",
        "defaultKeyStatistics",
        "financialData",
        "summaryProfile",
    ];

    #[test]
    fn takes_raw_numbers() {
        let info = flatten_quote_summary(&result(), MODULES);
        assert_eq!(info.number("dividendYield"), Some(0.0048));
        assert_eq!(info.number("fiveYearAvgDividendYield"), Some(0.62));
        assert_eq!(info.number("pegRatio"), Some(2.3));
        assert_eq!(info.number("regularMarketPrice"), Some(201.5));
    }

    #[test]
    fn keeps_plain_strings() {
        let info = flatten_quote_summary(&result(), MODULES);
        assert_eq!(info.text("longName"), Some("Apple Inc."));
        assert_eq!(info.text("sector"), Some("Technology"));
        assert_eq!(info.text("industry"), Some("Consumer Electronics"));
    }

    #[test]
    fn empty_and_null_values_are_missing() {
        let info = flatten_quote_summary(&result(), MODULES);
        assert!(!info.contains("forwardPE"));
        assert!(!info.contains("forwardEps"));
        assert!(!info.contains("companyOfficers"));
    }

    #[test]
    fn earlier_module_wins_on_duplicate_keys() {
        let info = flatten_quote_summary(&result(), MODULES);
        assert_eq!(info.text("currency"), Some("USD"));
    }

    #[test]
    fn missing_modules_are_ignored() {
        let info = flatten_quote_summary(&json!({}), MODULES);
        assert!(info.is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// parse_annual_net_income
// ═══════════════════════════════════════════════════════════════════

mod net_income {
    use super::*;

    #[test]
    fn sorted_oldest_first() {
        let result = json!({
            "incomeStatementHistory": {
                "incomeStatementHistory": [
                    { "endDate": { "raw": 1727654400 }, "netIncome": { "raw": 93736000000.0 } },
                    { "endDate": { "raw": 1664496000 }, "netIncome": { "raw": 99803000000.0 } },
                    { "endDate": { "raw": 1696032000 }, "netIncome": { "raw": 96995000000.0 } }
                ]
            }
        });

        assert_eq!(
            parse_annual_net_income(&result),
            vec![99803000000.0, 96995000000.0, 93736000000.0]
        );
    }

    #[test]
    fn incomplete_statements_are_skipped() {
        let result = json!({
            "incomeStatementHistory": {
                "incomeStatementHistory": [
                    { "endDate": { "raw": 1664496000 } },
                    { "netIncome": { "raw": 1.0 } },
                    { "endDate": { "raw": 1696032000 }, "netIncome": { "raw": -5.0 } }
                ]
            }
        });

        assert_eq!(parse_annual_net_income(&result), vec![-5.0]);
    }

    #[test]
    fn missing_module_is_empty() {
        assert!(parse_annual_net_income(&json!({})).is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// YahooFinanceProvider
// ═══════════════════════════════════════════════════════════════════

mod yahoo_provider {
    use super::*;

    #[test]
    fn name() {
        let provider = YahooFinanceProvider::new().unwrap();
        assert_eq!(provider.name(), "Yahoo Finance");
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<YahooFinanceProvider>();
    }

    #[test]
    fn usable_as_trait_object() {
        let provider: std::sync::Arc<dyn MarketDataProvider> =
            std::sync::Arc::new(YahooFinanceProvider::new().unwrap());
        assert_eq!(provider.name(), "Yahoo Finance");
    }
}

// ═══════════════════════════════════════════════════════════════════
// MarketDataProvider defaults
// ═══════════════════════════════════════════════════════════════════

mod trait_defaults {
    use super::*;

    struct NamedQuote;

    #[async_trait]
    impl MarketDataProvider for NamedQuote {
        fn name(&self) -> &str {
            "NamedQuote"
        }

        async fn get_info(&self, _symbol: &str) -> Result<InfoSnapshot, CoreError> {
            Ok(InfoSnapshot::new())
        }

        async fn get_fast_info(&self, symbol: &str) -> Result<FastInfo, CoreError> {
            if symbol == "GONE" {
                return Err(CoreError::Network("offline".into()));
            }
            Ok(FastInfo {
                last_price: Some(1.0),
                short_name: Some("Named Co".into()),
            })
        }

        async fn get_price_history(
            &self,
            _symbol: &str,
            _period: HistoryPeriod,
            _interval: Interval,
        ) -> Result<Vec<PricePoint>, CoreError> {
            Ok(Vec::new())
        }

        async fn get_dividends(&self, _symbol: &str) -> Result<Vec<DividendPayment>, CoreError> {
            Ok(Vec::new())
        }

        async fn get_annual_net_income(&self, _symbol: &str) -> Result<Vec<f64>, CoreError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn short_name_comes_from_fast_quote() {
        let name = NamedQuote.get_short_name("NC").await.unwrap();
        assert_eq!(name.as_deref(), Some("Named Co"));
    }

    #[tokio::test]
    async fn short_name_error_propagates() {
        assert!(NamedQuote.get_short_name("GONE").await.is_err());
    }
}
