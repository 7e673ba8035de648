pub mod aggregator;
pub mod analytics_service;
pub mod fallback;
pub mod fundamentals_resolver;
pub mod grouping;
pub mod history_service;
pub mod progress;
pub mod quote_resolver;
