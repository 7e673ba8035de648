pub mod traits;

// Data source implementations
pub mod b3_history;
pub mod yahoo_finance;
