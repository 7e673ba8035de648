pub mod analytics;
pub mod category;
pub mod history;
pub mod holding;
pub mod portfolio;
pub mod settings;
pub mod snapshot;
