use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::CoreError;

/// Tunables of the aggregation engine.
///
/// Every field has a default, so a settings file only needs the keys it
/// wants to override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Pause between two tickers of an aggregation pass, to stay under upstream rate limits.
    pub inter_ticker_delay_ms: u64,

    /// Years of net income growth used by the PEG ratio fallback.
    pub peg_lookback_years: u32,

    /// Years of B3 history to load (each year is one archive).
    pub b3_years_back: u32,

    /// Directory for the B3 yearly archive cache.
    pub cache_dir: PathBuf,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            inter_ticker_delay_ms: 400,
            peg_lookback_years: 3,
            b3_years_back: 2,
            cache_dir: std::env::temp_dir().join("stock_viewer_cache"),
        }
    }
}

impl EngineSettings {
    pub fn inter_ticker_delay(&self) -> Duration {
        Duration::from_millis(self.inter_ticker_delay_ms)
    }

    /// Parse and validate settings from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let settings: EngineSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file, falling back to defaults when the
    /// file is missing, unreadable or invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let loaded = std::fs::read_to_string(path)
            .map_err(CoreError::from)
            .and_then(|json| Self::from_json_str(&json));
        match loaded {
            Ok(settings) => settings,
            Err(e) => {
                warn!(
                    "Using default engine settings, could not load {}: {e}",
                    path.display()
                );
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.peg_lookback_years == 0 {
            return Err(CoreError::InvalidSettings(
                "peg_lookback_years must be at least 1".into(),
            ));
        }
        if self.b3_years_back == 0 {
            return Err(CoreError::InvalidSettings(
                "b3_years_back must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
