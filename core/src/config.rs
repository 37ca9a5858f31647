//! Configuration for the core crate
//!
//! Knobs for the statistics reductions and the bounds of the backfill job.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Hard ceiling on backfill workers
pub const MAX_BACKFILL_CONCURRENCY: usize = 10;

/// Longest "of the month" window, about ten years
pub const MAX_MONTH_WINDOW_DAYS: i64 = 3650;

/// Statistics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Length of the "of the month" window in days
    pub month_window_days: i64,

    /// Number of commanders listed per player
    pub top_commanders: usize,

    /// Number of recent matches on the home summary
    pub recent_matches: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        StatsConfig {
            month_window_days: 30,
            top_commanders: 5,
            recent_matches: 5,
        }
    }
}

/// Backfill job configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackfillConfig {
    /// Page size when the request does not give one
    pub default_limit: usize,

    /// Largest accepted page size
    pub max_limit: usize,

    /// Worker count when the request does not give one
    pub default_concurrency: usize,

    /// Largest accepted worker count
    pub max_concurrency: usize,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        BackfillConfig {
            default_limit: 50,
            max_limit: 500,
            default_concurrency: 4,
            max_concurrency: MAX_BACKFILL_CONCURRENCY,
        }
    }
}

impl BackfillConfig {
    /// Resolve a requested page size
    pub fn clamp_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1))
    }

    /// Resolve a requested worker count
    pub fn clamp_concurrency(&self, requested: Option<usize>) -> usize {
        let ceiling = self.max_concurrency.clamp(1, MAX_BACKFILL_CONCURRENCY);
        requested
            .unwrap_or(self.default_concurrency)
            .clamp(1, ceiling)
    }
}

/// Core configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Statistics configuration
    pub stats: StatsConfig,

    /// Backfill configuration
    pub backfill: BackfillConfig,
}

impl LedgerConfig {
    /// Look up a preset by name: `development`, `production` or `testing`
    pub fn preset(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::development()),
            "production" | "prod" => Ok(Self::production()),
            "testing" | "test" => Ok(Self::testing()),
            other => Err(CoreError::Config(format!("unknown profile: {}", other))),
        }
    }

    /// Create a development configuration
    pub fn development() -> Self {
        let mut config = Self::default();
        config.backfill.default_concurrency = 2;
        config
    }

    /// Create a production configuration
    pub fn production() -> Self {
        let mut config = Self::default();
        config.backfill.default_limit = 100;
        config.stats.recent_matches = 10;
        config
    }

    /// Create a testing configuration with small pages
    pub fn testing() -> Self {
        let mut config = Self::default();
        config.backfill.default_limit = 10;
        config.backfill.max_limit = 20;
        config.backfill.default_concurrency = 2;
        config.stats.top_commanders = 3;
        config
    }

    /// Check the configuration for values the services cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.stats.month_window_days <= 0
            || self.stats.month_window_days > MAX_MONTH_WINDOW_DAYS
        {
            return Err(CoreError::Config(format!(
                "stats.month_window_days must be between 1 and {}",
                MAX_MONTH_WINDOW_DAYS
            )));
        }

        if self.backfill.max_concurrency == 0
            || self.backfill.max_concurrency > MAX_BACKFILL_CONCURRENCY
        {
            return Err(CoreError::Config(format!(
                "backfill.max_concurrency must be between 1 and {}",
                MAX_BACKFILL_CONCURRENCY
            )));
        }

        if self.backfill.max_limit == 0 {
            return Err(CoreError::Config(
                "backfill.max_limit must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
