//! Engine configuration loaded from JSON.
//!
//! Every field is optional; `{}` yields the defaults.
//!
//! ```json
//! {
//!   "rules": { "back_to_back_is_conflict": true, "min_buffer_minutes": 15 },
//!   "scoring": { "low_utilization_percent": 60.0, "high_utilization_percent": 90.0, "idle_gap_minutes": 60 },
//!   "default_granularity_minutes": 30
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::conflict::ClassifierRules;
use crate::error::{Result, ScheduleError};
use crate::score::ScoringThresholds;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Rules for conflict checks before committing a booking.
    pub rules: ClassifierRules,
    pub scoring: ScoringThresholds,
    /// Grid step used when a caller does not specify one.
    pub default_granularity_minutes: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rules: ClassifierRules::default(),
            scoring: ScoringThresholds::default(),
            default_granularity_minutes: 30,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> Result<()> {
        if self.default_granularity_minutes <= 0 {
            return Err(ScheduleError::InvalidRequest(format!(
                "default_granularity_minutes must be positive, got {}",
                self.default_granularity_minutes
            )));
        }
        if self.rules.min_buffer_minutes < 0 {
            return Err(ScheduleError::InvalidRequest(format!(
                "min_buffer_minutes must not be negative, got {}",
                self.rules.min_buffer_minutes
            )));
        }
        if self.scoring.low_utilization_percent > self.scoring.high_utilization_percent {
            return Err(ScheduleError::InvalidRequest(
                "low_utilization_percent exceeds high_utilization_percent".to_string(),
            ));
        }
        Ok(())
    }
}
