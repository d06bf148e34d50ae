//! Typed economy configuration for a run.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    BASE_CONVERSION_RATE, BUDGET, DAILY_TRAFFIC, IMPLEMENTATION_COST, REVENUE_PER_CONVERSION,
    TEST_COST_PER_DAY, TOTAL_DAYS,
};

/// Economy knobs shared by every session on a server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "GameConfig::default_base_conversion_rate")]
    pub base_conversion_rate: f64,
    #[serde(default = "GameConfig::default_daily_traffic")]
    pub daily_traffic: u64,
    #[serde(default = "GameConfig::default_test_cost_per_day")]
    pub test_cost_per_day: i64,
    #[serde(default = "GameConfig::default_implementation_cost")]
    pub implementation_cost: i64,
    #[serde(default = "GameConfig::default_revenue_per_conversion")]
    pub revenue_per_conversion: i64,
    #[serde(default = "GameConfig::default_total_days")]
    pub total_days: u32,
    #[serde(default = "GameConfig::default_budget")]
    pub budget: i64,
}

impl GameConfig {
    #[must_use]
    pub const fn default_base_conversion_rate() -> f64 {
        BASE_CONVERSION_RATE
    }

    #[must_use]
    pub const fn default_daily_traffic() -> u64 {
        DAILY_TRAFFIC
    }

    #[must_use]
    pub const fn default_test_cost_per_day() -> i64 {
        TEST_COST_PER_DAY
    }

    #[must_use]
    pub const fn default_implementation_cost() -> i64 {
        IMPLEMENTATION_COST
    }

    #[must_use]
    pub const fn default_revenue_per_conversion() -> i64 {
        REVENUE_PER_CONVERSION
    }

    #[must_use]
    pub const fn default_total_days() -> u32 {
        TOTAL_DAYS
    }

    #[must_use]
    pub const fn default_budget() -> i64 {
        BUDGET
    }

    /// Visitors routed to each arm of a test per simulated day.
    #[must_use]
    pub const fn visitors_per_arm_per_day(&self) -> u64 {
        self.daily_traffic / 2
    }

    /// Cost of running a test for `days` days, saturating on overflow.
    #[must_use]
    pub fn test_cost(&self, days: u32) -> i64 {
        self.test_cost_per_day.saturating_mul(i64::from(days))
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_conversion_rate.is_finite()
            || !(0.0..=1.0).contains(&self.base_conversion_rate)
        {
            return Err(ConfigError::RangeViolation {
                field: "base_conversion_rate",
                min: 0.0,
                max: 1.0,
                value: self.base_conversion_rate,
            });
        }
        if self.daily_traffic < 2 {
            return Err(ConfigError::MinViolation {
                field: "daily_traffic",
                min: 2,
                value: i64::try_from(self.daily_traffic).unwrap_or(i64::MAX),
            });
        }
        if self.total_days == 0 {
            return Err(ConfigError::MinViolation {
                field: "total_days",
                min: 1,
                value: 0,
            });
        }
        for (field, value) in [
            ("test_cost_per_day", self.test_cost_per_day),
            ("implementation_cost", self.implementation_cost),
            ("revenue_per_conversion", self.revenue_per_conversion),
            ("budget", self.budget),
        ] {
            if value < 0 {
                return Err(ConfigError::MinViolation {
                    field,
                    min: 0,
                    value,
                });
            }
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            base_conversion_rate: Self::default_base_conversion_rate(),
            daily_traffic: Self::default_daily_traffic(),
            test_cost_per_day: Self::default_test_cost_per_day(),
            implementation_cost: Self::default_implementation_cost(),
            revenue_per_conversion: Self::default_revenue_per_conversion(),
            total_days: Self::default_total_days(),
            budget: Self::default_budget(),
        }
    }
}

/// Errors raised when economy configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: i64,
        value: i64,
    },
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.4})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
}
