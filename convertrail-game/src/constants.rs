//! Centralized balance constants for the Convertrail simulation.
//!
//! These are the defaults behind [`crate::GameConfig::default`]. Keeping them
//! together means the economy of a run can only drift through a reviewed code
//! change or an explicit config override, never through a stray literal.

// Economy ------------------------------------------------------------------
pub const BASE_CONVERSION_RATE: f64 = 0.05;
pub const DAILY_TRAFFIC: u64 = 1_000;
pub const TEST_COST_PER_DAY: i64 = 100;
pub const IMPLEMENTATION_COST: i64 = 500;
pub const REVENUE_PER_CONVERSION: i64 = 10;
pub const TOTAL_DAYS: u32 = 30;
pub const BUDGET: i64 = 1_000;

// Statistics ---------------------------------------------------------------
/// Threshold below which a test result is reported as significant.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;
/// Largest continuity adjustment applied to a single cell (Yates).
pub(crate) const YATES_CORRECTION: f64 = 0.5;

// Player-facing messages ---------------------------------------------------
pub const MSG_INSUFFICIENT_BUDGET_OR_TIME: &str = "Insufficient budget or time.";
pub const MSG_INSUFFICIENT_BUDGET_IMPLEMENT: &str = "Insufficient budget to implement change.";

// Chart labels -------------------------------------------------------------
pub(crate) const CHART_CONTROL_LABEL: &str = "Control";
pub(crate) const CHART_VARIANT_LABEL: &str = "Variant";
pub(crate) const CHART_Y_LABEL: &str = "Conversion Rate (%)";
