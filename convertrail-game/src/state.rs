use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::GameConfig;
use crate::numbers::percent;

/// One finished A/B test. Never modified after it is appended to a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    pub element: String,
    pub variant: String,
    pub days: u32,
    /// Day on which the test started.
    #[serde(default)]
    pub day_started: u32,
    pub control_conversions: u64,
    pub variant_conversions: u64,
    pub control_visitors: u64,
    pub variant_visitors: u64,
    #[serde(default)]
    pub chi_square: f64,
    pub p_value: f64,
}

impl TestRecord {
    #[must_use]
    pub fn control_rate_pct(&self) -> f64 {
        percent(self.control_conversions, self.control_visitors)
    }

    #[must_use]
    pub fn variant_rate_pct(&self) -> f64 {
        percent(self.variant_conversions, self.variant_visitors)
    }

    #[must_use]
    pub const fn total_conversions(&self) -> u64 {
        self.control_conversions + self.variant_conversions
    }
}

/// Per-player game state.
///
/// Serialized as JSON with the field names below; that is the contract any
/// session backend must preserve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub day: u32,
    pub budget: i64,
    pub conversion_rate: f64,
    pub total_revenue: i64,
    #[serde(default)]
    pub implemented_changes: BTreeMap<String, String>,
    #[serde(default)]
    pub tests: Vec<TestRecord>,
}

impl GameState {
    /// Fresh state for a new game under `config`.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            day: 0,
            budget: config.budget,
            conversion_rate: config.base_conversion_rate,
            total_revenue: 0,
            implemented_changes: BTreeMap::new(),
            tests: Vec::new(),
        }
    }

    #[must_use]
    pub const fn days_remaining(&self, total_days: u32) -> u32 {
        total_days.saturating_sub(self.day)
    }

    #[must_use]
    pub fn test(&self, test_id: usize) -> Option<&TestRecord> {
        self.tests.get(test_id)
    }

    /// Whether any test at all can still be afforded and fit in the horizon.
    #[must_use]
    pub fn can_run_test(&self, config: &GameConfig) -> bool {
        self.days_remaining(config.total_days) > 0 && self.budget >= config.test_cost(1)
    }

    #[must_use]
    pub fn can_implement(&self, config: &GameConfig) -> bool {
        self.budget >= config.implementation_cost
    }

    /// A run is over once no further test fits and no change is affordable.
    #[must_use]
    pub fn is_finished(&self, config: &GameConfig) -> bool {
        !self.can_run_test(config) && (self.tests.is_empty() || !self.can_implement(config))
    }

    #[must_use]
    pub fn conversion_rate_pct(&self) -> f64 {
        self.conversion_rate * 100.0
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> TestRecord {
        TestRecord {
            element: "button_color".into(),
            variant: "red".into(),
            days: 5,
            day_started: 0,
            control_conversions: 125,
            variant_conversions: 150,
            control_visitors: 2_500,
            variant_visitors: 2_500,
            chi_square: 2.2,
            p_value: 0.13,
        }
    }

    #[test]
    fn default_state_matches_starting_economy() {
        let state = GameState::default();
        assert_eq!(state.day, 0);
        assert_eq!(state.budget, 1_000);
        assert!((state.conversion_rate - 0.05).abs() < f64::EPSILON);
        assert_eq!(state.total_revenue, 0);
        assert!(state.tests.is_empty());
        assert!(state.implemented_changes.is_empty());
        assert!((state.conversion_rate_pct() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn record_rates_are_percentages() {
        let record = sample_record();
        assert!((record.control_rate_pct() - 5.0).abs() < 1e-12);
        assert!((record.variant_rate_pct() - 6.0).abs() < 1e-12);
        assert_eq!(record.total_conversions(), 275);
    }

    #[test]
    fn finished_when_out_of_time_and_budget() {
        let config = GameConfig::default();
        let mut state = GameState::default();
        assert!(!state.is_finished(&config));

        state.day = 30;
        assert!(!state.can_run_test(&config));
        assert!(state.is_finished(&config), "no tests to implement yet");

        state.tests.push(sample_record());
        assert!(!state.is_finished(&config), "can still adopt a change");

        state.budget = 400;
        assert!(state.is_finished(&config));
    }

    #[test]
    fn json_contract_uses_snake_case_fields() {
        let mut state = GameState::default();
        state.tests.push(sample_record());
        state
            .implemented_changes
            .insert("button_color".into(), "red".into());

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["budget"], 1_000);
        assert_eq!(json["implemented_changes"]["button_color"], "red");
        assert_eq!(json["tests"][0]["control_visitors"], 2_500);

        let restored: GameState = serde_json::from_value(json).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn legacy_records_without_new_fields_still_load() {
        let json = r#"{
            "day": 5, "budget": 500, "conversion_rate": 0.05, "total_revenue": 2750,
            "tests": [{
                "element": "button_color", "variant": "red", "days": 5,
                "control_conversions": 125, "variant_conversions": 150,
                "control_visitors": 2500, "variant_visitors": 2500, "p_value": 0.13
            }]
        }"#;
        let state: GameState = serde_json::from_str(json).unwrap();
        assert_eq!(state.tests[0].day_started, 0);
        assert!(state.implemented_changes.is_empty());
    }
}
