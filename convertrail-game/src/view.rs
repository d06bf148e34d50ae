//! Read-only snapshots handed to the presentation layer.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::GameConfig;
use crate::constants::{
    CHART_CONTROL_LABEL, CHART_VARIANT_LABEL, CHART_Y_LABEL, SIGNIFICANCE_LEVEL,
};
use crate::state::{GameState, TestRecord};

/// Dashboard numbers for the current game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameView {
    pub day: u32,
    pub total_days: u32,
    pub days_remaining: u32,
    pub budget: i64,
    pub conversion_rate: f64,
    pub conversion_rate_pct: f64,
    pub total_revenue: i64,
    pub tests_run: usize,
    pub implemented_changes: BTreeMap<String, String>,
    pub can_run_test: bool,
    pub finished: bool,
    pub history: Vec<TestSummary>,
}

impl GameView {
    #[must_use]
    pub fn from_state(state: &GameState, config: &GameConfig) -> Self {
        let history = state
            .tests
            .iter()
            .enumerate()
            .map(|(test_id, record)| TestSummary::from_record(test_id, record))
            .collect();
        Self {
            day: state.day,
            total_days: config.total_days,
            days_remaining: state.days_remaining(config.total_days),
            budget: state.budget,
            conversion_rate: state.conversion_rate,
            conversion_rate_pct: state.conversion_rate_pct(),
            total_revenue: state.total_revenue,
            tests_run: state.tests.len(),
            implemented_changes: state.implemented_changes.clone(),
            can_run_test: state.can_run_test(config),
            finished: state.is_finished(config),
            history,
        }
    }
}

/// One line of the test history table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSummary {
    pub test_id: usize,
    pub element: String,
    pub variant: String,
    pub days: u32,
    pub p_value: f64,
    pub significant: bool,
}

impl TestSummary {
    fn from_record(test_id: usize, record: &TestRecord) -> Self {
        Self {
            test_id,
            element: record.element.clone(),
            variant: record.variant.clone(),
            days: record.days,
            p_value: record.p_value,
            significant: record.p_value < SIGNIFICANCE_LEVEL,
        }
    }
}

/// A single bar of a bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

/// Renderer-agnostic description of a bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub y_label: String,
    pub bars: Vec<Bar>,
}

impl ChartSpec {
    /// Largest bar value, or 0.0 for an empty chart.
    #[must_use]
    pub fn max_value(&self) -> f64 {
        self.bars.iter().map(|bar| bar.value).fold(0.0, f64::max)
    }
}

/// Everything the results page shows for one test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResultView {
    pub test_id: usize,
    pub record: TestRecord,
    pub control_rate_pct: f64,
    pub variant_rate_pct: f64,
    /// Relative change of the variant over control, in percent.
    pub lift_pct: f64,
    pub significant: bool,
    /// Whether this element currently runs the tested variant.
    pub implemented: bool,
    pub can_implement: bool,
    pub chart: ChartSpec,
}

impl TestResultView {
    #[must_use]
    pub fn from_record(
        test_id: usize,
        record: &TestRecord,
        state: &GameState,
        config: &GameConfig,
    ) -> Self {
        let control_rate_pct = record.control_rate_pct();
        let variant_rate_pct = record.variant_rate_pct();
        let lift_pct = if control_rate_pct > 0.0 {
            (variant_rate_pct - control_rate_pct) / control_rate_pct * 100.0
        } else {
            0.0
        };
        let implemented = state
            .implemented_changes
            .get(&record.element)
            .is_some_and(|variant| variant == &record.variant);
        let chart = ChartSpec {
            title: format!("A/B Test Results: {} - {}", record.element, record.variant),
            y_label: CHART_Y_LABEL.to_string(),
            bars: vec![
                Bar {
                    label: CHART_CONTROL_LABEL.to_string(),
                    value: control_rate_pct,
                },
                Bar {
                    label: CHART_VARIANT_LABEL.to_string(),
                    value: variant_rate_pct,
                },
            ],
        };
        Self {
            test_id,
            record: record.clone(),
            control_rate_pct,
            variant_rate_pct,
            lift_pct,
            significant: record.p_value < SIGNIFICANCE_LEVEL,
            implemented,
            can_implement: state.can_implement(config),
            chart,
        }
    }
}
