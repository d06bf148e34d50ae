//! The game session controller: the five player operations over one
//! player's [`GameState`].
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, Shortfall};
use crate::numbers::u64_to_i64_saturating;
use crate::rules::Rules;
use crate::sampling::simulate_test;
use crate::state::{GameState, TestRecord};
use crate::stats::{ContingencyTable, chi_square_test};
use crate::view::{GameView, TestResultView};

/// A player's request to run a test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRequest {
    pub element: String,
    pub variant: String,
    pub days: u32,
}

impl TestRequest {
    #[must_use]
    pub fn new(element: impl Into<String>, variant: impl Into<String>, days: u32) -> Self {
        Self {
            element: element.into(),
            variant: variant.into(),
            days,
        }
    }
}

/// A successfully completed test and its stable id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub test_id: usize,
    pub record: TestRecord,
}

/// What an adopted change did to the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeReceipt {
    pub test_id: usize,
    pub element: String,
    pub variant: String,
    pub delta: f64,
    pub conversion_rate: f64,
    pub budget: i64,
}

/// Session controller holding at most one game.
///
/// Every operation either applies all of its effects or returns an error with
/// the state untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GameSession {
    state: Option<GameState>,
}

impl GameSession {
    #[must_use]
    pub const fn new() -> Self {
        Self { state: None }
    }

    #[must_use]
    pub const fn from_state(state: GameState) -> Self {
        Self { state: Some(state) }
    }

    #[must_use]
    pub const fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    #[must_use]
    pub fn into_state(self) -> Option<GameState> {
        self.state
    }

    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.state.is_some()
    }

    /// Start (or restart) a game, discarding any previous state.
    pub fn start_game(&mut self, rules: &Rules) -> &GameState {
        if self.state.is_some() {
            log::info!("restarting game; previous state discarded");
        } else {
            log::info!("starting new game");
        }
        self.state.insert(GameState::new(rules.config()))
    }

    /// Dashboard snapshot of the current game.
    ///
    /// # Errors
    ///
    /// Returns `GameError::SessionNotStarted` if no game exists.
    pub fn view(&self, rules: &Rules) -> Result<GameView, GameError> {
        let state = self.state.as_ref().ok_or(GameError::SessionNotStarted)?;
        Ok(GameView::from_state(state, rules.config()))
    }

    /// Run an A/B test of `request.variant` against the current site.
    ///
    /// Inputs and resources are validated before any traffic is simulated;
    /// the record, budget, day and revenue updates are applied together.
    ///
    /// # Errors
    ///
    /// - `SessionNotStarted` if no game exists.
    /// - `UnknownElement` / `UnknownVariant` for pairs outside the catalog.
    /// - `InvalidDuration` when `days` is zero.
    /// - `InsufficientResources` when the cost exceeds the budget or the test
    ///   would run past the final day.
    pub fn run_test<R: Rng + ?Sized>(
        &mut self,
        rules: &Rules,
        request: &TestRequest,
        rng: &mut R,
    ) -> Result<TestOutcome, GameError> {
        let state = self.state.as_mut().ok_or(GameError::SessionNotStarted)?;
        let config = rules.config();
        let delta = rules.catalog().delta(&request.element, &request.variant)?;
        if request.days == 0 {
            return Err(GameError::InvalidDuration);
        }

        let cost = config.test_cost(request.days);
        if cost > state.budget {
            log::debug!(
                "test {}.{} rejected: cost {cost} > budget {}",
                request.element,
                request.variant,
                state.budget
            );
            return Err(GameError::InsufficientResources {
                shortfall: Shortfall::Budget {
                    cost,
                    budget: state.budget,
                },
            });
        }
        if state.day.saturating_add(request.days) > config.total_days {
            log::debug!(
                "test {}.{} rejected: day {} + {} > {}",
                request.element,
                request.variant,
                state.day,
                request.days,
                config.total_days
            );
            return Err(GameError::InsufficientResources {
                shortfall: Shortfall::Time {
                    day: state.day,
                    days: request.days,
                    total_days: config.total_days,
                },
            });
        }

        let control_rate = state.conversion_rate;
        let variant_rate = control_rate + delta;
        let traffic = simulate_test(
            rng,
            config.visitors_per_arm_per_day(),
            request.days,
            control_rate,
            variant_rate,
        )?;
        let table = ContingencyTable::from_arms(
            traffic.control.conversions,
            traffic.control.visitors,
            traffic.variant.conversions,
            traffic.variant.visitors,
        );
        let significance = chi_square_test(&table);

        let record = TestRecord {
            element: request.element.clone(),
            variant: request.variant.clone(),
            days: request.days,
            day_started: state.day,
            control_conversions: traffic.control.conversions,
            variant_conversions: traffic.variant.conversions,
            control_visitors: traffic.control.visitors,
            variant_visitors: traffic.variant.visitors,
            chi_square: significance.statistic,
            p_value: significance.p_value,
        };
        let revenue = u64_to_i64_saturating(traffic.total_conversions())
            .saturating_mul(config.revenue_per_conversion);

        let test_id = state.tests.len();
        state.tests.push(record.clone());
        state.budget -= cost;
        state.day += request.days;
        state.total_revenue = state.total_revenue.saturating_add(revenue);

        log::debug!(
            "test {test_id} {}.{}: control {}/{} variant {}/{} p={:.4}",
            record.element,
            record.variant,
            record.control_conversions,
            record.control_visitors,
            record.variant_conversions,
            record.variant_visitors,
            record.p_value
        );
        Ok(TestOutcome { test_id, record })
    }

    /// Results page data for test `test_id`.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotStarted` if no game exists, or `NotFound` when
    /// `test_id` is not an index into the test history.
    pub fn test_result(&self, rules: &Rules, test_id: usize) -> Result<TestResultView, GameError> {
        let state = self.state.as_ref().ok_or(GameError::SessionNotStarted)?;
        let record = state.test(test_id).ok_or(GameError::NotFound { test_id })?;
        Ok(TestResultView::from_record(
            test_id,
            record,
            state,
            rules.config(),
        ))
    }

    /// Adopt the variant from test `test_id` site-wide.
    ///
    /// The variant's delta is added to the current conversion rate, so
    /// implementing the same test twice applies it twice.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotStarted`, `NotFound` for an unknown test, or
    /// `InsufficientResources` when the budget cannot cover the change.
    pub fn implement_change(
        &mut self,
        rules: &Rules,
        test_id: usize,
    ) -> Result<ChangeReceipt, GameError> {
        let state = self.state.as_mut().ok_or(GameError::SessionNotStarted)?;
        let config = rules.config();
        let record = state.test(test_id).ok_or(GameError::NotFound { test_id })?;
        let delta = rules.catalog().delta(&record.element, &record.variant)?;
        let (element, variant) = (record.element.clone(), record.variant.clone());

        if state.budget < config.implementation_cost {
            log::debug!(
                "implementing test {test_id} rejected: budget {} < {}",
                state.budget,
                config.implementation_cost
            );
            return Err(GameError::InsufficientResources {
                shortfall: Shortfall::Budget {
                    cost: config.implementation_cost,
                    budget: state.budget,
                },
            });
        }

        if let Some(previous) = state.implemented_changes.get(&element) {
            log::debug!("{element}: replacing adopted variant {previous} with {variant}");
        }
        state.conversion_rate += delta;
        state.budget -= config.implementation_cost;
        state
            .implemented_changes
            .insert(element.clone(), variant.clone());

        log::info!(
            "adopted {element}.{variant} (delta {delta:+.4}); conversion rate now {:.4}",
            state.conversion_rate
        );
        Ok(ChangeReceipt {
            test_id,
            element,
            variant,
            delta,
            conversion_rate: state.conversion_rate,
            budget: state.budget,
        })
    }
}
