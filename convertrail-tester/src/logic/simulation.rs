use std::time::{Duration, Instant};

use convertrail_game::numbers::i64_to_f64;
use convertrail_game::{GameError, GameSession, GameState, Rules};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::Serialize;

use super::policy::{PlayerAction, Strategy};

/// Hard cap on actions per game; a correct policy finishes far below it.
const MAX_STEPS: usize = 500;
const RATE_TOLERANCE: f64 = 1e-9;

/// End-of-game numbers for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameMetrics {
    pub final_day: u32,
    pub final_budget: i64,
    pub final_conversion_rate: f64,
    pub total_revenue: i64,
    pub tests_run: usize,
    pub changes_implemented: usize,
    pub significant_tests: usize,
    pub rejected_actions: usize,
}

impl GameMetrics {
    fn from_state(state: &GameState, changes_implemented: usize, rejected_actions: usize) -> Self {
        Self {
            final_day: state.day,
            final_budget: state.budget,
            final_conversion_rate: state.conversion_rate,
            total_revenue: state.total_revenue,
            tests_run: state.tests.len(),
            changes_implemented,
            significant_tests: state
                .tests
                .iter()
                .filter(|r| r.p_value < convertrail_game::constants::SIGNIFICANCE_LEVEL)
                .count(),
            rejected_actions,
        }
    }
}

/// Outcome of one automated game.
#[derive(Debug, Clone, Serialize)]
pub struct GameRun {
    pub strategy: Strategy,
    pub seed: u64,
    pub steps: usize,
    pub metrics: GameMetrics,
    pub failures: Vec<String>,
    pub passed: bool,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }
}

/// Check what must hold between two consecutive states.
#[must_use]
pub fn check_step(
    before: &GameState,
    after: &GameState,
    action: &PlayerAction,
    rules: &Rules,
) -> Vec<String> {
    let config = rules.config();
    let mut failures = Vec::new();
    if after.day > config.total_days {
        failures.push(format!("day {} exceeds {}", after.day, config.total_days));
    }
    if after.day < before.day {
        failures.push(format!("day went backwards: {} -> {}", before.day, after.day));
    }
    if after.budget < 0 {
        failures.push(format!("budget negative: {}", after.budget));
    }
    if after.total_revenue < before.total_revenue {
        failures.push(format!(
            "revenue decreased: {} -> {}",
            before.total_revenue, after.total_revenue
        ));
    }
    if after.tests.len() < before.tests.len()
        || after.tests[..before.tests.len()] != before.tests[..]
    {
        failures.push("test history was rewritten".to_string());
    }

    match action {
        PlayerAction::RunTest(request) => {
            let expected_budget = before.budget - config.test_cost(request.days);
            if after.budget != expected_budget {
                failures.push(format!(
                    "test cost mismatch: budget {} expected {expected_budget}",
                    after.budget
                ));
            }
            if after.day != before.day + request.days {
                failures.push(format!(
                    "day advanced to {} after {}-day test",
                    after.day, request.days
                ));
            }
            if let Some(record) = after.tests.last() {
                if !(0.0..=1.0).contains(&record.p_value) {
                    failures.push(format!("p-value {} outside [0, 1]", record.p_value));
                }
                if record.control_conversions > record.control_visitors
                    || record.variant_conversions > record.variant_visitors
                {
                    failures.push("more conversions than visitors".to_string());
                }
            }
            if (after.conversion_rate - before.conversion_rate).abs() > RATE_TOLERANCE {
                failures.push("running a test changed the conversion rate".to_string());
            }
        }
        PlayerAction::Implement(test_id) => {
            if after.budget != before.budget - config.implementation_cost {
                failures.push(format!(
                    "implementation cost mismatch: {} -> {}",
                    before.budget, after.budget
                ));
            }
            let expected_rate = before
                .tests
                .get(*test_id)
                .and_then(|r| rules.catalog().delta(&r.element, &r.variant).ok())
                .map(|delta| before.conversion_rate + delta);
            match expected_rate {
                Some(rate) if (after.conversion_rate - rate).abs() <= RATE_TOLERANCE => {}
                Some(rate) => failures.push(format!(
                    "conversion rate {} expected {rate}",
                    after.conversion_rate
                )),
                None => failures.push(format!("implemented unknown test {test_id}")),
            }
            if after.day != before.day || after.total_revenue != before.total_revenue {
                failures.push("implementation changed day or revenue".to_string());
            }
        }
        PlayerAction::Stop => {}
    }
    failures
}

/// Play one full game with `strategy`, checking invariants after every step.
#[must_use]
pub fn play_game(rules: &Rules, strategy: Strategy, seed: u64, verbose: bool) -> GameRun {
    let started = Instant::now();
    let mut session = GameSession::new();
    session.start_game(rules);
    let mut policy = strategy.create_policy(seed);
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut failures = Vec::new();
    let mut steps = 0;
    let mut changes = 0;
    let mut rejected = 0;

    while let Some(before) = session.state().cloned() {
        if steps >= MAX_STEPS {
            failures.push(format!("game did not finish within {MAX_STEPS} steps"));
            break;
        }
        let action = policy.next_action(&before, rules);
        let result = match &action {
            PlayerAction::Stop => break,
            PlayerAction::RunTest(request) => {
                session.run_test(rules, request, &mut rng).map(|_| ())
            }
            PlayerAction::Implement(test_id) => session
                .implement_change(rules, *test_id)
                .map(|_| changes += 1),
        };
        steps += 1;
        match result {
            Ok(()) => {}
            Err(GameError::InsufficientResources { shortfall }) => {
                // A rejection is legal play but means the policy misjudged.
                log::debug!("{} rejected {action:?}: {shortfall}", policy.name());
                rejected += 1;
                break;
            }
            Err(err) => {
                failures.push(format!("{action:?} failed: {err}"));
                break;
            }
        }
        let Some(after) = session.state() else {
            failures.push("session lost its game".to_string());
            break;
        };
        let step_failures = check_step(&before, after, &action, rules);
        if verbose {
            log::info!(
                "[{strategy} seed {seed}] step {steps}: {action:?} -> day {} budget {} rate {:.4}",
                after.day,
                after.budget,
                after.conversion_rate
            );
        }
        failures.extend(
            step_failures
                .into_iter()
                .map(|failure| format!("step {steps}: {failure}")),
        );
    }

    let state = session.into_state().unwrap_or_default();
    let metrics = GameMetrics::from_state(&state, changes, rejected);
    GameRun {
        strategy,
        seed,
        steps,
        metrics,
        passed: failures.is_empty(),
        failures,
        duration: started.elapsed(),
    }
}

/// Mean outcome of one strategy across seeds.
#[derive(Debug, Clone, Serialize)]
pub struct StrategySummary {
    pub strategy: Strategy,
    pub games: usize,
    pub passed: usize,
    pub mean_revenue: f64,
    pub mean_conversion_rate: f64,
    pub mean_tests: f64,
    pub mean_changes: f64,
}

#[allow(clippy::cast_precision_loss)]
fn usize_to_f64(value: usize) -> f64 {
    value as f64
}

#[must_use]
pub fn summarize(runs: &[GameRun]) -> Vec<StrategySummary> {
    let mut strategies: Vec<Strategy> = runs.iter().map(|run| run.strategy).collect();
    strategies.sort();
    strategies.dedup();
    strategies
        .into_iter()
        .map(|strategy| {
            let group: Vec<&GameRun> = runs.iter().filter(|r| r.strategy == strategy).collect();
            let mean = |f: fn(&GameRun) -> f64| {
                #[allow(clippy::cast_precision_loss)]
                let n = group.len().max(1) as f64;
                group.iter().map(|r| f(r)).sum::<f64>() / n
            };
            StrategySummary {
                strategy,
                games: group.len(),
                passed: group.iter().filter(|r| r.passed).count(),
                mean_revenue: mean(|r| i64_to_f64(r.metrics.total_revenue)),
                mean_conversion_rate: mean(|r| r.metrics.final_conversion_rate),
                mean_tests: mean(|r| usize_to_f64(r.metrics.tests_run)),
                mean_changes: mean(|r| usize_to_f64(r.metrics.changes_implemented)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_strategy_plays_a_clean_game() {
        let rules = Rules::standard();
        for strategy in Strategy::ALL {
            for seed in [1, 42, 1337] {
                let run = play_game(&rules, strategy, seed, false);
                assert!(run.passed, "{strategy} seed {seed}: {:?}", run.failures);
                assert!(run.metrics.final_budget >= 0);
                assert!(run.metrics.final_day <= 30);
            }
        }
    }

    #[test]
    fn idle_strategy_keeps_starting_numbers() {
        let rules = Rules::standard();
        let run = play_game(&rules, Strategy::Idle, 7, false);
        assert_eq!(run.steps, 0);
        assert_eq!(run.metrics.final_budget, 1_000);
        assert_eq!(run.metrics.total_revenue, 0);
        assert_eq!(run.metrics.tests_run, 0);
    }

    #[test]
    fn runs_are_reproducible_per_seed() {
        let rules = Rules::standard();
        let a = play_game(&rules, Strategy::Random, 99, false);
        let b = play_game(&rules, Strategy::Random, 99, false);
        assert_eq!(a.metrics, b.metrics);
        assert_eq!(a.steps, b.steps);
    }

    #[test]
    fn check_step_flags_broken_transitions() {
        let rules = Rules::standard();
        let before = GameState::new(rules.config());
        let mut after = before.clone();
        after.budget = -100;
        after.day = 31;
        let failures = check_step(&before, &after, &PlayerAction::Stop, &rules);
        assert_eq!(failures.len(), 2, "{failures:?}");

        let mut after = before.clone();
        after.total_revenue = -1;
        let failures = check_step(&before, &after, &PlayerAction::Implement(0), &rules);
        assert!(failures.iter().any(|f| f.contains("revenue decreased")));
        assert!(failures.iter().any(|f| f.contains("unknown test")));
    }

    #[test]
    fn summaries_group_by_strategy() {
        let rules = Rules::standard();
        let runs: Vec<GameRun> = [Strategy::Idle, Strategy::Cautious, Strategy::Idle]
            .into_iter()
            .map(|strategy| play_game(&rules, strategy, 3, false))
            .collect();
        let summary = summarize(&runs);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].strategy, Strategy::Cautious);
        assert_eq!(summary[1].games, 2);
        assert!((summary[1].mean_revenue - 0.0).abs() < f64::EPSILON);
    }
}
