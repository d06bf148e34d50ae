use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use convertrail_game::constants::SIGNIFICANCE_LEVEL;
use convertrail_game::{GameState, Rules, TestRecord, TestRequest};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// What a policy wants to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    RunTest(TestRequest),
    Implement(usize),
    Stop,
}

/// Automated player.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    fn next_action(&mut self, state: &GameState, rules: &Rules) -> PlayerAction;
}

/// Built-in strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Cautious,
    Eager,
    Random,
    Idle,
}

impl Strategy {
    pub const ALL: [Self; 4] = [Self::Cautious, Self::Eager, Self::Random, Self::Idle];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Cautious => "cautious",
            Self::Eager => "eager",
            Self::Random => "random",
            Self::Idle => "idle",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Cautious => "one 5-day test per variant; adopt only significant improvements",
            Self::Eager => "short tests; adopt every variant that looked better",
            Self::Random => "random variants, durations and adoptions",
            Self::Idle => "never tests; baseline for comparison",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy> {
        match self {
            Self::Cautious => Box::new(CautiousPolicy::default()),
            Self::Eager => Box::new(EagerPolicy::default()),
            Self::Random => Box::new(RandomPolicy::new(seed)),
            Self::Idle => Box::new(IdlePolicy),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown strategy: {s}"))
    }
}

const CAUTIOUS_DAYS: u32 = 5;
const EAGER_DAYS: u32 = 2;
const RANDOM_IMPLEMENT_CHANCE: f64 = 0.5;

/// Longest test affordable right now, capped at `wanted`.
fn affordable_days(state: &GameState, rules: &Rules, wanted: u32) -> u32 {
    let config = rules.config();
    let by_time = state.days_remaining(config.total_days);
    let by_budget = if config.test_cost_per_day > 0 {
        u32::try_from((state.budget / config.test_cost_per_day).max(0)).unwrap_or(u32::MAX)
    } else {
        u32::MAX
    };
    wanted.min(by_time).min(by_budget)
}

fn improved(record: &TestRecord) -> bool {
    record.variant_rate_pct() > record.control_rate_pct()
}

fn tested_pairs(state: &GameState) -> BTreeSet<(&str, &str)> {
    state
        .tests
        .iter()
        .map(|r| (r.element.as_str(), r.variant.as_str()))
        .collect()
}

fn first_untested<'a>(state: &GameState, rules: &'a Rules) -> Option<(&'a str, &'a str)> {
    let tested = tested_pairs(state);
    rules.catalog().elements().find_map(|(element, variants)| {
        variants
            .keys()
            .map(String::as_str)
            .find(|variant| !tested.contains(&(element, *variant)))
            .map(|variant| (element, variant))
    })
}

#[derive(Default)]
struct CautiousPolicy {
    reviewed: usize,
}

impl PlayerPolicy for CautiousPolicy {
    fn name(&self) -> &'static str {
        "cautious"
    }

    fn next_action(&mut self, state: &GameState, rules: &Rules) -> PlayerAction {
        while self.reviewed < state.tests.len() {
            let test_id = self.reviewed;
            self.reviewed += 1;
            let record = &state.tests[test_id];
            if record.p_value < SIGNIFICANCE_LEVEL
                && improved(record)
                && !state.implemented_changes.contains_key(&record.element)
                && state.can_implement(rules.config())
            {
                return PlayerAction::Implement(test_id);
            }
        }
        let days = affordable_days(state, rules, CAUTIOUS_DAYS);
        match first_untested(state, rules) {
            Some((element, variant)) if days > 0 => {
                PlayerAction::RunTest(TestRequest::new(element, variant, days))
            }
            _ => PlayerAction::Stop,
        }
    }
}

#[derive(Default)]
struct EagerPolicy {
    reviewed: usize,
    next_pair: usize,
}

impl PlayerPolicy for EagerPolicy {
    fn name(&self) -> &'static str {
        "eager"
    }

    fn next_action(&mut self, state: &GameState, rules: &Rules) -> PlayerAction {
        while self.reviewed < state.tests.len() {
            let test_id = self.reviewed;
            self.reviewed += 1;
            if improved(&state.tests[test_id]) && state.can_implement(rules.config()) {
                return PlayerAction::Implement(test_id);
            }
        }
        let pairs: Vec<(&str, &str)> = rules
            .catalog()
            .elements()
            .flat_map(|(element, variants)| {
                variants.keys().map(move |variant| (element, variant.as_str()))
            })
            .collect();
        let days = affordable_days(state, rules, EAGER_DAYS);
        if pairs.is_empty() || days == 0 {
            return PlayerAction::Stop;
        }
        let (element, variant) = pairs[self.next_pair % pairs.len()];
        self.next_pair += 1;
        PlayerAction::RunTest(TestRequest::new(element, variant, days))
    }
}

struct RandomPolicy {
    rng: ChaCha20Rng,
    reviewed: usize,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            reviewed: 0,
        }
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn next_action(&mut self, state: &GameState, rules: &Rules) -> PlayerAction {
        if self.reviewed < state.tests.len() {
            let test_id = state.tests.len() - 1;
            self.reviewed = state.tests.len();
            if state.can_implement(rules.config()) && self.rng.gen_bool(RANDOM_IMPLEMENT_CHANCE) {
                return PlayerAction::Implement(test_id);
            }
        }
        let max_days = affordable_days(state, rules, u32::MAX);
        let elements: Vec<_> = rules.catalog().elements().collect();
        if max_days == 0 || elements.is_empty() {
            return PlayerAction::Stop;
        }
        let (element, variants) = elements[self.rng.gen_range(0..elements.len())];
        let names: Vec<&String> = variants.keys().collect();
        let variant = names[self.rng.gen_range(0..names.len())];
        let days = self.rng.gen_range(1..=max_days);
        PlayerAction::RunTest(TestRequest::new(element, variant.as_str(), days))
    }
}

struct IdlePolicy;

impl PlayerPolicy for IdlePolicy {
    fn name(&self) -> &'static str {
        "idle"
    }

    fn next_action(&mut self, _state: &GameState, _rules: &Rules) -> PlayerAction {
        PlayerAction::Stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategies_parse_by_key() {
        assert_eq!("cautious".parse::<Strategy>(), Ok(Strategy::Cautious));
        assert_eq!(" EAGER ".parse::<Strategy>(), Ok(Strategy::Eager));
        assert!("reckless".parse::<Strategy>().is_err());
        assert_eq!(Strategy::Random.to_string(), "random");
    }

    #[test]
    fn cautious_starts_with_first_catalog_pair() {
        let rules = Rules::standard();
        let state = GameState::new(rules.config());
        let mut policy = Strategy::Cautious.create_policy(0);
        assert_eq!(
            policy.next_action(&state, &rules),
            PlayerAction::RunTest(TestRequest::new("button_color", "green", 5))
        );
    }

    #[test]
    fn cautious_adopts_significant_improvement_once() {
        let rules = Rules::standard();
        let mut state = GameState::new(rules.config());
        state.budget = 900;
        state.tests.push(TestRecord {
            element: "button_color".into(),
            variant: "red".into(),
            days: 5,
            day_started: 0,
            control_conversions: 125,
            variant_conversions: 180,
            control_visitors: 2_500,
            variant_visitors: 2_500,
            chi_square: 10.0,
            p_value: 0.001,
        });
        let mut policy = Strategy::Cautious.create_policy(0);
        assert_eq!(policy.next_action(&state, &rules), PlayerAction::Implement(0));
        assert!(matches!(
            policy.next_action(&state, &rules),
            PlayerAction::RunTest(_)
        ));
    }

    #[test]
    fn policies_stop_when_broke() {
        let rules = Rules::standard();
        let mut state = GameState::new(rules.config());
        state.budget = 50;
        for strategy in Strategy::ALL {
            let mut policy = strategy.create_policy(1);
            assert_eq!(
                policy.next_action(&state, &rules),
                PlayerAction::Stop,
                "{}",
                policy.name()
            );
        }
    }

    #[test]
    fn affordable_days_respects_all_limits() {
        let rules = Rules::standard();
        let mut state = GameState::new(rules.config());
        assert_eq!(affordable_days(&state, &rules, 5), 5);
        assert_eq!(affordable_days(&state, &rules, u32::MAX), 10);
        state.day = 29;
        assert_eq!(affordable_days(&state, &rules, 5), 1);
    }
}
