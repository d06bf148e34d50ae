//! Synthetic traffic generation for the two arms of a test.
use rand::Rng;
use rand_distr::{Binomial, Distribution};
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::numbers::clamp_probability;

/// Visitors and conversions observed in one arm over the whole test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ArmSample {
    pub visitors: u64,
    pub conversions: u64,
}

/// Both arms of a simulated test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficSample {
    pub control: ArmSample,
    pub variant: ArmSample,
}

impl TrafficSample {
    #[must_use]
    pub const fn total_conversions(&self) -> u64 {
        self.control.conversions + self.variant.conversions
    }
}

/// Simulate `days` days of traffic for a single arm.
///
/// Each day draws `Binomial(visitors_per_day, rate)` conversions. `rate` is
/// clamped into `[0, 1]`, so a variant whose delta pushes the rate negative
/// simply never converts.
///
/// # Errors
///
/// Returns `GameError::Sampling` if the binomial distribution cannot be built.
pub fn simulate_arm<R: Rng + ?Sized>(
    rng: &mut R,
    visitors_per_day: u64,
    days: u32,
    rate: f64,
) -> Result<ArmSample, GameError> {
    let binomial = Binomial::new(visitors_per_day, clamp_probability(rate))
        .map_err(|err| GameError::Sampling(err.to_string()))?;
    let conversions = (0..days)
        .map(|_| binomial.sample(&mut *rng))
        .sum::<u64>();
    Ok(ArmSample {
        visitors: visitors_per_day.saturating_mul(u64::from(days)),
        conversions,
    })
}

/// Simulate a full test with traffic split evenly across the two arms.
///
/// # Errors
///
/// Returns `GameError::Sampling` if either arm cannot be simulated.
pub fn simulate_test<R: Rng + ?Sized>(
    rng: &mut R,
    visitors_per_arm_per_day: u64,
    days: u32,
    control_rate: f64,
    variant_rate: f64,
) -> Result<TrafficSample, GameError> {
    let control = simulate_arm(rng, visitors_per_arm_per_day, days, control_rate)?;
    let variant = simulate_arm(rng, visitors_per_arm_per_day, days, variant_rate)?;
    Ok(TrafficSample { control, variant })
}
