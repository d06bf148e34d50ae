//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Convert u64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn u64_to_f64(value: u64) -> f64 {
    cast::<u64, f64>(value).unwrap_or(0.0)
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// Convert u64 to i64, saturating at `i64::MAX`.
#[must_use]
pub fn u64_to_i64_saturating(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// `part / whole * 100`, returning 0.0 when `whole` is zero.
#[must_use]
pub fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    u64_to_f64(part) / u64_to_f64(whole) * 100.0
}

/// Clamp a probability into `[0, 1]`, returning 0.0 for non-finite values.
#[must_use]
pub fn clamp_probability(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_handles_zero_denominator() {
        assert!((percent(125, 2_500) - 5.0).abs() < 1e-12);
        assert!((percent(3, 0) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn probability_clamps_and_handles_nan() {
        assert!((clamp_probability(-0.02) - 0.0).abs() < f64::EPSILON);
        assert!((clamp_probability(1.4) - 1.0).abs() < f64::EPSILON);
        assert!((clamp_probability(f64::NAN) - 0.0).abs() < f64::EPSILON);
        assert!((clamp_probability(0.06) - 0.06).abs() < f64::EPSILON);
    }

    #[test]
    fn saturating_conversions() {
        assert_eq!(u64_to_i64_saturating(u64::MAX), i64::MAX);
        assert_eq!(u64_to_i64_saturating(42), 42);
        assert!((i64_to_f64(-7) + 7.0).abs() < f64::EPSILON);
    }
}
