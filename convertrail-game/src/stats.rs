//! Significance testing for two-arm conversion experiments.
//!
//! The test is Pearson's chi-square test of independence on a 2×2 contingency
//! table with Yates' continuity correction, matching the behavior of the usual
//! statistics packages for a table with one degree of freedom.
use serde::{Deserialize, Serialize};

use crate::constants::YATES_CORRECTION;
use crate::numbers::u64_to_f64;

/// Observed counts for both arms of a test.
///
/// Rows are `{control, variant}`, columns are `{conversions, non-conversions}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContingencyTable {
    pub control: [u64; 2],
    pub variant: [u64; 2],
}

impl ContingencyTable {
    /// Build a table from conversion and visitor totals.
    ///
    /// Conversions above the visitor count are clamped so the non-conversion
    /// cell never underflows.
    #[must_use]
    pub fn from_arms(
        control_conversions: u64,
        control_visitors: u64,
        variant_conversions: u64,
        variant_visitors: u64,
    ) -> Self {
        let control_conversions = control_conversions.min(control_visitors);
        let variant_conversions = variant_conversions.min(variant_visitors);
        Self {
            control: [
                control_conversions,
                control_visitors - control_conversions,
            ],
            variant: [
                variant_conversions,
                variant_visitors - variant_conversions,
            ],
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.control[0] + self.control[1] + self.variant[0] + self.variant[1]
    }

    fn rows(&self) -> [[f64; 2]; 2] {
        [
            [u64_to_f64(self.control[0]), u64_to_f64(self.control[1])],
            [u64_to_f64(self.variant[0]), u64_to_f64(self.variant[1])],
        ]
    }
}

/// Result of a chi-square test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareOutcome {
    pub statistic: f64,
    pub p_value: f64,
    pub dof: u32,
}

impl ChiSquareOutcome {
    const fn no_evidence() -> Self {
        Self {
            statistic: 0.0,
            p_value: 1.0,
            dof: 1,
        }
    }

    #[must_use]
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Chi-square test of independence with Yates' continuity correction.
///
/// A table with an empty row or column has an expected frequency of zero; the
/// statistic is undefined there, so the outcome reports no evidence
/// (`statistic = 0`, `p_value = 1`) instead of failing.
#[must_use]
pub fn chi_square_test(table: &ContingencyTable) -> ChiSquareOutcome {
    let observed = table.rows();
    let row_totals = [observed[0][0] + observed[0][1], observed[1][0] + observed[1][1]];
    let col_totals = [observed[0][0] + observed[1][0], observed[0][1] + observed[1][1]];
    let total = row_totals[0] + row_totals[1];

    if total <= 0.0
        || row_totals.iter().any(|r| *r <= 0.0)
        || col_totals.iter().any(|c| *c <= 0.0)
    {
        return ChiSquareOutcome::no_evidence();
    }

    let mut statistic = 0.0;
    for (row, row_total) in observed.iter().zip(row_totals) {
        for (cell, col_total) in row.iter().zip(col_totals) {
            let expected = row_total * col_total / total;
            let diff = expected - cell;
            let adjusted = cell + diff.signum() * diff.abs().min(YATES_CORRECTION);
            statistic += (adjusted - expected).powi(2) / expected;
        }
    }

    ChiSquareOutcome {
        statistic,
        p_value: chi_square_sf_1dof(statistic),
        dof: 1,
    }
}

/// Survival function of the chi-square distribution with one degree of freedom.
#[must_use]
pub fn chi_square_sf_1dof(statistic: f64) -> f64 {
    if statistic.is_nan() {
        return 1.0;
    }
    if statistic <= 0.0 {
        return 1.0;
    }
    erfc((statistic / 2.0).sqrt()).clamp(0.0, 1.0)
}

/// Complementary error function.
///
/// Chebyshev rational approximation with fractional error below 1.2e-7 over
/// the whole real line.
#[must_use]
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87
                                    + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let ans = t * poly.exp();
    if x >= 0.0 { ans } else { 2.0 - ans }
}
