use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{check_magnitude, Percent};
use crate::BenchmarkResult;

/// Descriptive statistics over a set of profit level indicators.
///
/// Every field is rounded to two decimal places, half away from zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticalRange {
    pub count: u32,
    pub min: Percent,
    pub q1: Percent,
    pub median: Percent,
    pub q3: Percent,
    pub max: Percent,
    pub mean: Percent,
    pub interquartile_range: Percent,
}

/// Interquartile band selected by index truncation, used as the headline
/// arm's-length range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArmLengthBand {
    pub lower_quartile: Percent,
    pub median: Percent,
    pub upper_quartile: Percent,
}

/// Round to the hundredths digit, half away from zero, and keep two
/// fractional digits in the serialised form.
pub fn round2(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Percentile by linear interpolation between the closest ranks.
///
/// `sorted` must be in ascending order. The fractional index is
/// `p / 100 * (n - 1)`; indices outside `[0, n - 1]` clamp to the ends.
pub fn percentile(sorted: &[Decimal], p: Decimal) -> Decimal {
    let Some((&first, _)) = sorted.split_first() else {
        return Decimal::ZERO;
    };
    let last_idx = sorted.len() - 1;
    let idx = p / dec!(100) * Decimal::from(last_idx);

    if idx <= Decimal::ZERO {
        return first;
    }
    if idx >= Decimal::from(last_idx) {
        return sorted[last_idx];
    }

    let lower = idx.floor().to_usize().unwrap_or(0).min(last_idx);
    let upper = idx.ceil().to_usize().unwrap_or(last_idx).min(last_idx);
    let weight = idx - Decimal::from(lower);

    sorted[lower] * (Decimal::ONE - weight) + sorted[upper] * weight
}

/// Reject raw values too large to summarise without overflow.
pub fn validate_values(values: &[Decimal]) -> BenchmarkResult<()> {
    for (i, v) in values.iter().enumerate() {
        check_magnitude(&format!("values[{i}]"), *v)?;
    }
    Ok(())
}

/// Min, quartiles, max, mean and interquartile range of `values`.
///
/// Returns an all-zero range for an empty slice.
pub fn compute_range(values: &[Decimal]) -> StatisticalRange {
    if values.is_empty() {
        return StatisticalRange {
            count: 0,
            min: round2(Decimal::ZERO),
            q1: round2(Decimal::ZERO),
            median: round2(Decimal::ZERO),
            q3: round2(Decimal::ZERO),
            max: round2(Decimal::ZERO),
            mean: round2(Decimal::ZERO),
            interquartile_range: round2(Decimal::ZERO),
        };
    }

    let mut sorted = values.to_vec();
    sorted.sort();

    let n = sorted.len();
    let sum: Decimal = sorted.iter().copied().sum();
    let mean = sum / Decimal::from(n);

    let q1 = percentile(&sorted, dec!(25));
    let median = percentile(&sorted, dec!(50));
    let q3 = percentile(&sorted, dec!(75));

    tracing::debug!(count = n, q1 = %q1, median = %median, q3 = %q3, "computed statistical range");

    StatisticalRange {
        count: n as u32,
        min: round2(sorted[0]),
        q1: round2(q1),
        median: round2(median),
        q3: round2(q3),
        max: round2(sorted[n - 1]),
        mean: round2(mean),
        interquartile_range: round2(q3 - q1),
    }
}

/// Arm's-length band using `sorted[floor(n * p)]` for p = 0.25, 0.5, 0.75.
///
/// This deliberately differs from the interpolated quartiles of
/// [`compute_range`]; both conventions are reported.
pub fn arm_length_band(values: &[Decimal]) -> ArmLengthBand {
    if values.is_empty() {
        return ArmLengthBand::default();
    }
    let mut sorted = values.to_vec();
    sorted.sort();
    let n = sorted.len();

    // n * 0.25 truncated; always < n for n >= 1
    let pick = |num: usize, den: usize| sorted[(n * num / den).min(n - 1)];

    ArmLengthBand {
        lower_quartile: pick(1, 4),
        median: pick(1, 2),
        upper_quartile: pick(3, 4),
    }
}
