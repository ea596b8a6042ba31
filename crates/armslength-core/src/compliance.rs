use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::BenchmarkError;
use crate::statistics::{round2, StatisticalRange};
use crate::types::{check_magnitude, Percent};
use crate::BenchmarkResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangePosition {
    Below,
    Within,
    Above,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceAssessment {
    pub position: RangePosition,
    pub is_compliant: bool,
    pub tested_margin: Percent,
    pub range_low: Percent,
    pub range_median: Percent,
    pub range_high: Percent,
    /// Upward adjustment to the tested party's margin needed to reach the median
    pub adjustment_required: Percent,
    pub explanation: String,
}

/// Check a caller-supplied range before evaluation: quartiles must be
/// ordered and every value within the engine's percentage bounds.
pub fn validate_evaluation(margin: Percent, range: &StatisticalRange) -> BenchmarkResult<()> {
    if range.q1 > range.median || range.median > range.q3 {
        return Err(BenchmarkError::InvalidInput {
            field: "range".into(),
            reason: format!(
                "Must satisfy q1 <= median <= q3 (got {}, {}, {})",
                range.q1, range.median, range.q3
            ),
        });
    }
    check_magnitude("margin", margin)?;
    check_magnitude("range.q1", range.q1)?;
    check_magnitude("range.median", range.median)?;
    check_magnitude("range.q3", range.q3)
}

/// Classify the tested party's margin against the interquartile range.
///
/// Below Q1 is non-compliant and requires an adjustment to the median. Above
/// Q3 is treated as compliant: a tested party earning more than its
/// comparables is not under-remunerated.
pub fn evaluate_compliance(margin: Percent, range: &StatisticalRange) -> ComplianceAssessment {
    let (position, is_compliant, adjustment_required, explanation) = if margin < range.q1 {
        let required = round2(range.median - margin);
        (
            RangePosition::Below,
            false,
            required,
            format!(
                "Tested party margin of {}% is below the arm's length range ({}% to {}%). \
                 An adjustment of {}% is required to bring it to the median of {}%.",
                round2(margin),
                range.q1,
                range.q3,
                required,
                range.median,
            ),
        )
    } else if margin > range.q3 {
        (
            RangePosition::Above,
            true,
            round2(Decimal::ZERO),
            format!(
                "Tested party margin of {}% is above the arm's length range ({}% to {}%, median {}%). \
                 No adjustment is required.",
                round2(margin),
                range.q1,
                range.q3,
                range.median,
            ),
        )
    } else {
        (
            RangePosition::Within,
            true,
            round2(Decimal::ZERO),
            format!(
                "Tested party margin of {}% is within the arm's length range ({}% to {}%, median {}%). \
                 The transaction is consistent with the arm's length principle.",
                round2(margin),
                range.q1,
                range.q3,
                range.median,
            ),
        )
    };

    if !is_compliant {
        tracing::info!(
            margin = %margin,
            q1 = %range.q1,
            median = %range.median,
            adjustment = %adjustment_required,
            "tested party below arm's length range"
        );
    }

    ComplianceAssessment {
        position,
        is_compliant,
        tested_margin: margin,
        range_low: range.q1,
        range_median: range.median,
        range_high: range.q3,
        adjustment_required,
        explanation,
    }
}
