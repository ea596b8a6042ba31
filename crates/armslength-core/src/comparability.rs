use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::adjustments::accounting::reconcile_accounting;
use crate::adjustments::capacity::{calculate_capacity_adjustment, CapacityInput, CapacityParty};
use crate::adjustments::geographic::{calculate_geographic_adjustment, GeographicInput};
use crate::adjustments::risk::calculate_risk_adjustment;
use crate::adjustments::working_capital::{
    calculate_working_capital_adjustment, WorkingCapitalInput, WorkingCapitalParty,
};
use crate::config::BenchmarkConfig;
use crate::materiality::MaterialityGate;
use crate::statistics::{arm_length_band, compute_range, round2, ArmLengthBand, StatisticalRange};
use crate::types::{
    checked_ratio, out_of_range, AdjustmentType, ComparableEntity, Percent, PliType, Rate,
    TestedPartyData,
};
use crate::BenchmarkResult;

// ---------------------------------------------------------------------------
// Output Types
// ---------------------------------------------------------------------------

/// One computed adjustment, whether or not it passed the materiality gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentResult {
    pub adjustment_type: AdjustmentType,
    /// Signed adjustment in percentage points of margin
    pub amount: Percent,
    pub is_material: bool,
    pub is_reasonable: bool,
    pub materiality_threshold: Percent,
    pub max_allowed: Percent,
    /// Included in the comparable's adjusted margin
    pub applied: bool,
    pub methodology: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustedComparable {
    pub entity: ComparableEntity,
    pub original_margin: Percent,
    pub adjustments: Vec<AdjustmentResult>,
    /// Sum of the adjustments that passed the gate
    pub total_adjustment: Percent,
    pub adjusted_margin: Percent,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparabilityAnalysisResult {
    pub pli_type: PliType,
    pub tested_party: TestedPartyData,
    pub tested_party_margin: Percent,
    pub comparables: Vec<ComparableEntity>,
    pub adjusted_comparables: Vec<AdjustedComparable>,
    pub unadjusted_range: StatisticalRange,
    pub adjusted_range: StatisticalRange,
    /// Index-selected quartile band over the adjusted margins
    pub arm_length_range: ArmLengthBand,
    /// Adjusted median less unadjusted median
    pub median_shift: Percent,
    pub adjustments_applied: Vec<AdjustmentType>,
    pub documentation_requirements: Vec<String>,
}

// ---------------------------------------------------------------------------
// Per-adjustment dispatch
// ---------------------------------------------------------------------------

/// Run one calculator and return (fraction, methodology).
fn compute_adjustment(
    adjustment: AdjustmentType,
    tested: &ComparableEntity,
    comparable: &ComparableEntity,
    config: &BenchmarkConfig,
) -> BenchmarkResult<(Rate, String)> {
    match adjustment {
        AdjustmentType::WorkingCapital => {
            let out = calculate_working_capital_adjustment(&WorkingCapitalInput {
                tested_party: WorkingCapitalParty::from_profile(&tested.financials)?,
                comparable: WorkingCapitalParty::from_profile(&comparable.financials)?,
                interest_rate: config.interest_rate,
            })?;
            Ok((out.net_adjustment, out.methodology))
        }
        AdjustmentType::Risk => {
            let out = calculate_risk_adjustment(&tested.operations, &comparable.operations);
            Ok((out.net_adjustment, out.methodology))
        }
        AdjustmentType::CapacityUtilization => {
            let party = |entity: &ComparableEntity| CapacityParty {
                actual_utilization: entity.operations.capacity_utilization,
                operating_cost: entity.financials.operating_expenses,
                industry: entity.industry.clone(),
            };
            let out = calculate_capacity_adjustment(&CapacityInput {
                tested_party: party(tested),
                comparable: party(comparable),
            })?;
            Ok((out.net_adjustment, out.methodology))
        }
        AdjustmentType::Geographic => {
            let out = calculate_geographic_adjustment(&GeographicInput {
                tested_party_region: tested.region.clone(),
                comparable_region: comparable.region.clone(),
                weights: config.geographic_weights,
            })?;
            Ok((out.net_adjustment, out.methodology))
        }
        AdjustmentType::AccountingStandards => accounting_adjustment(tested, comparable),
    }
}

fn accounting_adjustment(
    tested: &ComparableEntity,
    comparable: &ComparableEntity,
) -> BenchmarkResult<(Rate, String)> {
    if comparable.accounting_items.is_empty() {
        let methodology = if tested.accounting_standard == comparable.accounting_standard {
            format!(
                "Accounting standards: both parties report under {:?}; no reconciliation needed.",
                comparable.accounting_standard
            )
        } else {
            format!(
                "Accounting standards differ ({:?} vs {:?}) but no reconciling items were \
                 supplied; no adjustment made.",
                tested.accounting_standard, comparable.accounting_standard
            )
        };
        return Ok((Decimal::ZERO, methodology));
    }

    let reconciliation = reconcile_accounting(&comparable.accounting_items)?;
    let opex = comparable.financials.operating_expenses;
    if opex.is_zero() {
        return Ok((
            Decimal::ZERO,
            format!(
                "{} Comparable has zero operating expenses; adjustment cannot be expressed \
                 as a margin and is taken as zero.",
                reconciliation.methodology
            ),
        ));
    }
    let fraction = checked_ratio(
        reconciliation.net_adjustment,
        opex,
        Decimal::ONE,
        "accounting_items",
    )?;
    let percent = fraction
        .checked_mul(dec!(100))
        .ok_or_else(|| out_of_range("accounting_items"))?;
    Ok((
        fraction,
        format!(
            "{} Expressed against operating expenses of {}: {}%.",
            reconciliation.methodology,
            round2(opex),
            round2(percent),
        ),
    ))
}

/// Requested types in request order, each once.
fn unique_types(types: &[AdjustmentType]) -> Vec<AdjustmentType> {
    let mut seen = Vec::with_capacity(types.len());
    for t in types {
        if !seen.contains(t) {
            seen.push(*t);
        }
    }
    seen
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Apply the selected adjustments to one comparable.
///
/// Every computed adjustment is recorded; only those passing the materiality
/// gate are summed into the adjusted margin.
pub fn apply_all_adjustments(
    tested_party: &TestedPartyData,
    comparable: &ComparableEntity,
    adjustment_types: &[AdjustmentType],
    config: &BenchmarkConfig,
) -> BenchmarkResult<AdjustedComparable> {
    tested_party.validate()?;
    comparable.validate("comparable")?;

    let gate = MaterialityGate::new(config.pli_type);
    let original_margin = comparable.operating_margin()?;

    let mut adjustments = Vec::new();
    let mut total_adjustment = Decimal::ZERO;

    for adjustment_type in unique_types(adjustment_types) {
        let (fraction, methodology) =
            compute_adjustment(adjustment_type, &tested_party.entity, comparable, config)?;
        let amount = fraction
            .checked_mul(dec!(100))
            .ok_or_else(|| out_of_range(format!("{}.{adjustment_type:?}", comparable.name)))?;
        let decision = gate.assess(adjustment_type, amount);

        if decision.applies() {
            total_adjustment += amount;
        }

        adjustments.push(AdjustmentResult {
            adjustment_type,
            amount,
            is_material: decision.is_material,
            is_reasonable: decision.is_reasonable,
            materiality_threshold: decision.thresholds.materiality,
            max_allowed: decision.thresholds.max_allowed,
            applied: decision.applies(),
            methodology,
        });
    }

    let adjusted_margin = original_margin + total_adjustment;
    let applied = adjustments.iter().filter(|a| a.applied).count();

    let summary = if adjustments.is_empty() {
        format!(
            "{}: no adjustments requested; margin {}% used as reported.",
            comparable.name,
            round2(original_margin)
        )
    } else {
        format!(
            "{}: original margin {}%, {} of {} adjustments applied totalling {}%, adjusted margin {}%.",
            comparable.name,
            round2(original_margin),
            applied,
            adjustments.len(),
            round2(total_adjustment),
            round2(adjusted_margin),
        )
    };

    tracing::debug!(
        comparable = %comparable.name,
        original = %original_margin,
        adjusted = %adjusted_margin,
        applied,
        computed = adjustments.len(),
        "adjusted comparable"
    );

    Ok(AdjustedComparable {
        entity: comparable.clone(),
        original_margin,
        adjustments,
        total_adjustment,
        adjusted_margin,
        summary,
    })
}

fn documentation_requirements(pli: PliType, types: &[AdjustmentType]) -> Vec<String> {
    let mut docs: Vec<String> = vec![
        "Benchmarking study: database search strategy and accept/reject matrix".into(),
        format!("PLI selection rationale ({pli})"),
        "Financial statements of tested party and each comparable for the fiscal years used"
            .into(),
    ];
    for t in types {
        for doc in t.documentation_requirements() {
            if !docs.iter().any(|d| d == doc) {
                docs.push((*doc).to_string());
            }
        }
    }
    docs
}

/// Adjust every comparable and build the unadjusted and adjusted ranges.
///
/// Comparables keep their input order in the output. The core accepts any
/// number of comparables; the minimum set size is the caller's rule.
pub fn perform_comparability_analysis(
    tested_party: &TestedPartyData,
    comparables: &[ComparableEntity],
    adjustment_types: &[AdjustmentType],
    config: &BenchmarkConfig,
) -> BenchmarkResult<ComparabilityAnalysisResult> {
    config.validate()?;
    tested_party.validate()?;
    for (i, c) in comparables.iter().enumerate() {
        c.validate(&format!("comparables[{i}]"))?;
    }

    let adjusted_comparables = comparables
        .iter()
        .map(|c| apply_all_adjustments(tested_party, c, adjustment_types, config))
        .collect::<BenchmarkResult<Vec<_>>>()?;

    let unadjusted: Vec<Percent> = comparables
        .iter()
        .map(|c| c.operating_margin())
        .collect::<BenchmarkResult<Vec<_>>>()?;
    let adjusted: Vec<Percent> = adjusted_comparables
        .iter()
        .map(|a| a.adjusted_margin)
        .collect();

    let unadjusted_range = compute_range(&unadjusted);
    let adjusted_range = compute_range(&adjusted);
    let arm_length_range = arm_length_band(&adjusted);
    let median_shift = round2(adjusted_range.median - unadjusted_range.median);

    let adjustments_applied = unique_types(adjustment_types);
    let documentation_requirements =
        documentation_requirements(config.pli_type, &adjustments_applied);

    tracing::info!(
        comparables = comparables.len(),
        adjustments = adjustments_applied.len(),
        unadjusted_median = %unadjusted_range.median,
        adjusted_median = %adjusted_range.median,
        "comparability analysis complete"
    );

    Ok(ComparabilityAnalysisResult {
        pli_type: config.pli_type,
        tested_party: tested_party.clone(),
        tested_party_margin: tested_party.entity.operating_margin()?,
        comparables: comparables.to_vec(),
        adjusted_comparables,
        unadjusted_range,
        adjusted_range,
        arm_length_range,
        median_shift,
        adjustments_applied,
        documentation_requirements,
    })
}
