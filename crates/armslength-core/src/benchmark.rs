use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::comparability::{perform_comparability_analysis, ComparabilityAnalysisResult};
use crate::compliance::{evaluate_compliance, ComplianceAssessment};
use crate::config::BenchmarkConfig;
use crate::error::BenchmarkError;
use crate::statistics::round2;
use crate::types::{
    with_metadata, AdjustmentType, ComparableEntity, ComputationOutput, Percent, TestedPartyData,
};
use crate::BenchmarkResult;

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkRequest {
    pub tested_party: TestedPartyData,
    pub comparables: Vec<ComparableEntity>,
    /// Adjustments to apply; all of them when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjustment_types: Option<Vec<AdjustmentType>>,
    #[serde(default)]
    pub config: BenchmarkConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkOutput {
    /// Tested party's value of the selected PLI
    pub tested_party_pli: Percent,
    pub analysis: ComparabilityAnalysisResult,
    /// Tested party margin against the adjusted range
    pub compliance: ComplianceAssessment,
    /// Same test against the unadjusted range, for comparison
    pub unadjusted_compliance: ComplianceAssessment,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Full benchmarking workflow: adjust the comparable set, build the ranges
/// and test the tested party against the adjusted interquartile range.
///
/// Unlike the core analysis, this enforces the configured minimum number of
/// comparables.
pub fn benchmark_tested_party(
    request: &BenchmarkRequest,
) -> BenchmarkResult<ComputationOutput<BenchmarkOutput>> {
    let start = Instant::now();
    let config = &request.config;
    config.validate()?;

    if request.comparables.len() < config.min_comparables {
        return Err(BenchmarkError::InsufficientData(format!(
            "{} comparables supplied; at least {} are required for a meaningful range",
            request.comparables.len(),
            config.min_comparables,
        )));
    }

    let adjustment_types: Vec<AdjustmentType> = request
        .adjustment_types
        .clone()
        .unwrap_or_else(|| AdjustmentType::ALL.to_vec());

    let analysis = perform_comparability_analysis(
        &request.tested_party,
        &request.comparables,
        &adjustment_types,
        config,
    )?;

    let mut warnings: Vec<String> = Vec::new();

    if analysis.comparables.len() < 5 {
        warnings.push(format!(
            "Only {} comparables: OECD guidance favours a larger set for a robust interquartile range",
            analysis.comparables.len(),
        ));
    }

    for adjusted in &analysis.adjusted_comparables {
        for adj in adjusted.adjustments.iter().filter(|a| !a.is_reasonable) {
            warnings.push(format!(
                "{}: {} adjustment of {}% exceeds the {}% reasonableness ceiling and was not applied",
                adjusted.entity.name,
                adj.adjustment_type,
                round2(adj.amount),
                adj.max_allowed,
            ));
        }
        if adjusted.entity.operations.capacity_utilization.is_zero() {
            warnings.push(format!(
                "{}: capacity utilisation reported as zero",
                adjusted.entity.name
            ));
        }
    }

    let compliance = evaluate_compliance(analysis.tested_party_margin, &analysis.adjusted_range);
    let unadjusted_compliance =
        evaluate_compliance(analysis.tested_party_margin, &analysis.unadjusted_range);

    if compliance.position != unadjusted_compliance.position {
        warnings.push(format!(
            "Comparability adjustments change the outcome: {:?} the unadjusted range, {:?} the adjusted range",
            unadjusted_compliance.position, compliance.position,
        ));
    }

    for w in &warnings {
        tracing::warn!("{w}");
    }

    let output = BenchmarkOutput {
        tested_party_pli: request
            .tested_party
            .entity
            .financials
            .pli(config.pli_type)?,
        analysis,
        compliance,
        unadjusted_compliance,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Comparability-adjusted interquartile range (TNMM benchmarking)",
        config,
        warnings,
        elapsed,
        output,
    ))
}
