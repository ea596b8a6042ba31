use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use armslength_core::benchmark::BenchmarkRequest;
use armslength_core::statistics::StatisticalRange;
use armslength_core::AdjustmentType;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

#[derive(Deserialize)]
struct ComplianceInput {
    margin: Decimal,
    range: StatisticalRange,
}

// ---------------------------------------------------------------------------
// Benchmarking
// ---------------------------------------------------------------------------

/// Full workflow: adjusted range, compliance and warnings in the output envelope.
#[napi]
pub fn benchmark_tested_party(input_json: String) -> NapiResult<String> {
    let input: BenchmarkRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        armslength_core::benchmark::benchmark_tested_party(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Core analysis only; no minimum comparable count is enforced.
#[napi]
pub fn comparability_analysis(input_json: String) -> NapiResult<String> {
    let input: BenchmarkRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let types = input
        .adjustment_types
        .unwrap_or_else(|| AdjustmentType::ALL.to_vec());
    let output = armslength_core::comparability::perform_comparability_analysis(
        &input.tested_party,
        &input.comparables,
        &types,
        &input.config,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Input is a JSON array of margins in percent.
#[napi]
pub fn compute_range(input_json: String) -> NapiResult<String> {
    let values: Vec<Decimal> = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    armslength_core::statistics::validate_values(&values).map_err(to_napi_error)?;
    let output = armslength_core::statistics::compute_range(&values);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn evaluate_compliance(input_json: String) -> NapiResult<String> {
    let input: ComplianceInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    armslength_core::compliance::validate_evaluation(input.margin, &input.range)
        .map_err(to_napi_error)?;
    let output = armslength_core::compliance::evaluate_compliance(input.margin, &input.range);
    serde_json::to_string(&output).map_err(to_napi_error)
}
