use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use armslength_core::benchmark::{self, BenchmarkRequest};
use armslength_core::compliance;
use armslength_core::statistics::StatisticalRange;

use crate::input;

/// Arguments for the full benchmarking workflow
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to JSON benchmark request (tested party, comparables, config)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for testing a margin against a known range
#[derive(Args)]
pub struct EvaluateArgs {
    /// Tested party margin in percent (e.g. 8.5)
    #[arg(long, allow_hyphen_values = true)]
    pub margin: Decimal,

    /// Lower quartile of the arm's length range
    #[arg(long, allow_hyphen_values = true)]
    pub q1: Decimal,

    /// Median of the arm's length range
    #[arg(long, allow_hyphen_values = true)]
    pub median: Decimal,

    /// Upper quartile of the arm's length range
    #[arg(long, allow_hyphen_values = true)]
    pub q3: Decimal,
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: BenchmarkRequest = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for benchmarking".into());
    };
    let result = benchmark::benchmark_tested_party(&request)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_evaluate(args: EvaluateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let range = StatisticalRange {
        q1: args.q1,
        median: args.median,
        q3: args.q3,
        ..StatisticalRange::default()
    };
    compliance::validate_evaluation(args.margin, &range)?;
    let result = compliance::evaluate_compliance(args.margin, &range);
    Ok(serde_json::json!({ "result": result }))
}
