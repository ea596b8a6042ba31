use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::adjustments::geographic::GeographicWeights;
use crate::error::BenchmarkError;
use crate::types::{PliType, Rate};
use crate::BenchmarkResult;

/// Settings for one benchmarking run.
///
/// Built once per request and passed by reference; nothing in the engine
/// mutates it.
///
/// ```json
/// {
///   "pli_type": "OP/OC",
///   "interest_rate": "0.09",
///   "min_comparables": 3,
///   "geographic_weights": { "labor_cost": "0.5", "overhead": "0.3", "market_size": "0.2" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Profit level indicator the materiality thresholds are keyed on
    pub pli_type: PliType,
    /// Annual rate used to price working capital (default 9%)
    pub interest_rate: Rate,
    /// Smallest comparable set accepted by the benchmark workflow (default 3)
    pub min_comparables: usize,
    pub geographic_weights: GeographicWeights,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            pli_type: PliType::OpOc,
            interest_rate: dec!(0.09),
            min_comparables: 3,
            geographic_weights: GeographicWeights::default(),
        }
    }
}

impl BenchmarkConfig {
    pub fn validate(&self) -> BenchmarkResult<()> {
        if self.interest_rate < Decimal::ZERO || self.interest_rate > Decimal::ONE {
            return Err(BenchmarkError::InvalidInput {
                field: "config.interest_rate".into(),
                reason: "Must be between 0 and 1".into(),
            });
        }
        self.geographic_weights.validate()
    }
}
