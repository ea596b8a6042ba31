use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use armslength_core::adjustments::geographic::{self, GeographicInput, GeographicWeights};
use armslength_core::Region;

/// Arguments for a stand-alone geographic adjustment
#[derive(Args)]
pub struct GeographicArgs {
    /// Tested party region (e.g. India, UnitedStates)
    #[arg(long)]
    pub tested_region: String,

    /// Comparable region
    #[arg(long)]
    pub comparable_region: String,

    /// Weight on the labour cost differential
    #[arg(long, default_value = "0.5")]
    pub labor_weight: Decimal,

    /// Weight on the overhead differential
    #[arg(long, default_value = "0.3")]
    pub overhead_weight: Decimal,

    /// Weight on the market size differential
    #[arg(long, default_value = "0.2")]
    pub market_weight: Decimal,
}

/// Known variant names map to their region; anything else is carried as `Other`.
fn parse_region(name: &str) -> Region {
    serde_json::from_value(Value::String(name.to_string()))
        .unwrap_or_else(|_| Region::Other(name.to_string()))
}

pub fn run_geographic(args: GeographicArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = GeographicInput {
        tested_party_region: parse_region(&args.tested_region),
        comparable_region: parse_region(&args.comparable_region),
        weights: GeographicWeights {
            labor_cost: args.labor_weight,
            overhead: args.overhead_weight,
            market_size: args.market_weight,
        },
    };
    let result = geographic::calculate_geographic_adjustment(&input)?;
    Ok(serde_json::json!({ "result": result }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_region() {
        assert_eq!(parse_region("UnitedStates"), Region::UnitedStates);
    }

    #[test]
    fn test_parse_unknown_region() {
        assert_eq!(parse_region("Vietnam"), Region::Other("Vietnam".into()));
    }
}
