use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use armslength_core::statistics::{self, ArmLengthBand, StatisticalRange};

use crate::input;

/// Arguments for interquartile range statistics
#[derive(Args)]
pub struct RangeArgs {
    /// Path to JSON file: an array of margins or an object with a "values" array
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated margins in percent (e.g. "10,12.5,14")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub values: Option<Vec<Decimal>>,
}

#[derive(Debug, Serialize)]
struct RangeOutput {
    range: StatisticalRange,
    arm_length_band: ArmLengthBand,
}

fn values_from_json(data: Value) -> Result<Vec<Decimal>, Box<dyn std::error::Error>> {
    let arr = match data {
        Value::Array(_) => data,
        Value::Object(mut obj) => obj
            .remove("values")
            .ok_or("JSON object must contain a 'values' array")?,
        _ => return Err("Expected a JSON array of margins or object with 'values' key".into()),
    };
    Ok(serde_json::from_value(arr)?)
}

fn get_values(args: &RangeArgs) -> Result<Vec<Decimal>, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        values_from_json(input::file::read_json_value(path)?)
    } else if let Some(ref values) = args.values {
        Ok(values.clone())
    } else if let Some(data) = input::stdin::read_stdin()? {
        values_from_json(data)
    } else {
        Err("Provide --values or --input file or pipe JSON via stdin".into())
    }
}

pub fn run_range(args: RangeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let values = get_values(&args)?;
    statistics::validate_values(&values)?;
    let output = RangeOutput {
        range: statistics::compute_range(&values),
        arm_length_band: statistics::arm_length_band(&values),
    };
    Ok(serde_json::json!({ "result": output }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_values_from_array() {
        let values = values_from_json(serde_json::json!(["10", 12, 14.5])).unwrap();
        assert_eq!(values, vec![dec!(10), dec!(12), dec!(14.5)]);
    }

    #[test]
    fn test_values_from_object() {
        let values = values_from_json(serde_json::json!({ "values": ["1", "2"] })).unwrap();
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_non_numeric_rejected() {
        assert!(values_from_json(serde_json::json!(["ten"])).is_err());
        assert!(values_from_json(serde_json::json!("10")).is_err());
    }

    #[test]
    fn test_oversized_values_rejected() {
        let args = RangeArgs {
            input: None,
            values: Some(vec![dec!(70000000000000000000000000000); 2]),
        };
        let err = run_range(args).unwrap_err();
        assert!(err.to_string().contains("values[0]"));
    }
}
