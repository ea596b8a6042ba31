use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::BenchmarkError;
use crate::statistics::round2;
use crate::types::{Rate, Region};
use crate::BenchmarkResult;

/// Relative cost and market indices for a region (India = 1.00).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionFactors {
    pub labor_cost: Decimal,
    pub overhead: Decimal,
    pub market_size: Decimal,
}

/// Static factor table. `None` for regions without benchmark data.
pub fn region_factors(region: &Region) -> Option<RegionFactors> {
    let (labor_cost, overhead, market_size) = match region {
        Region::India => (dec!(1.00), dec!(1.00), dec!(1.00)),
        Region::UnitedStates => (dec!(4.50), dec!(2.20), dec!(3.50)),
        Region::UnitedKingdom => (dec!(3.80), dec!(2.00), dec!(1.60)),
        Region::Germany => (dec!(4.00), dec!(2.10), dec!(1.80)),
        Region::France => (dec!(3.70), dec!(2.00), dec!(1.50)),
        Region::China => (dec!(1.60), dec!(1.20), dec!(3.20)),
        Region::Japan => (dec!(3.50), dec!(2.30), dec!(2.00)),
        Region::Singapore => (dec!(3.20), dec!(2.40), dec!(0.60)),
        Region::Brazil => (dec!(1.40), dec!(1.10), dec!(1.10)),
        Region::UnitedArabEmirates => (dec!(2.50), dec!(1.80), dec!(0.70)),
        Region::Other(_) => return None,
    };
    Some(RegionFactors {
        labor_cost,
        overhead,
        market_size,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeographicWeights {
    pub labor_cost: Decimal,
    pub overhead: Decimal,
    pub market_size: Decimal,
}

impl Default for GeographicWeights {
    fn default() -> Self {
        Self {
            labor_cost: dec!(0.5),
            overhead: dec!(0.3),
            market_size: dec!(0.2),
        }
    }
}

impl GeographicWeights {
    pub fn validate(&self) -> BenchmarkResult<()> {
        let weights = [
            ("labor_cost", self.labor_cost),
            ("overhead", self.overhead),
            ("market_size", self.market_size),
        ];
        for (name, value) in weights {
            if value < Decimal::ZERO {
                return Err(BenchmarkError::InvalidInput {
                    field: format!("geographic_weights.{name}"),
                    reason: "Must be non-negative".into(),
                });
            }
        }
        let total = self.labor_cost + self.overhead + self.market_size;
        if total > Decimal::ONE {
            return Err(BenchmarkError::InvalidInput {
                field: "geographic_weights".into(),
                reason: format!("Weights must sum to at most 1, got {total}"),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeographicInput {
    pub tested_party_region: Region,
    pub comparable_region: Region,
    #[serde(default)]
    pub weights: GeographicWeights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeographicAdjustment {
    /// (tested - comparable) / comparable for each index; zero when data is missing
    pub labor_cost_differential: Rate,
    pub overhead_differential: Rate,
    pub market_size_differential: Rate,
    /// Signed fraction added to the comparable's margin
    pub net_adjustment: Rate,
    pub methodology: String,
}

impl GeographicAdjustment {
    fn neutral(methodology: String) -> Self {
        Self {
            labor_cost_differential: Decimal::ZERO,
            overhead_differential: Decimal::ZERO,
            market_size_differential: Decimal::ZERO,
            net_adjustment: Decimal::ZERO,
            methodology,
        }
    }
}

fn differential(tested: Decimal, comparable: Decimal) -> Rate {
    if comparable.is_zero() {
        return Decimal::ZERO;
    }
    (tested - comparable) / comparable
}

/// Adjust a comparable for location differences in labour cost, overhead and
/// market size. Regions without factor data yield a zero adjustment.
pub fn calculate_geographic_adjustment(
    input: &GeographicInput,
) -> BenchmarkResult<GeographicAdjustment> {
    input.weights.validate()?;

    let (tested, comparable) = match (
        region_factors(&input.tested_party_region),
        region_factors(&input.comparable_region),
    ) {
        (Some(t), Some(c)) => (t, c),
        _ => {
            let missing: Vec<String> = [&input.tested_party_region, &input.comparable_region]
                .into_iter()
                .filter(|r| region_factors(r).is_none())
                .map(|r| r.to_string())
                .collect();
            return Ok(GeographicAdjustment::neutral(format!(
                "Geographic adjustment not applied: no regional factor data for {}.",
                missing.join(", ")
            )));
        }
    };

    if input.tested_party_region == input.comparable_region {
        return Ok(GeographicAdjustment::neutral(format!(
            "Geographic adjustment: tested party and comparable both operate in {}; no adjustment.",
            input.tested_party_region
        )));
    }

    let labor_cost_differential = differential(tested.labor_cost, comparable.labor_cost);
    let overhead_differential = differential(tested.overhead, comparable.overhead);
    let market_size_differential = differential(tested.market_size, comparable.market_size);

    let w = &input.weights;
    let net_adjustment = labor_cost_differential * w.labor_cost
        + overhead_differential * w.overhead
        + market_size_differential * w.market_size;

    let methodology = format!(
        "Geographic adjustment {} vs {}: labour cost differential {}% (weight {}), overhead {}% \
         (weight {}), market size {}% (weight {}). Net adjustment {}%.",
        input.tested_party_region,
        input.comparable_region,
        round2(labor_cost_differential * dec!(100)),
        w.labor_cost,
        round2(overhead_differential * dec!(100)),
        w.overhead,
        round2(market_size_differential * dec!(100)),
        w.market_size,
        round2(net_adjustment * dec!(100)),
    );

    Ok(GeographicAdjustment {
        labor_cost_differential,
        overhead_differential,
        market_size_differential,
        net_adjustment,
        methodology,
    })
}
