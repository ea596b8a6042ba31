use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::BenchmarkError;
use crate::statistics::round2;
use crate::types::{out_of_range, Industry, Money, Rate};
use crate::BenchmarkResult;

/// Normal (benchmark) capacity utilisation for an industry.
pub fn normal_utilization(industry: &Industry) -> Rate {
    match industry {
        Industry::Manufacturing => dec!(0.85),
        Industry::InformationTechnology => dec!(0.80),
        Industry::Pharmaceuticals => dec!(0.80),
        Industry::Automotive => dec!(0.85),
        Industry::Chemicals => dec!(0.85),
        Industry::Textiles => dec!(0.75),
        Industry::Electronics => dec!(0.80),
        Industry::Distribution => dec!(0.75),
        Industry::Services => dec!(0.80),
        Industry::Other(_) => dec!(0.80),
    }
}

/// Share of operating cost that does not flex with volume.
pub fn fixed_cost_share(industry: &Industry) -> Rate {
    match industry {
        Industry::Manufacturing => dec!(0.40),
        Industry::InformationTechnology => dec!(0.30),
        Industry::Pharmaceuticals => dec!(0.45),
        Industry::Automotive => dec!(0.45),
        Industry::Chemicals => dec!(0.45),
        Industry::Textiles => dec!(0.35),
        Industry::Electronics => dec!(0.40),
        Industry::Distribution => dec!(0.25),
        Industry::Services => dec!(0.30),
        Industry::Other(_) => dec!(0.35),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityParty {
    pub actual_utilization: Rate,
    pub operating_cost: Money,
    pub industry: Industry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityInput {
    pub tested_party: CapacityParty,
    pub comparable: CapacityParty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityPosition {
    pub fixed_cost_share: Rate,
    /// Unabsorbed fixed cost attributable to under-utilisation
    pub idle_capacity_cost: Money,
    /// Idle capacity cost as a fraction of operating cost
    pub cost_ratio: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityAdjustment {
    pub normal_utilization: Rate,
    pub tested_party: CapacityPosition,
    pub comparable: CapacityPosition,
    /// Signed fraction added to the comparable's margin
    pub net_adjustment: Rate,
    pub methodology: String,
}

fn validate_party(label: &str, party: &CapacityParty) -> BenchmarkResult<()> {
    if party.actual_utilization < Decimal::ZERO || party.actual_utilization > Decimal::ONE {
        return Err(BenchmarkError::InvalidInput {
            field: format!("{label}.actual_utilization"),
            reason: "Must be between 0 and 1".into(),
        });
    }
    if party.operating_cost < Decimal::ZERO {
        return Err(BenchmarkError::InvalidInput {
            field: format!("{label}.operating_cost"),
            reason: "Must be non-negative".into(),
        });
    }
    Ok(())
}

fn position(
    party: &CapacityParty,
    normal: Rate,
    notes: &mut Vec<String>,
    label: &str,
) -> BenchmarkResult<CapacityPosition> {
    let fixed_cost_share = fixed_cost_share(&party.industry);

    let idle_capacity_cost = if party.actual_utilization >= normal {
        Decimal::ZERO
    } else if party.actual_utilization.is_zero() {
        notes.push(format!(
            "{label} reported zero utilisation; idle capacity cost not computed."
        ));
        Decimal::ZERO
    } else {
        (party.operating_cost * fixed_cost_share * (normal - party.actual_utilization))
            .checked_div(party.actual_utilization)
            .ok_or_else(|| out_of_range(format!("{label}.idle_capacity_cost")))?
    };

    let cost_ratio = if party.operating_cost > Decimal::ZERO {
        idle_capacity_cost
            .checked_div(party.operating_cost)
            .ok_or_else(|| out_of_range(format!("{label}.cost_ratio")))?
    } else {
        if party.actual_utilization < normal {
            notes.push(format!(
                "{label} reported zero operating cost; adjustment ratio taken as zero."
            ));
        }
        Decimal::ZERO
    };

    Ok(CapacityPosition {
        fixed_cost_share,
        idle_capacity_cost,
        cost_ratio,
    })
}

/// Adjust a comparable for differences in capacity utilisation.
///
/// Normal utilisation is the average of the two industries' benchmarks. A
/// party running below normal carries unabsorbed fixed cost of
/// `operating cost x fixed share x (normal - actual) / actual`; the net
/// adjustment is the tested party's ratio less the comparable's.
pub fn calculate_capacity_adjustment(
    input: &CapacityInput,
) -> BenchmarkResult<CapacityAdjustment> {
    validate_party("tested_party", &input.tested_party)?;
    validate_party("comparable", &input.comparable)?;

    let normal = (normal_utilization(&input.tested_party.industry)
        + normal_utilization(&input.comparable.industry))
        / dec!(2);

    let mut notes = Vec::new();
    let tested_party = position(&input.tested_party, normal, &mut notes, "Tested party")?;
    let comparable = position(&input.comparable, normal, &mut notes, "Comparable")?;
    let net_adjustment = tested_party.cost_ratio - comparable.cost_ratio;

    let mut methodology = format!(
        "Capacity utilisation adjustment against normal utilisation of {}%: tested party at {}% \
         (idle cost {}% of operating cost), comparable at {}% (idle cost {}%). Net adjustment {}%.",
        round2(normal * dec!(100)),
        round2(input.tested_party.actual_utilization * dec!(100)),
        round2(tested_party.cost_ratio * dec!(100)),
        round2(input.comparable.actual_utilization * dec!(100)),
        round2(comparable.cost_ratio * dec!(100)),
        round2(net_adjustment * dec!(100)),
    );
    for note in notes {
        methodology.push(' ');
        methodology.push_str(&note);
    }

    Ok(CapacityAdjustment {
        normal_utilization: normal,
        tested_party,
        comparable,
        net_adjustment,
        methodology,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn party(utilization: Decimal, cost: Decimal, industry: Industry) -> CapacityParty {
        CapacityParty {
            actual_utilization: utilization,
            operating_cost: cost,
            industry,
        }
    }

    #[test]
    fn test_comparable_under_utilised() {
        let input = CapacityInput {
            tested_party: party(dec!(0.90), dec!(5000), Industry::Manufacturing),
            comparable: party(dec!(0.68), dec!(1000), Industry::Manufacturing),
        };
        let out = calculate_capacity_adjustment(&input).unwrap();
        assert_eq!(out.normal_utilization, dec!(0.85));
        assert!(out.tested_party.idle_capacity_cost.is_zero());
        // 1000 x 0.40 x 0.17 / 0.68 = 100
        assert_eq!(out.comparable.idle_capacity_cost, dec!(100));
        assert_eq!(out.net_adjustment, dec!(-0.1));
    }

    #[test]
    fn test_normal_is_average_of_industries() {
        let input = CapacityInput {
            tested_party: party(dec!(0.95), dec!(100), Industry::Manufacturing),
            comparable: party(dec!(0.95), dec!(100), Industry::Textiles),
        };
        let out = calculate_capacity_adjustment(&input).unwrap();
        assert_eq!(out.normal_utilization, dec!(0.80));
        assert!(out.net_adjustment.is_zero());
    }

    #[test]
    fn test_tested_party_under_utilised_adjusts_up() {
        let input = CapacityInput {
            tested_party: party(dec!(0.60), dec!(1000), Industry::Distribution),
            comparable: party(dec!(0.80), dec!(1000), Industry::Distribution),
        };
        let out = calculate_capacity_adjustment(&input).unwrap();
        // 0.25 x 0.15 / 0.60 = 0.0625
        assert_eq!(out.net_adjustment, dec!(0.0625));
    }

    #[test]
    fn test_zero_utilisation_neutral() {
        let input = CapacityInput {
            tested_party: party(dec!(0), dec!(1000), Industry::Services),
            comparable: party(dec!(0.80), dec!(1000), Industry::Services),
        };
        let out = calculate_capacity_adjustment(&input).unwrap();
        assert!(out.net_adjustment.is_zero());
        assert!(out.methodology.contains("zero utilisation"));
    }

    #[test]
    fn test_zero_operating_cost_neutral() {
        let input = CapacityInput {
            tested_party: party(dec!(0.85), dec!(1000), Industry::Chemicals),
            comparable: party(dec!(0.50), dec!(0), Industry::Chemicals),
        };
        let out = calculate_capacity_adjustment(&input).unwrap();
        assert!(out.net_adjustment.is_zero());
        assert!(out.methodology.contains("zero operating cost"));
    }

    #[test]
    fn test_tiny_utilisation_errors_instead_of_overflow() {
        let input = CapacityInput {
            tested_party: party(dec!(0.85), dec!(1000), Industry::Chemicals),
            comparable: party(
                dec!(0.0000000000000000000000000001),
                dec!(10000000000000000000000),
                Industry::Chemicals,
            ),
        };
        assert!(matches!(
            calculate_capacity_adjustment(&input),
            Err(BenchmarkError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_utilisation_out_of_bounds_rejected() {
        let input = CapacityInput {
            tested_party: party(dec!(1.2), dec!(1000), Industry::Chemicals),
            comparable: party(dec!(0.5), dec!(1000), Industry::Chemicals),
        };
        assert!(calculate_capacity_adjustment(&input).is_err());
    }
}
