use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::statistics::round2;
use crate::types::{OperationalProfile, Percent, Rate, RiskCategory};

/// Weight and adjustment bounds (percentage points) for one risk category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskParameters {
    pub weight: Decimal,
    pub min: Percent,
    pub max: Percent,
}

/// Weights sum to 1.0 across the eight categories.
pub fn risk_parameters(category: RiskCategory) -> RiskParameters {
    let (weight, bound) = match category {
        RiskCategory::Market => (dec!(0.20), dec!(3.0)),
        RiskCategory::Inventory => (dec!(0.15), dec!(2.0)),
        RiskCategory::Credit => (dec!(0.15), dec!(1.5)),
        RiskCategory::ForeignExchange => (dec!(0.10), dec!(1.5)),
        RiskCategory::ProductLiability => (dec!(0.10), dec!(2.0)),
        RiskCategory::Warranty => (dec!(0.10), dec!(1.0)),
        RiskCategory::ResearchAndDevelopment => (dec!(0.10), dec!(3.0)),
        RiskCategory::BusinessContinuity => (dec!(0.10), dec!(1.0)),
    };
    RiskParameters {
        weight,
        min: -bound,
        max: bound,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskDifference {
    /// Only the tested party bears the risk
    TestedPartyOnly,
    /// Only the comparable bears the risk
    ComparableOnly,
    Both,
    Neither,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskContribution {
    pub category: RiskCategory,
    pub difference: RiskDifference,
    /// Weighted contribution in percentage points
    pub contribution: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAdjustment {
    pub contributions: Vec<RiskContribution>,
    pub tested_party_risk_score: Decimal,
    pub comparable_risk_score: Decimal,
    /// Signed fraction added to the comparable's margin
    pub net_adjustment: Rate,
    pub methodology: String,
}

/// Weighted 0-100 score over the risks a party bears.
pub fn risk_score(profile: &OperationalProfile) -> Decimal {
    let raw: Decimal = RiskCategory::ALL
        .iter()
        .filter_map(|category| {
            profile
                .borne_risk(*category)
                .map(|risk| risk_parameters(*category).weight * risk.level.multiplier())
        })
        .sum();
    (raw * dec!(100)).min(dec!(100))
}

/// Adjust a comparable for differences in the risks each party bears.
///
/// A risk borne only by the tested party contributes the category maximum
/// times its weight (the comparable earned a low-risk return and is adjusted
/// up). A risk borne only by the comparable contributes the category minimum
/// times its weight.
pub fn calculate_risk_adjustment(
    tested_party: &OperationalProfile,
    comparable: &OperationalProfile,
) -> RiskAdjustment {
    let contributions: Vec<RiskContribution> = RiskCategory::ALL
        .iter()
        .map(|category| {
            let params = risk_parameters(*category);
            let tested = tested_party.borne_risk(*category).is_some();
            let comp = comparable.borne_risk(*category).is_some();
            let (difference, contribution) = match (tested, comp) {
                (true, false) => (RiskDifference::TestedPartyOnly, params.max * params.weight),
                (false, true) => (RiskDifference::ComparableOnly, params.min * params.weight),
                (true, true) => (RiskDifference::Both, Decimal::ZERO),
                (false, false) => (RiskDifference::Neither, Decimal::ZERO),
            };
            RiskContribution {
                category: *category,
                difference,
                contribution,
            }
        })
        .collect();

    let total: Percent = contributions.iter().map(|c| c.contribution).sum();
    let net_adjustment = total / dec!(100);
    let tested_party_risk_score = risk_score(tested_party);
    let comparable_risk_score = risk_score(comparable);

    let differing: Vec<String> = contributions
        .iter()
        .filter(|c| !c.contribution.is_zero())
        .map(|c| format!("{:?} ({}%)", c.category, round2(c.contribution)))
        .collect();

    let methodology = if differing.is_empty() {
        format!(
            "Risk adjustment: tested party and comparable bear the same risks \
             (risk scores {} and {}); no adjustment.",
            round2(tested_party_risk_score),
            round2(comparable_risk_score),
        )
    } else {
        format!(
            "Risk adjustment: risk scores tested party {} vs comparable {}. \
             Differing risks: {}. Net adjustment {}%.",
            round2(tested_party_risk_score),
            round2(comparable_risk_score),
            differing.join(", "),
            round2(total),
        )
    };

    RiskAdjustment {
        contributions,
        tested_party_risk_score,
        comparable_risk_score,
        net_adjustment,
        methodology,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RiskAssumption, RiskLevel};

    fn borne(category: RiskCategory, level: RiskLevel) -> RiskAssumption {
        RiskAssumption {
            category,
            assumed: true,
            mitigated: false,
            level,
        }
    }

    fn profile(risks: Vec<RiskAssumption>) -> OperationalProfile {
        OperationalProfile {
            capacity_utilization: dec!(0.8),
            risks,
            employee_count: None,
            years_in_business: None,
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total: Decimal = RiskCategory::ALL
            .iter()
            .map(|c| risk_parameters(*c).weight)
            .sum();
        assert_eq!(total, dec!(1.0));
    }

    #[test]
    fn test_tested_party_only_adjusts_up() {
        let tp = profile(vec![borne(RiskCategory::Market, RiskLevel::High)]);
        let comp = profile(vec![]);
        let out = calculate_risk_adjustment(&tp, &comp);
        // 3.0 x 0.20 = 0.6 points
        assert_eq!(out.net_adjustment, dec!(0.006));
    }

    #[test]
    fn test_comparable_only_adjusts_down() {
        let tp = profile(vec![]);
        let comp = profile(vec![borne(RiskCategory::Credit, RiskLevel::Low)]);
        let out = calculate_risk_adjustment(&tp, &comp);
        // -1.5 x 0.15 = -0.225 points
        assert_eq!(out.net_adjustment, dec!(-0.00225));
    }

    #[test]
    fn test_shared_risks_cancel() {
        let risks = vec![
            borne(RiskCategory::Inventory, RiskLevel::Medium),
            borne(RiskCategory::Warranty, RiskLevel::Low),
        ];
        let out = calculate_risk_adjustment(&profile(risks.clone()), &profile(risks));
        assert!(out.net_adjustment.is_zero());
        assert!(out.methodology.contains("same risks"));
    }

    #[test]
    fn test_mitigated_risk_is_ignored() {
        let mut mitigated = borne(RiskCategory::ForeignExchange, RiskLevel::High);
        mitigated.mitigated = true;
        let out = calculate_risk_adjustment(&profile(vec![mitigated]), &profile(vec![]));
        assert!(out.net_adjustment.is_zero());
        assert!(out.tested_party_risk_score.is_zero());
    }

    #[test]
    fn test_mixed_differences() {
        let tp = profile(vec![
            borne(RiskCategory::Market, RiskLevel::Medium),
            borne(RiskCategory::ResearchAndDevelopment, RiskLevel::High),
        ]);
        let comp = profile(vec![
            borne(RiskCategory::Market, RiskLevel::Medium),
            borne(RiskCategory::Inventory, RiskLevel::Medium),
        ]);
        let out = calculate_risk_adjustment(&tp, &comp);
        // R&D +0.3, inventory -0.3
        assert!(out.net_adjustment.is_zero());
        let rd = out
            .contributions
            .iter()
            .find(|c| c.category == RiskCategory::ResearchAndDevelopment)
            .unwrap();
        assert_eq!(rd.difference, RiskDifference::TestedPartyOnly);
        assert_eq!(rd.contribution, dec!(0.3));
    }

    #[test]
    fn test_risk_score_levels() {
        let p = profile(vec![
            borne(RiskCategory::Market, RiskLevel::High),
            borne(RiskCategory::Credit, RiskLevel::Low),
        ]);
        // (0.20 x 1.5 + 0.15 x 0.5) x 100 = 37.5
        assert_eq!(risk_score(&p), dec!(37.5));
    }

    #[test]
    fn test_risk_score_capped() {
        let all_high = RiskCategory::ALL
            .iter()
            .map(|c| borne(*c, RiskLevel::High))
            .collect();
        assert_eq!(risk_score(&profile(all_high)), dec!(100));
    }
}
