use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::BenchmarkError;
use crate::statistics::round2;
use crate::types::{out_of_range, FinancialProfile, Money, Rate};
use crate::BenchmarkResult;

// ---------------------------------------------------------------------------
// Input Types
// ---------------------------------------------------------------------------

/// Working capital cycle of one party.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkingCapitalParty {
    pub receivable_days: Decimal,
    pub payable_days: Decimal,
    pub inventory_days: Decimal,
    pub revenue: Money,
    pub cost_of_sales: Money,
}

impl WorkingCapitalParty {
    /// Derive the day counts from year-end balances.
    pub fn from_profile(profile: &FinancialProfile) -> BenchmarkResult<Self> {
        Ok(Self {
            receivable_days: profile.receivable_days()?,
            payable_days: profile.payable_days()?,
            inventory_days: profile.inventory_days()?,
            revenue: profile.revenue,
            cost_of_sales: profile.cost_of_sales,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingCapitalInput {
    pub tested_party: WorkingCapitalParty,
    pub comparable: WorkingCapitalParty,
    /// Annual interest rate used to price the financing burden
    pub interest_rate: Rate,
}

// ---------------------------------------------------------------------------
// Output Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingCapitalPosition {
    pub net_working_capital_days: Decimal,
    pub working_capital_required: Money,
    pub interest_cost: Money,
    /// Interest cost as a fraction of revenue
    pub factor: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingCapitalAdjustment {
    pub tested_party: WorkingCapitalPosition,
    pub comparable: WorkingCapitalPosition,
    /// Tested party net days less comparable net days
    pub day_difference: Decimal,
    /// Signed fraction added to the comparable's margin
    pub net_adjustment: Rate,
    pub methodology: String,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

fn validate(input: &WorkingCapitalInput) -> BenchmarkResult<()> {
    if input.interest_rate < Decimal::ZERO || input.interest_rate > Decimal::ONE {
        return Err(BenchmarkError::InvalidInput {
            field: "interest_rate".into(),
            reason: "Must be between 0 and 1".into(),
        });
    }
    for (label, party) in [
        ("tested_party", &input.tested_party),
        ("comparable", &input.comparable),
    ] {
        let fields = [
            ("receivable_days", party.receivable_days),
            ("payable_days", party.payable_days),
            ("inventory_days", party.inventory_days),
            ("revenue", party.revenue),
            ("cost_of_sales", party.cost_of_sales),
        ];
        for (name, value) in fields {
            if value < Decimal::ZERO {
                return Err(BenchmarkError::InvalidInput {
                    field: format!("{label}.{name}"),
                    reason: "Must be non-negative".into(),
                });
            }
        }
    }
    Ok(())
}

fn position(
    label: &str,
    party: &WorkingCapitalParty,
    interest_rate: Rate,
) -> BenchmarkResult<WorkingCapitalPosition> {
    let overflow = || out_of_range(format!("{label}.working_capital"));

    let net_working_capital_days = (party.receivable_days - party.payable_days)
        .checked_add(party.inventory_days)
        .ok_or_else(overflow)?;
    let working_capital_required = net_working_capital_days
        .checked_mul(party.revenue / dec!(365))
        .ok_or_else(overflow)?;
    let interest_cost = working_capital_required
        .checked_mul(interest_rate)
        .ok_or_else(overflow)?;
    let factor = if party.revenue > Decimal::ZERO {
        interest_cost.checked_div(party.revenue).ok_or_else(overflow)?
    } else {
        Decimal::ZERO
    };

    Ok(WorkingCapitalPosition {
        net_working_capital_days,
        working_capital_required,
        interest_cost,
        factor,
    })
}

/// Adjust a comparable for the difference in working capital intensity.
///
/// Each party's financing burden is `net days x revenue / 365 x rate`,
/// expressed as a fraction of its revenue. The adjustment is the tested
/// party's factor less the comparable's, so swapping the parties negates it.
pub fn calculate_working_capital_adjustment(
    input: &WorkingCapitalInput,
) -> BenchmarkResult<WorkingCapitalAdjustment> {
    validate(input)?;

    let tested_party = position("tested_party", &input.tested_party, input.interest_rate)?;
    let comparable = position("comparable", &input.comparable, input.interest_rate)?;
    let day_difference = tested_party
        .net_working_capital_days
        .checked_sub(comparable.net_working_capital_days)
        .ok_or_else(|| out_of_range("day_difference"))?;
    let net_adjustment = tested_party
        .factor
        .checked_sub(comparable.factor)
        .ok_or_else(|| out_of_range("net_adjustment"))?;

    let mut methodology = format!(
        "Working capital adjustment at {}% interest: tested party net working capital {} days \
         (receivables {} - payables {} + inventory {}), comparable {} days; difference {} days. \
         Financing factor {}% vs {}% of revenue gives a net adjustment of {}%.",
        round2(input.interest_rate * dec!(100)),
        round2(tested_party.net_working_capital_days),
        round2(input.tested_party.receivable_days),
        round2(input.tested_party.payable_days),
        round2(input.tested_party.inventory_days),
        round2(comparable.net_working_capital_days),
        round2(day_difference),
        round2(tested_party.factor * dec!(100)),
        round2(comparable.factor * dec!(100)),
        round2(net_adjustment * dec!(100)),
    );
    if input.tested_party.revenue.is_zero() || input.comparable.revenue.is_zero() {
        methodology
            .push_str(" A party reported zero revenue; its financing factor is taken as zero.");
    }

    Ok(WorkingCapitalAdjustment {
        tested_party,
        comparable,
        day_difference,
        net_adjustment,
        methodology,
    })
}
