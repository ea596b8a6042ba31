use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{AdjustmentType, Percent, PliType};

/// Materiality threshold and reasonableness ceiling, in percentage points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub materiality: Percent,
    pub max_allowed: Percent,
}

impl Thresholds {
    /// Applied to any adjustment/PLI pairing without a specific entry.
    pub const DEFAULT: Thresholds = Thresholds {
        materiality: dec!(0.5),
        max_allowed: dec!(10),
    };

    const fn new(materiality: Decimal, max_allowed: Decimal) -> Self {
        Self {
            materiality,
            max_allowed,
        }
    }
}

/// Outcome of gating one adjustment amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateDecision {
    pub is_material: bool,
    pub is_reasonable: bool,
    pub thresholds: Thresholds,
}

impl GateDecision {
    /// Only material and reasonable adjustments enter the adjusted margin.
    pub fn applies(&self) -> bool {
        self.is_material && self.is_reasonable
    }
}

/// Decides which computed adjustments are worth applying for a given PLI.
///
/// Stateless apart from the PLI it was built for; construct one per analysis
/// and share it by reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialityGate {
    pli: PliType,
}

impl MaterialityGate {
    pub fn new(pli: PliType) -> Self {
        Self { pli }
    }

    pub fn pli(&self) -> PliType {
        self.pli
    }

    /// Thresholds for an adjustment type under this gate's PLI.
    pub fn thresholds(&self, adjustment: AdjustmentType) -> Thresholds {
        thresholds_for(adjustment, self.pli)
    }

    /// Material when `|amount| > materiality`; reasonable when
    /// `|amount| <= max_allowed`.
    pub fn assess(&self, adjustment: AdjustmentType, amount: Percent) -> GateDecision {
        let thresholds = self.thresholds(adjustment);
        let magnitude = amount.abs();
        let decision = GateDecision {
            is_material: magnitude > thresholds.materiality,
            is_reasonable: magnitude <= thresholds.max_allowed,
            thresholds,
        };
        tracing::debug!(
            adjustment = ?adjustment,
            pli = %self.pli,
            amount = %amount,
            material = decision.is_material,
            reasonable = decision.is_reasonable,
            "materiality gate"
        );
        decision
    }
}

/// Per adjustment type and PLI threshold table.
pub fn thresholds_for(adjustment: AdjustmentType, pli: PliType) -> Thresholds {
    use AdjustmentType::*;
    use PliType::*;

    let specific = match (adjustment, pli) {
        (WorkingCapital, OpOc | OpOr) => Some(Thresholds::new(dec!(0.5), dec!(5))),
        (WorkingCapital, Roce | OpTa) => Some(Thresholds::new(dec!(1.0), dec!(8))),
        (Risk, OpOc | OpOr | BerryRatio) => Some(Thresholds::new(dec!(1.0), dec!(10))),
        (CapacityUtilization, OpOc | OpOr) => Some(Thresholds::new(dec!(1.0), dec!(15))),
        (CapacityUtilization, Roce) => Some(Thresholds::new(dec!(1.5), dec!(15))),
        (Geographic, OpOc | OpOr) => Some(Thresholds::new(dec!(0.5), dec!(10))),
        (AccountingStandards, OpOc | OpOr | Roce | OpTa) => {
            Some(Thresholds::new(dec!(0.25), dec!(5)))
        }
        _ => None,
    };
    specific.unwrap_or(Thresholds::DEFAULT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specific_thresholds() {
        let t = thresholds_for(AdjustmentType::WorkingCapital, PliType::OpOc);
        assert_eq!(t.materiality, dec!(0.5));
        assert_eq!(t.max_allowed, dec!(5));
        let t = thresholds_for(AdjustmentType::CapacityUtilization, PliType::Roce);
        assert_eq!(t.materiality, dec!(1.5));
    }

    #[test]
    fn test_unlisted_pairing_uses_default() {
        let t = thresholds_for(AdjustmentType::Geographic, PliType::BerryRatio);
        assert_eq!(t, Thresholds::DEFAULT);
    }

    #[test]
    fn test_immaterial_amount_not_applied() {
        let gate = MaterialityGate::new(PliType::OpOc);
        let d = gate.assess(AdjustmentType::WorkingCapital, dec!(0.5));
        // exactly at the threshold is not material
        assert!(!d.is_material);
        assert!(d.is_reasonable);
        assert!(!d.applies());
    }

    #[test]
    fn test_material_and_reasonable_applies() {
        let gate = MaterialityGate::new(PliType::OpOc);
        let d = gate.assess(AdjustmentType::WorkingCapital, dec!(-1.3));
        assert!(d.is_material);
        assert!(d.is_reasonable);
        assert!(d.applies());
    }

    #[test]
    fn test_unreasonable_amount_not_applied() {
        let gate = MaterialityGate::new(PliType::OpOc);
        let d = gate.assess(AdjustmentType::WorkingCapital, dec!(5.01));
        assert!(d.is_material);
        assert!(!d.is_reasonable);
        assert!(!d.applies());
        // at the ceiling is still reasonable
        assert!(gate.assess(AdjustmentType::WorkingCapital, dec!(5)).is_reasonable);
    }
}
