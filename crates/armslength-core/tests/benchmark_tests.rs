use armslength_core::adjustments::geographic::GeographicWeights;
use armslength_core::benchmark::{benchmark_tested_party, BenchmarkRequest};
use armslength_core::comparability::{apply_all_adjustments, perform_comparability_analysis};
use armslength_core::compliance::RangePosition;
use armslength_core::config::BenchmarkConfig;
use armslength_core::{
    AccountingStandard, AdjustmentType, BenchmarkError, ComparableEntity, FinancialProfile,
    Industry, OperationalProfile, PliType, Region, RiskAssumption, RiskCategory, RiskLevel,
    TestedPartyData,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Fixtures
// ===========================================================================

fn company(name: &str, operating_profit: Decimal) -> ComparableEntity {
    ComparableEntity {
        name: name.into(),
        fiscal_year: 2023,
        industry: Industry::InformationTechnology,
        region: Region::India,
        financials: FinancialProfile {
            revenue: dec!(100) + operating_profit,
            cost_of_sales: dec!(0),
            gross_profit: dec!(100) + operating_profit,
            operating_expenses: dec!(100),
            operating_profit,
            total_assets: dec!(250),
            current_assets: dec!(120),
            current_liabilities: dec!(50),
            ..FinancialProfile::default()
        },
        operations: OperationalProfile {
            capacity_utilization: dec!(0.90),
            ..OperationalProfile::default()
        },
        accounting_standard: AccountingStandard::IndAs,
        accounting_items: vec![],
    }
}

fn tested_party(operating_profit: Decimal) -> TestedPartyData {
    TestedPartyData {
        entity: company("Captive Services Pvt Ltd", operating_profit),
        transaction_value: dec!(108),
        related_party_pct: dec!(100),
    }
}

fn comparable_set() -> Vec<ComparableEntity> {
    [10, 12, 14, 16, 18, 20]
        .iter()
        .enumerate()
        .map(|(i, m)| company(&format!("Independent {}", i + 1), Decimal::from(*m)))
        .collect()
}

fn request(operating_profit: Decimal) -> BenchmarkRequest {
    BenchmarkRequest {
        tested_party: tested_party(operating_profit),
        comparables: comparable_set(),
        adjustment_types: None,
        config: BenchmarkConfig::default(),
    }
}

// ===========================================================================
// Workflow
// ===========================================================================

#[test]
fn test_below_range_requires_adjustment_to_median() {
    let out = benchmark_tested_party(&request(dec!(8))).unwrap();
    let result = out.result;

    assert_eq!(result.analysis.adjusted_range.q1, dec!(12.50));
    assert_eq!(result.analysis.adjusted_range.median, dec!(15.00));
    assert_eq!(result.analysis.adjusted_range.q3, dec!(17.50));
    assert_eq!(result.compliance.position, RangePosition::Below);
    assert!(!result.compliance.is_compliant);
    assert_eq!(result.compliance.adjustment_required, dec!(7.00));
}

#[test]
fn test_above_range_is_compliant() {
    let out = benchmark_tested_party(&request(dec!(19))).unwrap();
    assert_eq!(out.result.compliance.position, RangePosition::Above);
    assert!(out.result.compliance.is_compliant);
    assert!(out.result.compliance.adjustment_required.is_zero());
}

#[test]
fn test_all_adjustments_applied_by_default() {
    let out = benchmark_tested_party(&request(dec!(15))).unwrap();
    assert_eq!(
        out.result.analysis.adjustments_applied,
        AdjustmentType::ALL.to_vec()
    );
    for adjusted in &out.result.analysis.adjusted_comparables {
        assert_eq!(adjusted.adjustments.len(), 5);
        // identical profiles apart from profit: nothing to adjust
        assert_eq!(adjusted.adjusted_margin, adjusted.original_margin);
    }
}

#[test]
fn test_too_few_comparables_rejected() {
    let mut req = request(dec!(15));
    req.comparables.truncate(2);
    match benchmark_tested_party(&req) {
        Err(BenchmarkError::InsufficientData(msg)) => assert!(msg.contains("at least 3")),
        other => panic!("expected InsufficientData, got {other:?}"),
    }
}

#[test]
fn test_small_set_warning() {
    let mut req = request(dec!(15));
    req.comparables.truncate(3);
    let out = benchmark_tested_party(&req).unwrap();
    assert!(out.warnings.iter().any(|w| w.contains("Only 3 comparables")));
}

#[test]
fn test_tested_party_pli_follows_config() {
    let mut req = request(dec!(15));
    req.config.pli_type = PliType::OpTa;
    let out = benchmark_tested_party(&req).unwrap();
    // 15 / 250
    assert_eq!(out.result.tested_party_pli, dec!(6));
}

#[test]
fn test_op_oc_pli_is_the_tested_margin() {
    let mut req = request(dec!(24));
    req.tested_party.entity.financials = FinancialProfile {
        revenue: dec!(1000),
        cost_of_sales: dec!(600),
        gross_profit: dec!(400),
        operating_expenses: dec!(300),
        operating_profit: dec!(24),
        ..FinancialProfile::default()
    };
    let out = benchmark_tested_party(&req).unwrap().result;
    assert_eq!(out.analysis.pli_type, PliType::OpOc);
    assert_eq!(out.tested_party_pli, dec!(8));
    assert_eq!(out.tested_party_pli, out.analysis.tested_party_margin);
    assert_eq!(out.compliance.tested_margin, out.tested_party_pli);
}

#[test]
fn test_extreme_ratio_is_an_input_error() {
    let mut req = request(dec!(15));
    req.comparables[4].financials.operating_profit = dec!(10000000000000000000000);
    req.comparables[4].financials.operating_expenses = dec!(0.0000001);
    match benchmark_tested_party(&req) {
        Err(BenchmarkError::InvalidInput { field, reason }) => {
            assert_eq!(field, "comparables[4].financials.operating_margin");
            assert_eq!(reason, "value out of range");
        }
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_adjustments_shift_outcome() {
    let mut req = request(dec!(11));
    // tested party bears market, R&D and inventory risk, comparables do not
    req.tested_party.entity.operations.risks = [
        RiskCategory::Market,
        RiskCategory::ResearchAndDevelopment,
        RiskCategory::Inventory,
    ]
    .iter()
    .map(|c| RiskAssumption {
        category: *c,
        assumed: true,
        mitigated: false,
        level: RiskLevel::High,
    })
    .collect();
    req.adjustment_types = Some(vec![AdjustmentType::Risk]);

    let out = benchmark_tested_party(&req).unwrap();
    let analysis = &out.result.analysis;
    // +1.2 points on every comparable
    assert_eq!(analysis.median_shift, dec!(1.20));
    assert_eq!(analysis.adjusted_range.q1, dec!(13.70));
    assert_eq!(out.result.compliance.adjustment_required, dec!(5.20));
}

#[test]
fn test_invalid_config_rejected() {
    let mut req = request(dec!(15));
    req.config.geographic_weights = GeographicWeights {
        labor_cost: dec!(0.7),
        overhead: dec!(0.4),
        market_size: dec!(0),
    };
    assert!(matches!(
        benchmark_tested_party(&req),
        Err(BenchmarkError::InvalidInput { .. })
    ));
}

#[test]
fn test_negative_balance_rejected() {
    let mut req = request(dec!(15));
    req.comparables[2].financials.receivables = dec!(-10);
    match benchmark_tested_party(&req) {
        Err(BenchmarkError::InvalidInput { field, .. }) => {
            assert_eq!(field, "comparables[2].financials.receivables")
        }
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

// ===========================================================================
// Orchestrator directly
// ===========================================================================

#[test]
fn test_core_analysis_accepts_any_count() {
    let tp = tested_party(dec!(15));
    let out = perform_comparability_analysis(
        &tp,
        &comparable_set()[..1],
        &[AdjustmentType::Geographic],
        &BenchmarkConfig::default(),
    )
    .unwrap();
    assert_eq!(out.adjusted_range.count, 1);
    assert_eq!(out.adjusted_range.interquartile_range, dec!(0.00));
}

#[test]
fn test_geographic_adjustment_across_regions() {
    let tp = tested_party(dec!(15));
    let mut comp = company("Brazil Comp", dec!(10));
    comp.region = Region::Brazil;
    let out = apply_all_adjustments(
        &tp,
        &comp,
        &[AdjustmentType::Geographic],
        &BenchmarkConfig::default(),
    )
    .unwrap();
    // India vs Brazil: -0.2857 x 0.5 - 0.0909 x 0.3 - 0.0909 x 0.2, about -18.8 points:
    // material but beyond the 10 point ceiling, so recorded and not applied
    let adj = &out.adjustments[0];
    assert!(adj.is_material);
    assert!(!adj.is_reasonable);
    assert!(!adj.applied);
    assert_eq!(out.adjusted_margin, out.original_margin);
}

// ===========================================================================
// JSON contract
// ===========================================================================

#[test]
fn test_request_from_json() {
    let json = r#"{
        "tested_party": {
            "entity": {
                "name": "Tested",
                "fiscal_year": 2023,
                "industry": "Manufacturing",
                "region": "India",
                "financials": {
                    "revenue": "1000", "cost_of_sales": "600",
                    "operating_expenses": "300", "operating_profit": "24"
                },
                "operations": { "capacity_utilization": "0.8" }
            },
            "transaction_value": "500",
            "related_party_pct": "80"
        },
        "comparables": [],
        "adjustment_types": ["WorkingCapital", "Risk"],
        "config": { "pli_type": "OP/OC", "min_comparables": 0 }
    }"#;
    let req: BenchmarkRequest = serde_json::from_str(json).unwrap();
    assert_eq!(req.config.interest_rate, dec!(0.09));
    let out = benchmark_tested_party(&req).unwrap();
    assert_eq!(out.result.analysis.tested_party_margin, dec!(8));
    assert_eq!(out.result.compliance.position, RangePosition::Above);
}

#[test]
fn test_non_numeric_value_rejected() {
    let json = r#"{"revenue": "lots", "cost_of_sales": "1", "operating_expenses": "1", "operating_profit": "1"}"#;
    let parsed: Result<FinancialProfile, BenchmarkError> =
        serde_json::from_str(json).map_err(BenchmarkError::from);
    assert!(matches!(parsed, Err(BenchmarkError::SerializationError(_))));
}

#[test]
fn test_output_serialises() {
    let out = benchmark_tested_party(&request(dec!(8))).unwrap();
    let value = serde_json::to_value(&out).unwrap();
    assert_eq!(value["result"]["compliance"]["position"], "Below");
    assert_eq!(value["result"]["analysis"]["adjusted_range"]["q1"], "12.50");
    assert_eq!(value["result"]["analysis"]["pli_type"], "OP/OC");
}
