use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::adjustments::accounting::AccountingLineItem;
use crate::error::BenchmarkError;
use crate::BenchmarkResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%).
pub type Rate = Decimal;

/// Profit level indicator values and adjustments, in percentage points (5.25 = 5.25%).
pub type Percent = Decimal;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Profit level indicator selected for the benchmarking study.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PliType {
    /// Operating profit / operating expenses, the benchmarked margin
    #[default]
    #[serde(rename = "OP/OC")]
    OpOc,
    /// Operating profit / operating revenue
    #[serde(rename = "OP/OR")]
    OpOr,
    /// Return on capital employed (OP / capital employed)
    #[serde(rename = "ROCE", alias = "ROCE/OP/CE")]
    Roce,
    /// Gross profit / operating expenses
    #[serde(rename = "BerryRatio", alias = "Berry Ratio")]
    BerryRatio,
    /// Operating profit / total assets
    #[serde(rename = "OP/TA")]
    OpTa,
}

impl fmt::Display for PliType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PliType::OpOc => "OP/OC",
            PliType::OpOr => "OP/OR",
            PliType::Roce => "ROCE",
            PliType::BerryRatio => "Berry Ratio",
            PliType::OpTa => "OP/TA",
        };
        f.write_str(label)
    }
}

/// Economic adjustments that can be applied to a comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdjustmentType {
    WorkingCapital,
    Risk,
    CapacityUtilization,
    Geographic,
    AccountingStandards,
}

impl AdjustmentType {
    pub const ALL: [AdjustmentType; 5] = [
        AdjustmentType::WorkingCapital,
        AdjustmentType::Risk,
        AdjustmentType::CapacityUtilization,
        AdjustmentType::Geographic,
        AdjustmentType::AccountingStandards,
    ];

    /// Supporting documentation a reviewer expects when this adjustment is relied on.
    pub fn documentation_requirements(&self) -> &'static [&'static str] {
        match self {
            AdjustmentType::WorkingCapital => &[
                "Balance sheet extracts (receivables, payables, inventory) for tested party and comparables",
                "Support for the interest rate used to price working capital",
            ],
            AdjustmentType::Risk => &[
                "Functional and risk analysis (FAR) for tested party and each comparable",
                "Evidence of risk control and financial capacity to bear assumed risks",
            ],
            AdjustmentType::CapacityUtilization => &[
                "Capacity utilisation data (installed versus actual) for each party",
                "Fixed versus variable cost analysis supporting the idle-capacity computation",
            ],
            AdjustmentType::Geographic => &[
                "Location-specific cost and market data supporting regional factors",
            ],
            AdjustmentType::AccountingStandards => &[
                "Reconciliation of accounting policies between tested party and comparables",
                "Line-item workpapers for each accounting reconciliation",
            ],
        }
    }
}

impl fmt::Display for AdjustmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AdjustmentType::WorkingCapital => "Working capital",
            AdjustmentType::Risk => "Risk",
            AdjustmentType::CapacityUtilization => "Capacity utilisation",
            AdjustmentType::Geographic => "Geographic",
            AdjustmentType::AccountingStandards => "Accounting standards",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    Market,
    Inventory,
    Credit,
    ForeignExchange,
    ProductLiability,
    Warranty,
    ResearchAndDevelopment,
    BusinessContinuity,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 8] = [
        RiskCategory::Market,
        RiskCategory::Inventory,
        RiskCategory::Credit,
        RiskCategory::ForeignExchange,
        RiskCategory::ProductLiability,
        RiskCategory::Warranty,
        RiskCategory::ResearchAndDevelopment,
        RiskCategory::BusinessContinuity,
    ];
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskLevel {
    pub fn multiplier(&self) -> Decimal {
        match self {
            RiskLevel::Low => dec!(0.5),
            RiskLevel::Medium => dec!(1.0),
            RiskLevel::High => dec!(1.5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Industry {
    Manufacturing,
    InformationTechnology,
    Pharmaceuticals,
    Automotive,
    Chemicals,
    Textiles,
    Electronics,
    Distribution,
    Services,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    India,
    UnitedStates,
    UnitedKingdom,
    Germany,
    France,
    China,
    Japan,
    Singapore,
    Brazil,
    UnitedArabEmirates,
    Other(String),
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::India => f.write_str("India"),
            Region::UnitedStates => f.write_str("United States"),
            Region::UnitedKingdom => f.write_str("United Kingdom"),
            Region::Germany => f.write_str("Germany"),
            Region::France => f.write_str("France"),
            Region::China => f.write_str("China"),
            Region::Japan => f.write_str("Japan"),
            Region::Singapore => f.write_str("Singapore"),
            Region::Brazil => f.write_str("Brazil"),
            Region::UnitedArabEmirates => f.write_str("United Arab Emirates"),
            Region::Other(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountingStandard {
    #[default]
    IndAs,
    Igaap,
    Ifrs,
    UsGaap,
    Other(String),
}

// ---------------------------------------------------------------------------
// Entity records
// ---------------------------------------------------------------------------

/// Financial statement extract for one entity and one fiscal year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialProfile {
    pub revenue: Money,
    pub cost_of_sales: Money,
    #[serde(default)]
    pub gross_profit: Money,
    pub operating_expenses: Money,
    pub operating_profit: Money,
    #[serde(default)]
    pub total_assets: Money,
    #[serde(default)]
    pub current_assets: Money,
    #[serde(default)]
    pub current_liabilities: Money,
    #[serde(default)]
    pub receivables: Money,
    #[serde(default)]
    pub payables: Money,
    #[serde(default)]
    pub inventory: Money,
    #[serde(default)]
    pub fixed_assets: Money,
}

impl FinancialProfile {
    /// Operating margin on operating expenses, in percentage points.
    pub fn operating_margin(&self) -> BenchmarkResult<Percent> {
        checked_ratio(
            self.operating_profit,
            self.operating_expenses,
            dec!(100),
            "financials.operating_margin",
        )
    }

    /// Value of the requested profit level indicator, in percentage points.
    pub fn pli(&self, pli: PliType) -> BenchmarkResult<Percent> {
        let (numerator, denominator) = match pli {
            PliType::OpOc => (self.operating_profit, self.operating_expenses),
            PliType::OpOr => (self.operating_profit, self.revenue),
            PliType::Roce => (
                self.operating_profit,
                self.total_assets - self.current_liabilities,
            ),
            PliType::BerryRatio => (self.gross_profit, self.operating_expenses),
            PliType::OpTa => (self.operating_profit, self.total_assets),
        };
        if denominator <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }
        checked_ratio(numerator, denominator, dec!(100), "financials.pli")
    }

    /// Days of revenue tied up in receivables.
    pub fn receivable_days(&self) -> BenchmarkResult<Decimal> {
        checked_ratio(
            self.receivables,
            self.revenue,
            DAYS_PER_YEAR,
            "financials.receivable_days",
        )
    }

    /// Days of cost of sales financed by suppliers.
    pub fn payable_days(&self) -> BenchmarkResult<Decimal> {
        checked_ratio(
            self.payables,
            self.cost_of_sales,
            DAYS_PER_YEAR,
            "financials.payable_days",
        )
    }

    /// Days of cost of sales held as stock.
    pub fn inventory_days(&self) -> BenchmarkResult<Decimal> {
        checked_ratio(
            self.inventory,
            self.cost_of_sales,
            DAYS_PER_YEAR,
            "financials.inventory_days",
        )
    }

    pub(crate) fn validate(&self, prefix: &str) -> BenchmarkResult<()> {
        let balances = [
            ("revenue", self.revenue),
            ("cost_of_sales", self.cost_of_sales),
            ("operating_expenses", self.operating_expenses),
            ("total_assets", self.total_assets),
            ("current_assets", self.current_assets),
            ("current_liabilities", self.current_liabilities),
            ("receivables", self.receivables),
            ("payables", self.payables),
            ("inventory", self.inventory),
            ("fixed_assets", self.fixed_assets),
        ];
        for (name, value) in balances {
            if value < Decimal::ZERO {
                return Err(BenchmarkError::InvalidInput {
                    field: format!("{prefix}.financials.{name}"),
                    reason: "Must be non-negative".into(),
                });
            }
        }
        let margin = self
            .operating_margin()
            .map_err(|_| out_of_range(format!("{prefix}.financials.operating_margin")))?;
        check_magnitude(&format!("{prefix}.financials.operating_margin"), margin)
    }
}

const DAYS_PER_YEAR: Decimal = dec!(365);

/// Largest margin or PLI, in percentage points, the engine accepts.
///
/// Keeps sums and spreads over a comparable set inside `Decimal` range.
pub const MAX_PERCENT_MAGNITUDE: Percent = dec!(1000000000);

pub(crate) fn out_of_range(field: impl Into<String>) -> BenchmarkError {
    BenchmarkError::InvalidInput {
        field: field.into(),
        reason: "value out of range".into(),
    }
}

/// `numerator / denominator x scale`, zero when the denominator is zero.
pub(crate) fn checked_ratio(
    numerator: Decimal,
    denominator: Decimal,
    scale: Decimal,
    field: &str,
) -> BenchmarkResult<Decimal> {
    if denominator.is_zero() {
        return Ok(Decimal::ZERO);
    }
    numerator
        .checked_div(denominator)
        .and_then(|q| q.checked_mul(scale))
        .ok_or_else(|| out_of_range(field))
}

/// Reject a percentage whose magnitude exceeds [`MAX_PERCENT_MAGNITUDE`].
pub fn check_magnitude(field: &str, value: Percent) -> BenchmarkResult<()> {
    if value.abs() > MAX_PERCENT_MAGNITUDE {
        return Err(out_of_range(field));
    }
    Ok(())
}

/// One risk from the functional analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssumption {
    pub category: RiskCategory,
    pub assumed: bool,
    #[serde(default)]
    pub mitigated: bool,
    #[serde(default)]
    pub level: RiskLevel,
}

impl RiskAssumption {
    /// Only risks that are assumed and left unmitigated count against the holder.
    pub fn is_borne(&self) -> bool {
        self.assumed && !self.mitigated
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationalProfile {
    /// Actual capacity utilisation, 0 to 1
    pub capacity_utilization: Rate,
    #[serde(default)]
    pub risks: Vec<RiskAssumption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_in_business: Option<u32>,
}

impl OperationalProfile {
    /// The holder's entry for `category`, if it bears that risk.
    pub fn borne_risk(&self, category: RiskCategory) -> Option<&RiskAssumption> {
        self.risks
            .iter()
            .find(|r| r.category == category && r.is_borne())
    }

    pub(crate) fn validate(&self, prefix: &str) -> BenchmarkResult<()> {
        if self.capacity_utilization < Decimal::ZERO || self.capacity_utilization > Decimal::ONE {
            return Err(BenchmarkError::InvalidInput {
                field: format!("{prefix}.operations.capacity_utilization"),
                reason: "Must be between 0 and 1".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparableEntity {
    pub name: String,
    pub fiscal_year: i32,
    pub industry: Industry,
    pub region: Region,
    pub financials: FinancialProfile,
    pub operations: OperationalProfile,
    #[serde(default)]
    pub accounting_standard: AccountingStandard,
    /// Reconciling items between this entity's accounts and the tested party's policies
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accounting_items: Vec<AccountingLineItem>,
}

impl ComparableEntity {
    pub fn operating_margin(&self) -> BenchmarkResult<Percent> {
        self.financials.operating_margin()
    }

    pub(crate) fn validate(&self, prefix: &str) -> BenchmarkResult<()> {
        if self.name.trim().is_empty() {
            return Err(BenchmarkError::InvalidInput {
                field: format!("{prefix}.name"),
                reason: "Must not be empty".into(),
            });
        }
        self.financials.validate(prefix)?;
        self.operations.validate(prefix)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestedPartyData {
    pub entity: ComparableEntity,
    pub transaction_value: Money,
    /// Share of revenue from related parties, 0 to 100
    pub related_party_pct: Decimal,
}

impl TestedPartyData {
    pub(crate) fn validate(&self) -> BenchmarkResult<()> {
        self.entity.validate("tested_party")?;
        if self.transaction_value < Decimal::ZERO {
            return Err(BenchmarkError::InvalidInput {
                field: "tested_party.transaction_value".into(),
                reason: "Must be non-negative".into(),
            });
        }
        if self.related_party_pct < Decimal::ZERO || self.related_party_pct > dec!(100) {
            return Err(BenchmarkError::InvalidInput {
                field: "tested_party.related_party_pct".into(),
                reason: "Must be between 0 and 100".into(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Output envelope
// ---------------------------------------------------------------------------

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
