use serde::{Deserialize, Serialize};

use crate::statistics::round2;
use crate::types::{out_of_range, Money};
use crate::BenchmarkResult;

/// One reconciling item between the tested party's and a comparable's accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountingLineItem {
    pub description: String,
    pub tested_party_value: Money,
    pub comparable_value: Money,
    /// Comparable value restated on the tested party's policy; the
    /// comparable value is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_value: Option<Money>,
}

impl AccountingLineItem {
    /// Restated less reported comparable value; `None` on overflow.
    pub fn adjustment(&self) -> Option<Money> {
        self.adjusted_value
            .unwrap_or(self.comparable_value)
            .checked_sub(self.comparable_value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledItem {
    pub description: String,
    pub tested_party_value: Money,
    pub comparable_value: Money,
    pub adjusted_value: Money,
    pub adjustment: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountingReconciliation {
    pub items: Vec<ReconciledItem>,
    /// Sum of (adjusted - comparable), in currency units
    pub net_adjustment: Money,
    pub methodology: String,
}

/// Net the line-item restatements of a comparable's accounts.
pub fn reconcile_accounting(
    items: &[AccountingLineItem],
) -> BenchmarkResult<AccountingReconciliation> {
    let reconciled: Vec<ReconciledItem> = items
        .iter()
        .enumerate()
        .map(|(i, item)| -> BenchmarkResult<ReconciledItem> {
            Ok(ReconciledItem {
                description: item.description.clone(),
                tested_party_value: item.tested_party_value,
                comparable_value: item.comparable_value,
                adjusted_value: item.adjusted_value.unwrap_or(item.comparable_value),
                adjustment: item
                    .adjustment()
                    .ok_or_else(|| out_of_range(format!("accounting_items[{i}]")))?,
            })
        })
        .collect::<BenchmarkResult<Vec<_>>>()?;

    let net_adjustment: Money = reconciled
        .iter()
        .try_fold(Money::ZERO, |acc, r| acc.checked_add(r.adjustment))
        .ok_or_else(|| out_of_range("accounting_items"))?;

    let methodology = if reconciled.is_empty() {
        "Accounting reconciliation: no reconciling items supplied; no adjustment.".to_string()
    } else {
        let restated = reconciled
            .iter()
            .filter(|r| !r.adjustment.is_zero())
            .count();
        format!(
            "Accounting reconciliation over {} line items ({} restated): net adjustment {}.",
            reconciled.len(),
            restated,
            round2(net_adjustment),
        )
    };

    Ok(AccountingReconciliation {
        items: reconciled,
        net_adjustment,
        methodology,
    })
}
