//! Expense summary aggregation
//!
//! Pure computation over an already-fetched scoped record set: scalar
//! statistics plus category, month and (admin only) user breakdowns.

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::models::{ExpenseRecord, RoleName};

/// Sum, count, average and extrema over a scoped set
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarTotals {
    pub total_amount: Decimal,
    pub total_count: i64,
    pub average_amount: Decimal,
    pub max_amount: Decimal,
    pub min_amount: Decimal,
}

impl ScalarTotals {
    /// Assemble from store aggregates; NULL aggregates (empty set) become zero
    pub fn from_parts(
        sum: Option<Decimal>,
        count: i64,
        max: Option<Decimal>,
        min: Option<Decimal>,
    ) -> Self {
        let total_amount = sum.unwrap_or(Decimal::ZERO);
        let average_amount = if count > 0 {
            total_amount
                .checked_div(Decimal::from(count))
                .unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        };
        Self {
            total_amount,
            total_count: count,
            average_amount,
            max_amount: max.unwrap_or(Decimal::ZERO),
            min_amount: min.unwrap_or(Decimal::ZERO),
        }
    }

    /// Compute the same statistics directly from records
    pub fn from_records(records: &[ExpenseRecord]) -> Self {
        let amounts = records.iter().map(|r| r.amount);
        Self::from_parts(
            (!records.is_empty()).then(|| amounts.clone().sum()),
            records.len() as i64,
            amounts.clone().max(),
            amounts.min(),
        )
    }
}

/// Per-category share of spending
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub category_name: String,
    pub total_amount: Decimal,
    pub count: i64,
    pub percentage: f64,
}

/// Per-month spending ("YYYY-MM")
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub month: String,
    pub total_amount: Decimal,
    pub count: i64,
}

/// Per-user share of spending (admin summaries only)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_name: String,
    pub user_email: String,
    pub total_amount: Decimal,
    pub count: i64,
    pub percentage: f64,
}

/// Full summary for one caller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    pub total_amount: Decimal,
    pub total_count: i64,
    pub average_amount: Decimal,
    pub max_amount: Decimal,
    pub min_amount: Decimal,
    pub category_breakdown: Vec<CategorySummary>,
    pub monthly_breakdown: Vec<MonthlySummary>,
    /// `None` for non-administrative callers, not an empty list
    pub user_breakdown: Option<Vec<UserSummary>>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Bucket {
    total: Decimal,
    count: i64,
}

impl Bucket {
    fn add(&mut self, amount: Decimal) {
        self.total += amount;
        self.count += 1;
    }
}

/// Share of `part` in `total` as a percentage.
///
/// The ratio is rounded half-up to 4 decimal places first and only then
/// scaled by 100. Zero when `total` is not positive.
pub fn percentage_of(part: Decimal, total: Decimal) -> f64 {
    if total <= Decimal::ZERO {
        return 0.0;
    }
    part.checked_div(total)
        .map(|ratio| ratio.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero))
        .map(|ratio| ratio * Decimal::ONE_HUNDRED)
        .and_then(|pct| pct.to_f64())
        .unwrap_or(0.0)
}

/// Group by category name, largest total first
pub fn category_breakdown(records: &[ExpenseRecord], grand_total: Decimal) -> Vec<CategorySummary> {
    let mut groups: BTreeMap<&str, Bucket> = BTreeMap::new();
    for record in records {
        groups.entry(record.category_label()).or_default().add(record.amount);
    }

    let mut breakdown: Vec<CategorySummary> = groups
        .into_iter()
        .map(|(name, bucket)| CategorySummary {
            category_name: name.to_string(),
            total_amount: bucket.total,
            count: bucket.count,
            percentage: percentage_of(bucket.total, grand_total),
        })
        .collect();
    // Stable: equal totals stay in name order
    breakdown.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));
    breakdown
}

/// Group by expense month, most recent month first
pub fn monthly_breakdown(records: &[ExpenseRecord]) -> Vec<MonthlySummary> {
    let mut groups: BTreeMap<String, Bucket> = BTreeMap::new();
    for record in records {
        let month = record.expense_date.format("%Y-%m").to_string();
        groups.entry(month).or_default().add(record.amount);
    }

    groups
        .into_iter()
        .rev()
        .map(|(month, bucket)| MonthlySummary {
            month,
            total_amount: bucket.total,
            count: bucket.count,
        })
        .collect()
}

/// Group by owning user, largest total first
pub fn user_breakdown(records: &[ExpenseRecord], grand_total: Decimal) -> Vec<UserSummary> {
    let mut groups: BTreeMap<i64, (&str, &str, Bucket)> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.user_id)
            .or_insert((record.user_name.as_str(), record.user_email.as_str(), Bucket::default()))
            .2
            .add(record.amount);
    }

    let mut breakdown: Vec<UserSummary> = groups
        .into_values()
        .map(|(name, email, bucket)| UserSummary {
            user_name: name.to_string(),
            user_email: email.to_string(),
            total_amount: bucket.total,
            count: bucket.count,
            percentage: percentage_of(bucket.total, grand_total),
        })
        .collect();
    breakdown.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));
    breakdown
}

/// Build the summary for a caller's role from its scoped totals and records.
///
/// `records` must be the full scoped set (every user's expenses for an
/// admin), never a page window.
pub fn summarize(role: RoleName, totals: ScalarTotals, records: &[ExpenseRecord]) -> ExpenseSummary {
    let category_breakdown = category_breakdown(records, totals.total_amount);
    let monthly_breakdown = monthly_breakdown(records);
    let user_breakdown = role
        .is_admin()
        .then(|| user_breakdown(records, totals.total_amount));

    ExpenseSummary {
        total_amount: totals.total_amount,
        total_count: totals.total_count,
        average_amount: totals.average_amount,
        max_amount: totals.max_amount,
        min_amount: totals.min_amount,
        category_breakdown,
        monthly_breakdown,
        user_breakdown,
    }
}
