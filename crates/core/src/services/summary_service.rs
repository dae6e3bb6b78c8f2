use std::collections::BTreeMap;
use tracing::debug;

use crate::models::category::Category;
use crate::models::date_key::DateKey;
use crate::models::summary::{
    CategoryShare, DashboardSummary, DayDetail, DayEntry, DonutChart, DonutSegment, SummaryTotals,
};
use crate::models::transaction::{Transaction, TransactionLedger};

/// Derives dashboard totals, the category legend and the donut chart.
///
/// Works on the local ledger or on totals already computed by a backend;
/// both paths end in [`SummaryService::summarize_totals`] so they render
/// identically.
pub struct SummaryService;

impl SummaryService {
    pub fn new() -> Self {
        Self
    }

    /// Sum incomes, expenses and per-category expenses of the ledger.
    pub fn totals(&self, ledger: &TransactionLedger) -> SummaryTotals {
        let total_income = saturating_total(&ledger.incomes);
        let total_expense = saturating_total(&ledger.expenses);

        let mut expense_by_category: BTreeMap<Category, u64> = BTreeMap::new();
        for tx in &ledger.expenses {
            let entry = expense_by_category.entry(tx.category.clone()).or_insert(0);
            *entry = entry.saturating_add(tx.amount);
        }

        SummaryTotals {
            total_income,
            total_expense,
            expense_by_category,
        }
    }

    pub fn summarize(&self, ledger: &TransactionLedger) -> DashboardSummary {
        self.summarize_totals(self.totals(ledger))
    }

    /// Compute remaining money, legend shares and donut segments.
    ///
    /// Categories are ordered by descending amount; equal amounts fall back
    /// to ascending category key so the order never depends on map or sort
    /// internals.
    pub fn summarize_totals(&self, totals: SummaryTotals) -> DashboardSummary {
        let SummaryTotals {
            total_income,
            total_expense,
            expense_by_category,
        } = totals;

        let difference = i128::from(total_income) - i128::from(total_expense);
        let remaining = i64::try_from(difference)
            .unwrap_or(if difference < 0 { i64::MIN } else { i64::MAX });
        let remaining_pct = if total_income > 0 {
            (difference as f64 / total_income as f64) * 100.0
        } else {
            0.0
        };

        let mut ordered: Vec<(&Category, u64)> = expense_by_category
            .iter()
            .filter(|(_, amount)| **amount > 0)
            .map(|(c, a)| (c, *a))
            .collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.key().cmp(b.0.key())));

        let categories: Vec<CategoryShare> = if total_expense > 0 {
            ordered
                .iter()
                .map(|(category, amount)| {
                    let info = category.info();
                    CategoryShare {
                        category: (*category).clone(),
                        label: info.name,
                        color: info.color,
                        amount: *amount,
                        percentage: (*amount as f64 / total_expense as f64) * 100.0,
                    }
                })
                .collect()
        } else {
            Vec::new()
        };

        let donut = Self::donut(&categories);

        debug!(
            total_income,
            total_expense,
            remaining,
            categories = categories.len(),
            "dashboard summary computed"
        );

        DashboardSummary {
            total_income,
            total_expense,
            remaining,
            remaining_pct,
            expense_by_category,
            categories,
            donut,
        }
    }

    /// Cumulative (start, end) percentages in legend order, or the placeholder.
    fn donut(categories: &[CategoryShare]) -> DonutChart {
        if categories.is_empty() {
            return DonutChart::Placeholder;
        }
        let mut cumulative = 0.0;
        let mut segments = Vec::with_capacity(categories.len());
        for share in categories {
            let start = cumulative;
            cumulative += share.percentage;
            segments.push(DonutSegment {
                color: share.color.clone(),
                start_pct: start,
                end_pct: cumulative,
            });
        }
        // Absorb floating-point drift so the ring closes exactly.
        if let Some(last) = segments.last_mut() {
            last.end_pct = 100.0;
        }
        DonutChart::Segments(segments)
    }

    /// Detail rows for one date, ordered by id (creation order).
    pub fn day_detail(&self, ledger: &TransactionLedger, key: &DateKey) -> DayDetail {
        self.detail_from(key, ledger.for_date(key).into_iter())
    }

    /// Detail rows from an already-filtered list (e.g. a backend response).
    pub fn detail_from<'a, I>(&self, key: &DateKey, transactions: I) -> DayDetail
    where
        I: Iterator<Item = &'a Transaction>,
    {
        let entries = transactions
            .map(|tx| DayEntry {
                id: tx.id,
                kind: tx.kind,
                label: tx.label(),
                color: tx.category.color(),
                amount: tx.amount,
            })
            .collect();
        DayDetail { key: *key, entries }
    }
}

/// Sum of amounts, pinned at `u64::MAX` instead of overflowing.
fn saturating_total(transactions: &[Transaction]) -> u64 {
    transactions
        .iter()
        .fold(0u64, |total, t| total.saturating_add(t.amount))
}

impl Default for SummaryService {
    fn default() -> Self {
        Self::new()
    }
}
