use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use super::category::Category;
use super::date_key::DateKey;
use super::transaction::TransactionKind;

/// Shown in place of an empty day detail.
pub const EMPTY_DAY_MESSAGE: &str = "No records for this date.";

/// Raw totals, either computed locally or returned by the backend's
/// `GET summary` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryTotals {
    #[serde(default, alias = "total_income", deserialize_with = "null_as_default")]
    pub total_income: u64,

    #[serde(default, alias = "total_expense", deserialize_with = "null_as_default")]
    pub total_expense: u64,

    /// Expense amount per category key
    #[serde(default, alias = "expense_by_category", deserialize_with = "null_as_default")]
    pub expense_by_category: BTreeMap<Category, u64>,
}

/// Read `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Everything the dashboard needs, fully computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_income: u64,

    pub total_expense: u64,

    /// total_income - total_expense (may be negative)
    pub remaining: i64,

    /// remaining / total_income × 100, or 0 when there is no income.
    /// May be negative; use `progress_width_pct` for bar widths.
    pub remaining_pct: f64,

    pub expense_by_category: BTreeMap<Category, u64>,

    /// Legend entries, largest amount first
    pub categories: Vec<CategoryShare>,

    pub donut: DonutChart,
}

impl DashboardSummary {
    /// Remaining percentage clamped to 0..=100 for a progress bar.
    pub fn progress_width_pct(&self) -> f64 {
        self.remaining_pct.clamp(0.0, 100.0)
    }

    /// Remaining percentage rounded to a whole number for the label.
    pub fn remaining_pct_rounded(&self) -> i64 {
        self.remaining_pct.round() as i64
    }
}

/// One legend row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: Category,
    pub label: String,
    pub color: String,
    pub amount: u64,
    /// amount / total_expense × 100
    pub percentage: f64,
}

/// One slice of the donut, as cumulative percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonutSegment {
    pub color: String,
    pub start_pct: f64,
    pub end_pct: f64,
}

/// Donut chart description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DonutChart {
    /// No expenses: draw the neutral placeholder ring.
    Placeholder,
    Segments(Vec<DonutSegment>),
}

impl DonutChart {
    pub fn segments(&self) -> &[DonutSegment] {
        match self {
            DonutChart::Placeholder => &[],
            DonutChart::Segments(segments) => segments,
        }
    }

    /// CSS background value for the chart element.
    pub fn to_css(&self) -> String {
        match self {
            DonutChart::Placeholder => "var(--subtle-border-color)".to_string(),
            DonutChart::Segments(segments) => {
                let stops: Vec<String> = segments
                    .iter()
                    .map(|s| format!("{} {}% {}%", s.color, trim_pct(s.start_pct), trim_pct(s.end_pct)))
                    .collect();
                format!("conic-gradient({})", stops.join(", "))
            }
        }
    }
}

fn trim_pct(value: f64) -> String {
    let s = format!("{value:.4}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// One row in the per-date detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayEntry {
    pub id: i64,
    pub kind: TransactionKind,
    pub label: String,
    pub color: String,
    pub amount: u64,
}

impl DayEntry {
    /// `+1,500` / `-200,000`
    pub fn signed_amount(&self) -> String {
        format!("{}{}", self.kind.sign(), format_thousands(self.amount))
    }
}

/// Detail panel for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayDetail {
    pub key: DateKey,
    pub entries: Vec<DayEntry>,
}

impl DayDetail {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The fixed empty-state message when there is nothing to list.
    pub fn empty_message(&self) -> Option<&'static str> {
        self.is_empty().then_some(EMPTY_DAY_MESSAGE)
    }
}

/// `1234567` → `"1,234,567"`
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
