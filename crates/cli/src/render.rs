use daybook_core::models::analysis::StressAnalysis;
use daybook_core::models::calendar::{CalendarCell, MonthGrid, WEEKDAY_NAMES};
use daybook_core::models::post::{PostFeed, EMPTY_FEED_MESSAGE};
use daybook_core::models::rate::{format_decimal, CurrencyCode, RatePoint};
use daybook_core::models::summary::{format_thousands, DashboardSummary, DayDetail};
use std::fmt::Write;

const BAR_WIDTH: usize = 20;

/// Month grid as text. `*` marks a day with records, `[..]` the selection,
/// `(..)` today.
pub fn calendar(grid: &MonthGrid) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:^35}", grid.title());
    let header: String = WEEKDAY_NAMES.iter().map(|d| format!("{d:^5}")).collect();
    let _ = writeln!(out, "{}", header.trim_end());

    for row in grid.rows() {
        let line: String = row
            .iter()
            .map(|cell| match cell {
                CalendarCell::Blank => "     ".to_string(),
                CalendarCell::Day(day) => {
                    let mark = if day.has_record { '*' } else { ' ' };
                    let (open, close) = if day.is_selected {
                        ('[', ']')
                    } else if day.is_today {
                        ('(', ')')
                    } else {
                        (' ', ' ')
                    };
                    format!("{open}{:>2}{close}{mark}", day.day)
                }
            })
            .collect();
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

fn bar(pct: f64) -> String {
    let filled = ((pct.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn signed(value: i64) -> String {
    let abs = format_thousands(value.unsigned_abs());
    if value < 0 {
        format!("-{abs}")
    } else {
        abs
    }
}

pub fn summary(summary: &DashboardSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Income     {:>14}", format_thousands(summary.total_income));
    let _ = writeln!(out, "Expense    {:>14}", format_thousands(summary.total_expense));
    let _ = writeln!(out, "Remaining  {:>14}", signed(summary.remaining));
    let _ = writeln!(
        out,
        "           [{}] {}%",
        bar(summary.progress_width_pct()),
        summary.remaining_pct_rounded()
    );

    if summary.categories.is_empty() {
        let _ = writeln!(out, "\nNo expenses yet.");
    } else {
        let _ = writeln!(out, "\nExpenses by category");
        for share in &summary.categories {
            let _ = writeln!(
                out,
                "  {:<16} {:>12} {:>6.1}%  {}",
                share.label,
                format_thousands(share.amount),
                share.percentage,
                share.color
            );
        }
    }
    let _ = writeln!(out, "\nDonut: {}", summary.donut.to_css());
    out
}

pub fn day_detail(detail: &DayDetail) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", detail.key);
    if let Some(message) = detail.empty_message() {
        let _ = writeln!(out, "  {message}");
        return out;
    }
    for entry in &detail.entries {
        let _ = writeln!(
            out,
            "  {:<16} {:>14}  {}",
            entry.label,
            entry.signed_amount(),
            entry.color
        );
    }
    out
}

pub fn history(from: &CurrencyCode, to: &CurrencyCode, points: &[RatePoint]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{from} → {to}, {} points", points.len());
    let digits = if to.is_crypto() { 8 } else { 4 };
    for p in points {
        let _ = writeln!(out, "  {}  {}", p.date, format_decimal(p.rate, digits));
    }
    out
}

pub fn posts(feed: &PostFeed) -> String {
    if feed.is_empty() {
        return format!("{EMPTY_FEED_MESSAGE}\n");
    }
    let mut out = String::new();
    for post in feed.posts() {
        let _ = writeln!(
            out,
            "{} · {}",
            post.nickname,
            post.timestamp.format("%Y-%m-%d %H:%M")
        );
        for line in post.plain_text().lines() {
            let _ = writeln!(out, "  {line}");
        }
        out.push('\n');
    }
    out
}

pub fn analysis(result: &StressAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n", result.advice.trim());
    for (tag, pct) in result.shares() {
        let _ = writeln!(out, "  {tag:<10} [{}] {pct:.0}%", bar(pct));
    }
    out
}
