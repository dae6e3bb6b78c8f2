use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

use super::date_key::DateKey;

pub const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

pub const WEEKDAY_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// The month currently displayed. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarCursor {
    pub year: i32,
    /// Month index 0-11 (0 = January)
    pub month: u32,
}

impl CalendarCursor {
    pub fn new(year: i32, month: u32) -> Result<Self, CoreError> {
        if month > 11 {
            return Err(CoreError::Validation(format!(
                "Month index {month} out of range (expected 0..=11)"
            )));
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month0(),
        }
    }

    /// Move by `months` (negative = backwards), carrying into the year.
    pub fn shift(self, months: i32) -> Self {
        let absolute = self.year as i64 * 12 + self.month as i64 + months as i64;
        Self {
            year: absolute.div_euclid(12) as i32,
            month: absolute.rem_euclid(12) as u32,
        }
    }

    pub fn prev(self) -> Self {
        self.shift(-1)
    }

    pub fn next(self) -> Self {
        self.shift(1)
    }

    /// Month number 1-12, as used in date keys.
    pub fn month_number(&self) -> u32 {
        self.month + 1
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month_number(), 1)
    }

    /// Number of days in this month (28-31).
    pub fn days_in_month(&self) -> u32 {
        let next = self.next();
        match (self.first_day(), next.first_day()) {
            (Some(first), Some(following)) => (following - first).num_days() as u32,
            // Only reachable at chrono's representable-date boundary.
            _ => 31,
        }
    }

    /// Weekday index of day 1 (0 = Sunday).
    pub fn leading_blanks(&self) -> u32 {
        self.first_day()
            .map(|d| d.weekday().num_days_from_sunday())
            .unwrap_or(0)
    }

    pub fn title(&self) -> String {
        format!("{} {}", MONTH_NAMES[self.month as usize], self.year)
    }
}

impl std::fmt::Display for CalendarCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month_number())
    }
}

/// What happens to the cells after the last day of the month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridLayout {
    /// Leading blanks + days; nothing after the last day.
    #[default]
    Compact,
    /// Blank cells up to the end of the last week.
    FullWeeks,
    /// Always 6 rows × 7 columns.
    SixWeeks,
}

/// One selectable day on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCell {
    pub day: u32,
    pub key: DateKey,
    pub is_today: bool,
    pub is_selected: bool,
    pub has_record: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalendarCell {
    Blank,
    Day(DayCell),
}

impl CalendarCell {
    pub fn as_day(&self) -> Option<&DayCell> {
        match self {
            CalendarCell::Day(cell) => Some(cell),
            CalendarCell::Blank => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, CalendarCell::Blank)
    }
}

/// Render description of one month. The core computes it, the front-end
/// only draws it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthGrid {
    pub cursor: CalendarCursor,
    pub layout: GridLayout,
    pub cells: Vec<CalendarCell>,
}

impl MonthGrid {
    pub fn title(&self) -> String {
        self.cursor.title()
    }

    /// Cells split into weeks. The last row may be shorter in `Compact` layout.
    pub fn rows(&self) -> impl Iterator<Item = &[CalendarCell]> {
        self.cells.chunks(7)
    }

    pub fn days(&self) -> impl Iterator<Item = &DayCell> {
        self.cells.iter().filter_map(CalendarCell::as_day)
    }

    pub fn leading_blanks(&self) -> usize {
        self.cells.iter().take_while(|c| c.is_blank()).count()
    }

    pub fn day(&self, day: u32) -> Option<&DayCell> {
        self.days().find(|c| c.day == day)
    }
}
