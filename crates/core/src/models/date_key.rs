use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use crate::errors::CoreError;

/// How a [`DateKey`] is spelled when written out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateKeyStyle {
    /// `YYYY-M-D`, e.g. `2024-2-5` (calendar memo widget)
    Compact,
    /// `YYYY-MM-DD`, e.g. `2024-02-05` (dashboard widget, backend)
    #[default]
    Padded,
}

/// Canonical identifier of one calendar day, used as the ledger key.
///
/// **Equality, ordering and hashing** use the calendar date only, NOT the
/// spelling. `2024-2-5` and `2024-02-05` address the same entry, so stores
/// written by either widget variant can be read by the other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey {
    date: NaiveDate,
    style: DateKeyStyle,
}

impl DateKey {
    /// Build a key from a (year, month 1-12, day) triple.
    pub fn new(year: i32, month: u32, day: u32, style: DateKeyStyle) -> Result<Self, CoreError> {
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            CoreError::InvalidDateKey(format!("{year}-{month}-{day} is not a calendar day"))
        })?;
        Ok(Self { date, style })
    }

    pub fn from_date(date: NaiveDate, style: DateKeyStyle) -> Self {
        Self { date, style }
    }

    /// Parse either spelling. The style is inferred from the month/day
    /// digits: any zero-padded component means `Padded`.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let trimmed = input.trim();
        let invalid = || CoreError::InvalidDateKey(format!("'{input}' is not YYYY-M-D or YYYY-MM-DD"));

        let mut parts = trimmed.splitn(3, '-');
        let (y, m, d) = match (parts.next(), parts.next(), parts.next()) {
            (Some(y), Some(m), Some(d)) => (y, m, d),
            _ => return Err(invalid()),
        };

        let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
        if !all_digits(y) || !all_digits(m) || !all_digits(d) || m.len() > 2 || d.len() > 2 {
            return Err(invalid());
        }

        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        let day: u32 = d.parse().map_err(|_| invalid())?;

        let style = if m.len() == 2 || d.len() == 2 {
            DateKeyStyle::Padded
        } else {
            DateKeyStyle::Compact
        };

        Self::new(year, month, day, style)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn style(&self) -> DateKeyStyle {
        self.style
    }

    /// The same day spelled in another style.
    pub fn with_style(self, style: DateKeyStyle) -> Self {
        Self { style, ..self }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Month number 1-12.
    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }
}

impl std::fmt::Display for DateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.style {
            DateKeyStyle::Compact => write!(f, "{}-{}-{}", self.year(), self.month(), self.day()),
            DateKeyStyle::Padded => write!(f, "{}-{:02}-{:02}", self.year(), self.month(), self.day()),
        }
    }
}

impl std::str::FromStr for DateKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DateKey {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.to_string()
    }
}

impl PartialEq for DateKey {
    fn eq(&self, other: &Self) -> bool {
        self.date == other.date
    }
}

impl Eq for DateKey {}

impl Hash for DateKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.date.hash(state);
    }
}

impl PartialOrd for DateKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DateKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date.cmp(&other.date)
    }
}
