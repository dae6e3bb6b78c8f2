use chrono::NaiveDate;
use tracing::debug;

use crate::models::calendar::{CalendarCell, CalendarCursor, DayCell, GridLayout, MonthGrid};
use crate::models::date_key::{DateKey, DateKeyStyle};

/// Number of cells in a six-week grid.
pub const SIX_WEEK_CELLS: usize = 42;

/// Computes month layouts. Pure: the only ledger access is the
/// `has_record` membership query handed in by the caller.
pub struct CalendarService {
    style: DateKeyStyle,
    layout: GridLayout,
}

impl CalendarService {
    pub fn new(style: DateKeyStyle, layout: GridLayout) -> Self {
        Self { style, layout }
    }

    /// Build the grid for `cursor`.
    ///
    /// - leading blanks = weekday index of day 1 (0 = Sunday)
    /// - one day cell per day of the month, keyed in this service's style
    /// - trailing cells according to the layout
    pub fn build_month<F>(
        &self,
        cursor: CalendarCursor,
        today: NaiveDate,
        selected: Option<&DateKey>,
        has_record: F,
    ) -> MonthGrid
    where
        F: Fn(&DateKey) -> bool,
    {
        let leading = cursor.leading_blanks() as usize;
        let days = cursor.days_in_month();

        let mut cells = Vec::with_capacity(SIX_WEEK_CELLS);
        cells.extend(std::iter::repeat(CalendarCell::Blank).take(leading));

        for day in 1..=days {
            let Some(date) = NaiveDate::from_ymd_opt(cursor.year, cursor.month_number(), day) else {
                continue;
            };
            let key = DateKey::from_date(date, self.style);
            cells.push(CalendarCell::Day(DayCell {
                day,
                is_today: date == today,
                is_selected: selected.is_some_and(|s| *s == key),
                has_record: has_record(&key),
                key,
            }));
        }

        let target = match self.layout {
            GridLayout::Compact => cells.len(),
            GridLayout::FullWeeks => cells.len().div_ceil(7) * 7,
            GridLayout::SixWeeks => SIX_WEEK_CELLS.max(cells.len()),
        };
        cells.resize(target, CalendarCell::Blank);

        debug!(%cursor, leading, days, cells = cells.len(), "month grid built");

        MonthGrid {
            cursor,
            layout: self.layout,
            cells,
        }
    }
}

impl Default for CalendarService {
    fn default() -> Self {
        Self::new(DateKeyStyle::default(), GridLayout::default())
    }
}
