//! Month grid builder.
//!
//! A month view is always six weeks of seven days, Sunday first. Days from
//! the previous and next month fill the cells around the current month.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::constants::GRID_CELLS;
use crate::day_key::DayKey;
use crate::error::{RefCalError, RefCalResult};
use crate::index::AvailabilityIndex;

/// One cell of a month grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    /// Serialized as local midnight, e.g. `2023-03-15T00:00:00`
    #[serde(with = "midnight")]
    pub date: NaiveDate,
    pub day_of_month: u32,
    pub is_current_month: bool,
}

impl CalendarDay {
    fn new(date: NaiveDate, is_current_month: bool) -> Self {
        CalendarDay {
            date,
            day_of_month: date.day(),
            is_current_month,
        }
    }

    pub fn key(&self) -> DayKey {
        DayKey::from_date(self.date)
    }
}

/// A grid cell with the viewing user's availability attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedDay {
    #[serde(flatten)]
    pub day: CalendarDay,
    pub available: bool,
}

/// The 42 cells for one (year, month), month 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
}

impl MonthGrid {
    pub fn new(year: i32, month: u32) -> RefCalResult<Self> {
        Ok(MonthGrid {
            year,
            month,
            days: month_cells(year, month)?,
        })
    }

    /// Mark each cell with whether `user_id` is available that day.
    pub fn annotate(&self, index: &AvailabilityIndex, user_id: &str) -> Vec<AnnotatedDay> {
        self.days
            .iter()
            .map(|day| AnnotatedDay {
                available: index.is_available_on(day.key(), user_id),
                day: day.clone(),
            })
            .collect()
    }
}

/// Build the 42-cell grid for `month` (1-based) of `year`.
///
/// # Panics
///
/// Panics if `month` is outside 1-12. Use [`MonthGrid::new`] for input that
/// has not been validated.
pub fn build_month_grid(year: i32, month: u32) -> Vec<CalendarDay> {
    month_cells(year, month)
        .unwrap_or_else(|e| panic!("build_month_grid({year}, {month}): {e}"))
}

/// Number of days in `month` (1-based) of `year`.
///
/// # Panics
///
/// Panics if `month` is outside 1-12.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if NaiveDate::from_ymd_opt(year, 2, 29).is_some() => 29,
        2 => 28,
        _ => panic!("month {month} is outside 1-12"),
    }
}

fn month_cells(year: i32, month: u32) -> RefCalResult<Vec<CalendarDay>> {
    if !(1..=12).contains(&month) {
        return Err(RefCalError::InvalidMonth(month));
    }
    let out_of_range = || RefCalError::InvalidDate(format!("{year:04}-{month:02}"));

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(out_of_range)?;
    let month_len = days_in_month(year, month);
    let leading_count = first.weekday().num_days_from_sunday();
    let trailing_count = GRID_CELLS as u32 - leading_count - month_len;

    // Last day of the previous month; handles the January → December rollover.
    let prev_last = first.pred_opt().ok_or_else(out_of_range)?;
    // First day of the next month; handles the December → January rollover.
    let next_first = first
        .checked_add_days(chrono::Days::new(u64::from(month_len)))
        .ok_or_else(out_of_range)?;

    let mut days = Vec::with_capacity(GRID_CELLS);

    for n in (prev_last.day() - leading_count + 1)..=prev_last.day() {
        let date = prev_last.with_day(n).ok_or_else(out_of_range)?;
        days.push(CalendarDay::new(date, false));
    }
    for n in 1..=month_len {
        let date = first.with_day(n).ok_or_else(out_of_range)?;
        days.push(CalendarDay::new(date, true));
    }
    for n in 1..=trailing_count {
        let date = next_first.with_day(n).ok_or_else(out_of_range)?;
        days.push(CalendarDay::new(date, false));
    }

    Ok(days)
}

mod midnight {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::constants::MIDNIGHT_FORMAT;
    use crate::day_key::DayKey;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(MIDNIGHT_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let s = String::deserialize(deserializer)?;
        DayKey::parse(&s)
            .map(|key| key.date())
            .map_err(serde::de::Error::custom)
    }
}
