//! Year-keyed availability index.
//!
//! The document nests `year → month (0-based) → day → [user id]`, every key a
//! string. Levels are reference-counted so a toggle copies only the path it
//! touches; a reader holding an older snapshot keeps seeing the old data and
//! sibling years, months and days stay shared between snapshots.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::WINDOW_RADIUS;
use crate::day_key::DayKey;
use crate::error::{RefCalError, RefCalResult};

/// Day of month → user ids available that day.
pub type MonthMap = BTreeMap<String, Arc<Vec<String>>>;
/// Month (0-based) → days.
pub type YearMap = BTreeMap<String, Arc<MonthMap>>;
/// Year → months.
pub type CalendarMap = BTreeMap<String, Arc<YearMap>>;

/// Whether a user can officiate on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    Available,
    #[default]
    Unavailable,
}

impl AvailabilityStatus {
    pub fn from_membership(available: bool) -> Self {
        if available {
            AvailabilityStatus::Available
        } else {
            AvailabilityStatus::Unavailable
        }
    }

    /// The status a click on a day currently showing `self` asks for.
    pub fn opposite(self) -> Self {
        match self {
            AvailabilityStatus::Available => AvailabilityStatus::Unavailable,
            AvailabilityStatus::Unavailable => AvailabilityStatus::Available,
        }
    }
}

/// Persisted as `{ "calendar": { year: { month0: { day: [id, ...] } } } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityIndex {
    #[serde(default)]
    calendar: Arc<CalendarMap>,
}

impl AvailabilityIndex {
    /// Build an index from flat per-day rosters.
    pub fn from_rosters<I, U>(rosters: I) -> Self
    where
        I: IntoIterator<Item = (DayKey, U)>,
        U: IntoIterator<Item = String>,
    {
        let mut index = AvailabilityIndex::default();
        for (key, ids) in rosters {
            let roster = index.roster_mut(key);
            for id in ids {
                if !roster.contains(&id) {
                    roster.push(id);
                }
            }
        }
        index
    }

    pub fn calendar(&self) -> &CalendarMap {
        &self.calendar
    }

    pub fn is_empty(&self) -> bool {
        self.calendar.is_empty()
    }

    /// Every day path in the document as `(key, roster)`, chronological.
    /// Fails on the first path that does not name a real calendar day.
    pub fn rosters(&self) -> RefCalResult<Vec<(DayKey, &[String])>> {
        let mut out = Vec::new();
        for (year, months) in self.calendar.iter() {
            for (month0, days) in months.iter() {
                for (day, ids) in days.iter() {
                    let key = DayKey::from_path(year, month0, day).ok_or_else(|| {
                        RefCalError::Storage(format!(
                            "invalid availability path {year}/{month0}/{day}"
                        ))
                    })?;
                    out.push((key, ids.as_slice()));
                }
            }
        }
        out.sort_by_key(|(key, _)| *key);
        Ok(out)
    }

    /// User ids recorded for `key`. Missing paths read as empty.
    pub fn roster(&self, key: DayKey) -> &[String] {
        let (year, month0, day) = key.path();
        self.calendar
            .get(&year)
            .and_then(|months| months.get(&month0))
            .and_then(|days| days.get(&day))
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    /// Submap for `year - 1 ..= year + 1`, sharing data with `self`.
    pub fn get_year(&self, year: i32) -> AvailabilityIndex {
        let window = window_years(year);
        let calendar = self
            .calendar
            .iter()
            .filter(|(y, _)| y.parse::<i32>().is_ok_and(|y| window.contains(&y)))
            .map(|(y, months)| (y.clone(), Arc::clone(months)))
            .collect();

        AvailabilityIndex {
            calendar: Arc::new(calendar),
        }
    }

    /// Whether `user_id` is available on `date`. Never fails: an unparsable
    /// date or a missing path both read as unavailable.
    pub fn is_available(&self, date: &str, user_id: &str) -> bool {
        match DayKey::parse(date) {
            Ok(key) => self.is_available_on(key, user_id),
            Err(e) => {
                debug!("membership test on bad date: {e}");
                false
            }
        }
    }

    pub fn is_available_on(&self, key: DayKey, user_id: &str) -> bool {
        self.roster(key).iter().any(|id| id == user_id)
    }

    pub fn status_on(&self, key: DayKey, user_id: &str) -> AvailabilityStatus {
        AvailabilityStatus::from_membership(self.is_available_on(key, user_id))
    }

    /// Set `user_id`'s status on `date`, returning the new index.
    pub fn toggle(
        &self,
        date: &str,
        user_id: &str,
        desired: AvailabilityStatus,
    ) -> RefCalResult<AvailabilityIndex> {
        let key = DayKey::parse(date)?;
        Ok(self.toggle_day(key, user_id, desired))
    }

    /// Set `user_id`'s status on `key`, returning the new index.
    ///
    /// Membership is a set: marking an available user available again, or an
    /// absent user unavailable, returns an index equal to `self` without
    /// creating any path. Removing the last id leaves an empty list in place.
    pub fn toggle_day(
        &self,
        key: DayKey,
        user_id: &str,
        desired: AvailabilityStatus,
    ) -> AvailabilityIndex {
        if self.status_on(key, user_id) == desired {
            return self.clone();
        }

        let mut next = self.clone();
        let roster = next.roster_mut(key);
        match desired {
            AvailabilityStatus::Available => roster.push(user_id.to_string()),
            AvailabilityStatus::Unavailable => roster.retain(|id| id != user_id),
        }
        next
    }

    /// Mutable roster for `key`, creating missing levels. Any level still
    /// shared with another snapshot is cloned first.
    fn roster_mut(&mut self, key: DayKey) -> &mut Vec<String> {
        let (year, month0, day) = key.path();
        let calendar = Arc::make_mut(&mut self.calendar);
        let months = Arc::make_mut(calendar.entry(year).or_default());
        let days = Arc::make_mut(months.entry(month0).or_default());
        Arc::make_mut(days.entry(day).or_default())
    }
}

pub(crate) fn window_years(year: i32) -> RangeInclusive<i32> {
    year.saturating_sub(WINDOW_RADIUS)..=year.saturating_add(WINDOW_RADIUS)
}
