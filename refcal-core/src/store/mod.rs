//! Availability persistence.
//!
//! Stores keep availability flat, one roster per calendar day, and apply each
//! toggle as a single keyed update under the store's lock. Concurrent toggles
//! on different days or by different users therefore never overwrite each
//! other. The nested `AvailabilityIndex` is only built for reads.

mod file;
mod memory;

use std::collections::BTreeMap;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::day_key::DayKey;
use crate::error::RefCalResult;
use crate::index::{AvailabilityIndex, AvailabilityStatus, window_years};

/// Flat availability: composite day key → user ids in the order they were
/// marked available. An id appears at most once per day.
pub type Rosters = BTreeMap<DayKey, Vec<String>>;

/// Outcome of a single `set_status` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayChange {
    /// False when the user already had the requested status
    pub changed: bool,
    /// The day's roster after the call
    pub roster: Vec<String>,
}

pub trait AvailabilityStore: Send + Sync {
    /// The whole document.
    fn snapshot(&self) -> RefCalResult<AvailabilityIndex>;

    /// Years `year - 1 ..= year + 1` of the document.
    fn window(&self, year: i32) -> RefCalResult<AvailabilityIndex>;

    /// User ids available on `key`.
    fn roster(&self, key: DayKey) -> RefCalResult<Vec<String>>;

    /// Atomically add or remove `user_id` on `key`.
    fn set_status(
        &self,
        key: DayKey,
        user_id: &str,
        status: AvailabilityStatus,
    ) -> RefCalResult<DayChange>;
}

/// Apply one toggle to the flat map. Returns true if the map changed.
///
/// Marking available appends to the day's entry, creating it; marking
/// unavailable never creates one, and an emptied entry is kept.
pub(crate) fn apply(
    rosters: &mut Rosters,
    key: DayKey,
    user_id: &str,
    status: AvailabilityStatus,
) -> bool {
    match status {
        AvailabilityStatus::Available => {
            let ids = rosters.entry(key).or_default();
            if ids.iter().any(|id| id == user_id) {
                return false;
            }
            ids.push(user_id.to_string());
            true
        }
        AvailabilityStatus::Unavailable => rosters.get_mut(&key).is_some_and(|ids| {
            let before = ids.len();
            ids.retain(|id| id != user_id);
            ids.len() != before
        }),
    }
}

/// Flatten a document into rosters. Fails on paths that are not calendar
/// days so they are never silently dropped on the next save.
pub(crate) fn from_index(index: &AvailabilityIndex) -> RefCalResult<Rosters> {
    Ok(index
        .rosters()?
        .into_iter()
        .map(|(key, ids)| {
            let mut roster: Vec<String> = Vec::with_capacity(ids.len());
            for id in ids {
                if !roster.contains(id) {
                    roster.push(id.clone());
                }
            }
            (key, roster)
        })
        .collect())
}

pub(crate) fn to_index<'a, I>(entries: I) -> AvailabilityIndex
where
    I: Iterator<Item = (&'a DayKey, &'a Vec<String>)>,
{
    AvailabilityIndex::from_rosters(entries.map(|(key, ids)| (*key, ids.iter().cloned())))
}

pub(crate) fn window_of(rosters: &Rosters, year: i32) -> AvailabilityIndex {
    let years = window_years(year);
    to_index(rosters.iter().filter(|(key, _)| years.contains(&key.year())))
}

pub(crate) fn roster_of(rosters: &Rosters, key: DayKey) -> Vec<String> {
    rosters
        .get(&key)
        .cloned()
        .unwrap_or_default()
}
