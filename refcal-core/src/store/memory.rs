//! In-process availability store.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::info;

use super::{
    AvailabilityStore, DayChange, Rosters, apply, from_index, roster_of, to_index, window_of,
};
use crate::day_key::DayKey;
use crate::error::{RefCalError, RefCalResult};
use crate::index::{AvailabilityIndex, AvailabilityStatus};

#[derive(Default)]
pub struct MemoryStore {
    rosters: RwLock<Rosters>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from an existing document.
    pub fn from_index(index: &AvailabilityIndex) -> RefCalResult<Self> {
        Ok(MemoryStore {
            rosters: RwLock::new(from_index(index)?),
        })
    }

    fn read(&self) -> RefCalResult<RwLockReadGuard<'_, Rosters>> {
        self.rosters
            .read()
            .map_err(|_| RefCalError::Storage("availability lock poisoned".into()))
    }

    fn write(&self) -> RefCalResult<RwLockWriteGuard<'_, Rosters>> {
        self.rosters
            .write()
            .map_err(|_| RefCalError::Storage("availability lock poisoned".into()))
    }
}

impl AvailabilityStore for MemoryStore {
    fn snapshot(&self) -> RefCalResult<AvailabilityIndex> {
        Ok(to_index(self.read()?.iter()))
    }

    fn window(&self, year: i32) -> RefCalResult<AvailabilityIndex> {
        Ok(window_of(&*self.read()?, year))
    }

    fn roster(&self, key: DayKey) -> RefCalResult<Vec<String>> {
        Ok(roster_of(&*self.read()?, key))
    }

    fn set_status(
        &self,
        key: DayKey,
        user_id: &str,
        status: AvailabilityStatus,
    ) -> RefCalResult<DayChange> {
        let mut rosters = self.write()?;
        let changed = apply(&mut rosters, key, user_id, status);
        if changed {
            info!(%key, user_id, ?status, "availability updated");
        }
        Ok(DayChange {
            changed,
            roster: roster_of(&rosters, key),
        })
    }
}
