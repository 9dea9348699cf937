//! Availability persisted as a JSON document on disk.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, warn};

use super::{
    AvailabilityStore, DayChange, Rosters, apply, from_index, roster_of, to_index, window_of,
};
use crate::constants::AVAILABILITY_FILE;
use crate::day_key::DayKey;
use crate::error::{RefCalError, RefCalResult};
use crate::index::{AvailabilityIndex, AvailabilityStatus};

/// Keeps the document in memory and rewrites `availability.json` after each
/// change. A failed write rolls the in-memory change back.
pub struct FileStore {
    path: PathBuf,
    rosters: Mutex<Rosters>,
}

impl FileStore {
    /// Open the store in `data_dir`. A missing file is an empty document; an
    /// unreadable or malformed one, including one with paths that are not
    /// calendar days, is an error.
    pub fn open(data_dir: &Path) -> RefCalResult<Self> {
        let path = data_dir.join(AVAILABILITY_FILE);

        let rosters = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let index: AvailabilityIndex = serde_json::from_str(&content)?;
            from_index(&index)?
        } else {
            debug!(path = %path.display(), "no availability document yet");
            Rosters::new()
        };

        Ok(FileStore {
            path,
            rosters: Mutex::new(rosters),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> RefCalResult<MutexGuard<'_, Rosters>> {
        self.rosters
            .lock()
            .map_err(|_| RefCalError::Storage("availability lock poisoned".into()))
    }

    fn save(&self, rosters: &Rosters) -> RefCalResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&to_index(rosters.iter()))?;
        let temp = self.path.with_extension("json.tmp");

        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

impl AvailabilityStore for FileStore {
    fn snapshot(&self) -> RefCalResult<AvailabilityIndex> {
        Ok(to_index(self.lock()?.iter()))
    }

    fn window(&self, year: i32) -> RefCalResult<AvailabilityIndex> {
        Ok(window_of(&*self.lock()?, year))
    }

    fn roster(&self, key: DayKey) -> RefCalResult<Vec<String>> {
        Ok(roster_of(&*self.lock()?, key))
    }

    fn set_status(
        &self,
        key: DayKey,
        user_id: &str,
        status: AvailabilityStatus,
    ) -> RefCalResult<DayChange> {
        let mut rosters = self.lock()?;
        let previous = rosters.get(&key).cloned();

        if !apply(&mut rosters, key, user_id, status) {
            return Ok(DayChange {
                changed: false,
                roster: roster_of(&rosters, key),
            });
        }

        if let Err(e) = self.save(&rosters) {
            warn!(%key, user_id, "could not persist availability, rolling back: {e}");
            match previous {
                Some(ids) => rosters.insert(key, ids),
                None => rosters.remove(&key),
            };
            return Err(e);
        }

        info!(%key, user_id, ?status, "availability updated");
        Ok(DayChange {
            changed: true,
            roster: roster_of(&rosters, key),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AvailabilityStatus::{Available, Unavailable};

    fn key(date: &str) -> DayKey {
        DayKey::parse(date).unwrap()
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(store.snapshot().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_toggle_persists_nested_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store
            .set_status(key("2023-03-15T00:00:00"), "u1", Available)
            .unwrap();

        let content = std::fs::read_to_string(dir.path().join(AVAILABILITY_FILE)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "calendar": { "2023": { "2": { "15": ["u1"] } } } })
        );
    }

    #[test]
    fn test_reopen_sees_previous_writes() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::open(dir.path()).unwrap();
            store.set_status(key("2023-03-15"), "u1", Available).unwrap();
            store.set_status(key("2023-03-15"), "u2", Available).unwrap();
            store.set_status(key("2023-03-15"), "u1", Unavailable).unwrap();
        }

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.roster(key("2023-03-15")).unwrap(), vec!["u2"]);
        assert!(!store.snapshot().unwrap().is_available("2023-03-15", "u1"));
    }

    #[test]
    fn test_open_deduplicates_legacy_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(AVAILABILITY_FILE),
            r#"{ "calendar": { "2023": { "2": { "15": ["u2", "u1", "u2"] } } } }"#,
        )
        .unwrap();

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.roster(key("2023-03-15")).unwrap(), vec!["u2", "u1"]);
    }

    #[test]
    fn test_reopen_keeps_roster_order() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::open(dir.path()).unwrap();
            for id in ["u2", "u10", "u1"] {
                store.set_status(key("2023-03-15"), id, Available).unwrap();
            }
        }

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(
            store.roster(key("2023-03-15")).unwrap(),
            vec!["u2", "u10", "u1"]
        );
    }

    #[test]
    fn test_open_refuses_paths_that_are_not_days() {
        let dir = tempfile::tempdir().unwrap();
        let document = r#"{ "calendar": { "2023": { "1": { "30": ["u1"], "2": ["u2"] } } } }"#;
        std::fs::write(dir.path().join(AVAILABILITY_FILE), document).unwrap();

        assert!(matches!(
            FileStore::open(dir.path()),
            Err(RefCalError::Storage(_))
        ));
        // The document is left as it was.
        assert_eq!(
            std::fs::read_to_string(dir.path().join(AVAILABILITY_FILE)).unwrap(),
            document
        );
    }

    #[test]
    fn test_open_malformed_document_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(AVAILABILITY_FILE), "{ not json").unwrap();

        assert!(matches!(
            FileStore::open(dir.path()),
            Err(RefCalError::Serialization(_))
        ));
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set_status(key("2023-03-15"), "u1", Available).unwrap();

        // A directory where the temp file should go makes the write fail.
        std::fs::create_dir(dir.path().join("availability.json.tmp")).unwrap();

        assert!(store.set_status(key("2023-03-16"), "u1", Available).is_err());
        assert!(store.roster(key("2023-03-16")).unwrap().is_empty());
        assert!(!store.snapshot().unwrap().calendar()["2023"]["2"].contains_key("16"));
        assert_eq!(store.roster(key("2023-03-15")).unwrap(), vec!["u1"]);
    }

    #[test]
    fn test_noop_toggle_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        let change = store.set_status(key("2023-03-15"), "u1", Unavailable).unwrap();
        assert!(!change.changed);
        assert!(!store.path().exists());
    }
}
