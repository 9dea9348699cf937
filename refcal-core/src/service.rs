//! Availability operations exposed to the HTTP layer.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::day_key::DayKey;
use crate::error::RefCalResult;
use crate::grid::{AnnotatedDay, MonthGrid};
use crate::index::{AvailabilityIndex, AvailabilityStatus};
use crate::store::AvailabilityStore;
use crate::user::{User, UserDirectory};

/// The acting user is always passed in explicitly.
#[derive(Clone)]
pub struct AvailabilityService {
    store: Arc<dyn AvailabilityStore>,
    users: Arc<UserDirectory>,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn AvailabilityStore>, users: Arc<UserDirectory>) -> Self {
        AvailabilityService { store, users }
    }

    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    /// Availability for `year - 1 ..= year + 1`.
    pub fn window(&self, year: i32) -> RefCalResult<AvailabilityIndex> {
        self.store.window(year)
    }

    /// Set `user_id`'s availability on `date` and return the window around
    /// that date's year.
    ///
    /// Nothing is written if the user is unknown or the date does not parse.
    /// If the user's timestamp cannot be saved, the availability change is
    /// reverted before the error is returned.
    pub fn toggle(
        &self,
        user_id: &str,
        date: &str,
        desired: AvailabilityStatus,
    ) -> RefCalResult<AvailabilityIndex> {
        self.users.get(user_id)?;
        let key = DayKey::parse(date)?;

        let change = self.store.set_status(key, user_id, desired)?;
        if let Err(e) = self.users.touch(user_id, Utc::now()) {
            if change.changed {
                warn!(%key, user_id, "reverting availability after failed user update: {e}");
                self.store.set_status(key, user_id, desired.opposite())?;
            }
            return Err(e);
        }
        info!(%key, user_id, ?desired, available = change.roster.len(), "toggled availability");

        self.store.window(key.year())
    }

    /// The month grid for `year`/`month` (1-based) annotated for `user_id`.
    pub fn month(&self, year: i32, month: u32, user_id: &str) -> RefCalResult<Vec<AnnotatedDay>> {
        let grid = MonthGrid::new(year, month)?;
        let index = self.store.window(year)?;
        Ok(grid.annotate(&index, user_id))
    }

    /// Officials of `sport` (at `level`, if given) available on `date`, sorted
    /// by last name then first name.
    pub fn directory(
        &self,
        sport: &str,
        date: &str,
        level: Option<&str>,
    ) -> RefCalResult<Vec<User>> {
        let key = DayKey::parse(date)?;
        let roster = self.store.roster(key)?;

        let mut officials: Vec<User> = self
            .users
            .by_sport(sport, level)?
            .into_iter()
            .filter(|u| roster.contains(&u.id))
            .collect();
        officials.sort_by(|a, b| {
            (a.last_name.as_str(), a.first_name.as_str())
                .cmp(&(b.last_name.as_str(), b.first_name.as_str()))
        });

        Ok(officials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::AVAILABILITY_FILE;
    use crate::error::RefCalError;
    use crate::store::{FileStore, MemoryStore};
    use crate::user::SportLevel;
    use chrono::{TimeZone, Utc};
    use AvailabilityStatus::{Available, Unavailable};

    fn official(id: &str, first: &str, last: &str, sport: &str, level: &str) -> User {
        let mut user = User::new(id, first, last, &format!("{id}@example.com"));
        user.sports = vec![SportLevel {
            name: sport.to_string(),
            level: level.to_string(),
        }];
        user.updated_at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        user
    }

    fn service() -> AvailabilityService {
        let users = UserDirectory::in_memory(vec![
            official("u1", "Sam", "Young", "Basketball", "Varsity"),
            official("u2", "Alex", "Baker", "Basketball", "JV"),
            official("u3", "Jo", "Baker", "Basketball", "Varsity"),
            official("u4", "Kim", "Stone", "Soccer", "Varsity"),
        ]);
        AvailabilityService::new(Arc::new(MemoryStore::new()), Arc::new(users))
    }

    #[test]
    fn test_toggle_returns_window_and_touches_user() {
        let service = service();
        let before = service.users().get("u1").unwrap().updated_at;

        let window = service
            .toggle("u1", "2023-03-15T00:00:00", Available)
            .unwrap();

        assert_eq!(*window.calendar()["2023"]["2"]["15"], vec!["u1".to_string()]);
        assert!(service.users().get("u1").unwrap().updated_at > before);
    }

    #[test]
    fn test_toggle_unknown_user_writes_nothing() {
        let service = service();

        let result = service.toggle("ghost", "2023-03-15", Available);
        assert!(matches!(result, Err(RefCalError::UserNotFound(_))));
        assert!(service.window(2023).unwrap().is_empty());
    }

    #[test]
    fn test_toggle_bad_date_writes_nothing() {
        let service = service();
        let before = service.users().get("u1").unwrap().updated_at;

        let result = service.toggle("u1", "yesterday", Available);
        assert!(matches!(result, Err(RefCalError::InvalidDate(_))));
        assert_eq!(service.users().get("u1").unwrap().updated_at, before);
    }

    #[test]
    fn test_failed_touch_reverts_availability() {
        let dir = tempfile::tempdir().unwrap();
        let users = UserDirectory::open(dir.path()).unwrap();
        users
            .upsert(official("u1", "Sam", "Young", "Basketball", "Varsity"))
            .unwrap();
        let store = Arc::new(FileStore::open(dir.path()).unwrap());
        let service = AvailabilityService::new(store.clone(), Arc::new(users));
        service.toggle("u1", "2023-03-14", Available).unwrap();

        // A directory where the temp file should go makes the user write fail.
        std::fs::create_dir(dir.path().join("users.json.tmp")).unwrap();

        assert!(service.toggle("u1", "2023-03-15", Available).is_err());
        assert!(store.roster(DayKey::parse("2023-03-15").unwrap()).unwrap().is_empty());
        assert_eq!(
            store.roster(DayKey::parse("2023-03-14").unwrap()).unwrap(),
            vec!["u1"]
        );

        let reopened = FileStore::open(dir.path()).unwrap();
        assert!(!reopened.snapshot().unwrap().is_available("2023-03-15", "u1"));
        assert!(reopened.snapshot().unwrap().is_available("2023-03-14", "u1"));
        assert!(dir.path().join(AVAILABILITY_FILE).exists());
    }

    #[test]
    fn test_month_spans_year_boundary() {
        let service = service();
        service.toggle("u1", "2025-01-02", Available).unwrap();
        service.toggle("u1", "2024-12-20", Available).unwrap();

        let days = service.month(2024, 12, "u1").unwrap();
        let available: Vec<String> = days
            .iter()
            .filter(|d| d.available)
            .map(|d| d.day.key().to_string())
            .collect();
        assert_eq!(available, vec!["2024:11:20", "2025:0:2"]);
    }

    #[test]
    fn test_month_rejects_bad_month() {
        assert!(matches!(
            service().month(2024, 13, "u1"),
            Err(RefCalError::InvalidMonth(13))
        ));
    }

    #[test]
    fn test_directory_filters_by_date_sport_and_level() {
        let service = service();
        for id in ["u1", "u2", "u3", "u4"] {
            service.toggle(id, "2023-03-15", Available).unwrap();
        }
        service.toggle("u1", "2023-03-15", Unavailable).unwrap();
        service.toggle("u1", "2023-03-16", Available).unwrap();

        let ids = |users: Vec<User>| users.into_iter().map(|u| u.id).collect::<Vec<_>>();

        // Baker/Alex, Baker/Jo
        assert_eq!(
            ids(service.directory("basketball", "2023-03-15", None).unwrap()),
            vec!["u2", "u3"]
        );
        assert_eq!(
            ids(service
                .directory("basketball", "2023-03-15", Some("varsity"))
                .unwrap()),
            vec!["u3"]
        );
        assert_eq!(
            ids(service.directory("basketball", "2023-03-16", None).unwrap()),
            vec!["u1"]
        );
        assert!(
            service
                .directory("basketball", "2023-03-17", None)
                .unwrap()
                .is_empty()
        );
    }
}
