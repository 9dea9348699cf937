//! Officials and their contact profiles.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::USERS_FILE;
use crate::error::{RefCalError, RefCalResult};

/// A sport a user officiates, and at what level (e.g. "varsity").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SportLevel {
    pub name: String,
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub sports: Vec<SportLevel>,
    #[serde(default)]
    pub is_admin: bool,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: &str, first_name: &str, last_name: &str, email: &str) -> Self {
        User {
            id: id.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            phone: None,
            sports: Vec::new(),
            is_admin: false,
            updated_at: Utc::now(),
        }
    }

    /// Whether this user officiates `sport`, and at `level` if one is given.
    /// Names and levels compare case-insensitively.
    pub fn officiates(&self, sport: &str, level: Option<&str>) -> bool {
        self.sports.iter().any(|s| {
            s.name.eq_ignore_ascii_case(sport)
                && level.is_none_or(|level| s.level.eq_ignore_ascii_case(level))
        })
    }
}

/// All users, backed by `users.json` when opened from a directory.
pub struct UserDirectory {
    path: Option<PathBuf>,
    users: RwLock<BTreeMap<String, User>>,
}

impl UserDirectory {
    /// Directory with no backing file.
    pub fn in_memory(users: impl IntoIterator<Item = User>) -> Self {
        UserDirectory {
            path: None,
            users: RwLock::new(users.into_iter().map(|u| (u.id.clone(), u)).collect()),
        }
    }

    /// Load `users.json` from `data_dir`. A missing file is an empty directory.
    pub fn open(data_dir: &Path) -> RefCalResult<Self> {
        let path = data_dir.join(USERS_FILE);

        let users: Vec<User> = if path.exists() {
            serde_json::from_str(&std::fs::read_to_string(&path)?)?
        } else {
            debug!(path = %path.display(), "no users file yet");
            Vec::new()
        };

        Ok(UserDirectory {
            path: Some(path),
            users: RwLock::new(users.into_iter().map(|u| (u.id.clone(), u)).collect()),
        })
    }

    fn read(&self) -> RefCalResult<RwLockReadGuard<'_, BTreeMap<String, User>>> {
        self.users
            .read()
            .map_err(|_| RefCalError::Storage("user directory lock poisoned".into()))
    }

    fn write(&self) -> RefCalResult<RwLockWriteGuard<'_, BTreeMap<String, User>>> {
        self.users
            .write()
            .map_err(|_| RefCalError::Storage("user directory lock poisoned".into()))
    }

    fn save(&self, users: &BTreeMap<String, User>) -> RefCalResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let list: Vec<&User> = users.values().collect();
        let temp = path.with_extension("json.tmp");
        std::fs::write(&temp, serde_json::to_string_pretty(&list)?)?;
        std::fs::rename(&temp, path)?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> RefCalResult<User> {
        self.read()?
            .get(id)
            .cloned()
            .ok_or_else(|| RefCalError::UserNotFound(id.to_string()))
    }

    pub fn list(&self) -> RefCalResult<Vec<User>> {
        Ok(self.read()?.values().cloned().collect())
    }

    pub fn upsert(&self, user: User) -> RefCalResult<()> {
        let mut users = self.write()?;
        users.insert(user.id.clone(), user);
        self.save(&users)
    }

    /// Record that `id` changed at `now`. If the directory cannot be saved
    /// the previous timestamp is kept.
    pub fn touch(&self, id: &str, now: DateTime<Utc>) -> RefCalResult<User> {
        let mut users = self.write()?;
        let user = users
            .get_mut(id)
            .ok_or_else(|| RefCalError::UserNotFound(id.to_string()))?;
        let previous = std::mem::replace(&mut user.updated_at, now);
        let user = user.clone();

        if let Err(e) = self.save(&users) {
            warn!(user_id = id, "could not persist user directory, rolling back: {e}");
            if let Some(user) = users.get_mut(id) {
                user.updated_at = previous;
            }
            return Err(e);
        }
        Ok(user)
    }

    /// Users who officiate `sport`, optionally at `level`.
    pub fn by_sport(&self, sport: &str, level: Option<&str>) -> RefCalResult<Vec<User>> {
        Ok(self
            .read()?
            .values()
            .filter(|u| u.officiates(sport, level))
            .cloned()
            .collect())
    }
}
