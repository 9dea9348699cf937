use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use refcal_core::{AvailabilityService, FileStore, UserDirectory};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    service: AvailabilityService,
}

impl AppState {
    /// Open the availability document and user directory in `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let store = FileStore::open(data_dir)?;
        let users = UserDirectory::open(data_dir)?;

        Ok(AppState::new(AvailabilityService::new(
            Arc::new(store),
            Arc::new(users),
        )))
    }

    pub fn new(service: AvailabilityService) -> Self {
        AppState { service }
    }

    pub fn service(&self) -> &AvailabilityService {
        &self.service
    }
}
