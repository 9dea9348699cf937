//! Core types for refcal.
//!
//! - `grid` builds the 42-cell month view
//! - `index` holds the year → month → day → user-id availability document
//! - `store` persists availability with per-day atomic updates
//! - `service` ties availability to the user directory

pub mod config;
pub mod constants;
pub mod day_key;
pub mod error;
pub mod grid;
pub mod index;
pub mod service;
pub mod store;
pub mod user;

pub use config::RefCalConfig;
pub use day_key::DayKey;
pub use error::{RefCalError, RefCalResult};
pub use grid::{AnnotatedDay, CalendarDay, MonthGrid, build_month_grid, days_in_month};
pub use index::{AvailabilityIndex, AvailabilityStatus};
pub use service::AvailabilityService;
pub use store::{AvailabilityStore, DayChange, FileStore, MemoryStore};
pub use user::{SportLevel, User, UserDirectory};
