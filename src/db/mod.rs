pub mod decks;
pub mod reviews;
pub mod schema;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, Result};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

// Re-export all public items from submodules
pub use decks::*;
pub use reviews::*;
pub use schema::run_migrations;

pub type DbPool = Arc<Mutex<Connection>>;

/// Extension trait for logging errors before discarding them
pub trait LogOnError<T> {
    /// Log the error at warn level and return None
    fn log_warn(self, context: &str) -> Option<T>;
    /// Log the error at warn level and return the default
    fn log_warn_default(self, context: &str) -> T
    where
        T: Default;
}

impl<T, E: std::fmt::Display> LogOnError<T> for std::result::Result<T, E> {
    fn log_warn(self, context: &str) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                None
            }
        }
    }

    fn log_warn_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                T::default()
            }
        }
    }
}

/// Error returned when database lock cannot be acquired
#[derive(Debug)]
pub struct DbLockError;

impl std::fmt::Display for DbLockError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Database unavailable")
  }
}

impl std::error::Error for DbLockError {}

/// Try to acquire the database lock, returning an error if poisoned
pub fn try_lock(pool: &DbPool) -> std::result::Result<MutexGuard<'_, Connection>, DbLockError> {
  pool.lock().map_err(|_: PoisonError<_>| {
    tracing::error!("Database mutex poisoned - a thread panicked while holding the lock");
    DbLockError
  })
}

pub fn init_db(path: &Path) -> Result<DbPool> {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).ok();
  }

  // Create backup before migrations if database exists
  if path.exists() {
    let backup_path = path.with_extension("db.backup");
    if let Err(e) = std::fs::copy(path, &backup_path) {
      tracing::warn!("Could not create database backup: {}", e);
    }
  }

  let conn = Connection::open(path)?;
  run_migrations(&conn)?;
  Ok(Arc::new(Mutex::new(conn)))
}

/// Timestamps are stored as RFC 3339 in UTC with millisecond precision,
/// so string order matches chronological order.
pub fn to_db_time(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp, reporting the column on failure
pub fn from_db_time(idx: usize, s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn test_db_time_roundtrip_keeps_millis() {
    let dt = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap() + chrono::Duration::milliseconds(250);
    let stored = to_db_time(dt);
    assert_eq!(stored, "2025-03-01T12:30:00.250Z");
    assert_eq!(from_db_time(0, &stored).unwrap(), dt);
  }

  #[test]
  fn test_db_time_sorts_lexically() {
    let early = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
    let late = early + chrono::Duration::hours(3);
    assert!(to_db_time(early) < to_db_time(late));
  }

  #[test]
  fn test_from_db_time_rejects_garbage() {
    assert!(from_db_time(2, "yesterday").is_err());
  }

  #[test]
  fn test_log_warn_default() {
    let failed: std::result::Result<Vec<i64>, String> = Err("boom".into());
    assert!(failed.log_warn_default("listing").is_empty());
    let ok: std::result::Result<i64, String> = Ok(3);
    assert_eq!(ok.log_warn("value"), Some(3));
  }

  #[test]
  fn test_init_db_creates_parent_dirs() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("nested").join("studysprint.db");
    let pool = init_db(&path).unwrap();
    assert!(path.exists());
    assert!(try_lock(&pool).is_ok());
  }
}
