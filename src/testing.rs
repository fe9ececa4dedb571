//! Test utilities for database setup.
//!
//! Provides helpers that reuse authoritative schema initialization,
//! eliminating schema duplication in test code.

use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::db::DbPool;
use crate::store::SqliteStore;

/// Test environment with a studysprint.db using the authoritative schema.
///
/// The database lives in a temporary directory that is removed on drop.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    /// Connection with the full schema (all migrations)
    pub conn: Connection,
}

impl TestEnv {
    /// Create a test environment with the database initialized via
    /// `crate::db::schema::run_migrations()`.
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let conn = Connection::open(temp.path().join("studysprint.db"))?;
        crate::db::schema::run_migrations(&conn)?;

        Ok(Self { temp, conn })
    }

    pub fn db_path(&self) -> PathBuf {
        self.temp.path().join("studysprint.db")
    }

    /// A second connection to the same database, wrapped as a pool
    pub fn pool(&self) -> DbPool {
        let conn = Connection::open(self.db_path()).expect("open test database");
        crate::db::schema::run_migrations(&conn).expect("migrate test database");
        Arc::new(Mutex::new(conn))
    }

    /// SQLite-backed store over a fresh connection to the test database
    pub fn store(&self) -> Arc<SqliteStore> {
        Arc::new(SqliteStore::new(self.pool()))
    }
}
