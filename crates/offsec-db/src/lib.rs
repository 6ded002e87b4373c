//! # offsec-db
//!
//! libSQL storage for the offsec program tracker.
//!
//! Holds every relational table: program years, engagements, intake requests,
//! assets, findings, finding templates, timeline events, comments, and users.
//! One database handle and one connection serve the whole process; access is
//! serialized through [`UnitOfWork`], and each service operation runs inside
//! exactly one unit of work so mutations are atomic and reads see a single
//! consistent snapshot.

pub mod error;
pub mod helpers;
pub mod inputs;
mod migrations;
pub mod repos;
pub mod service;
pub mod updates;

#[cfg(test)]
mod test_support;

use std::ops::Deref;
use std::time::Duration;

use error::DatabaseError;
use libsql::Builder;
use tokio::sync::{Mutex, MutexGuard};

/// Default time a statement waits on a locked database file.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Central database handle.
///
/// Wraps a libSQL database, its single connection, and the lock that
/// serializes units of work on that connection.
pub struct OffsecDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    lock: Mutex<()>,
}

impl OffsecDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Enables foreign keys, applies the busy timeout, switches file-backed
    /// stores to WAL journaling, and runs migrations.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str, busy_timeout: Duration) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        // Both pragmas report their new value as a row.
        let mut rows = conn
            .query(
                &format!("PRAGMA busy_timeout = {}", busy_timeout.as_millis()),
                (),
            )
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA busy_timeout: {e}")))?;
        while rows.next().await?.is_some() {}

        if path != ":memory:" {
            let mut rows = conn
                .query("PRAGMA journal_mode = WAL", ())
                .await
                .map_err(|e| DatabaseError::Migration(format!("PRAGMA journal_mode: {e}")))?;
            while rows.next().await?.is_some() {}
        }

        let offsec_db = Self {
            db,
            conn,
            lock: Mutex::new(()),
        };
        offsec_db.run_migrations().await?;
        tracing::debug!(path, "database opened");
        Ok(offsec_db)
    }

    /// Begin a unit of work: wait for exclusive use of the connection and
    /// open a transaction on it.
    ///
    /// A previous unit of work that was dropped without `commit` or
    /// `rollback` left its transaction open; it is rolled back here before
    /// the new one starts, so its writes are never observed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the transaction cannot be started.
    pub async fn begin(&self) -> Result<UnitOfWork<'_>, DatabaseError> {
        let guard = self.lock.lock().await;
        if !self.conn.is_autocommit() {
            tracing::warn!("rolling back a transaction left open by an abandoned unit of work");
            self.conn.execute("ROLLBACK", ()).await?;
        }
        self.conn.execute("BEGIN", ()).await?;
        Ok(UnitOfWork {
            conn: &self.conn,
            _guard: guard,
        })
    }
}

/// One serialized transaction on the shared connection.
///
/// Derefs to [`libsql::Connection`] so repository functions take
/// `&libsql::Connection` and compose inside a single unit of work.
pub struct UnitOfWork<'a> {
    conn: &'a libsql::Connection,
    _guard: MutexGuard<'a, ()>,
}

impl UnitOfWork<'_> {
    /// Commit all writes made in this unit of work.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the commit fails.
    pub async fn commit(self) -> Result<(), DatabaseError> {
        self.conn.execute("COMMIT", ()).await?;
        Ok(())
    }

    /// Discard all writes made in this unit of work.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the rollback fails.
    pub async fn rollback(self) -> Result<(), DatabaseError> {
        self.conn.execute("ROLLBACK", ()).await?;
        Ok(())
    }

    /// Commit when `result` is `Ok`, roll back when it is `Err`, and pass
    /// the result through.
    ///
    /// # Errors
    ///
    /// Returns the original error, or the commit error if committing fails.
    pub async fn finish<T>(self, result: Result<T, DatabaseError>) -> Result<T, DatabaseError> {
        match result {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.rollback().await {
                    tracing::error!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }
}

impl Deref for UnitOfWork<'_> {
    type Target = libsql::Connection;

    fn deref(&self) -> &Self::Target {
        self.conn
    }
}

/// Generate a prefixed ID via libSQL. Returns e.g., `"fnd-a3f8b2c1"`.
///
/// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails or returns no rows.
pub async fn generate_id(conn: &libsql::Connection, prefix: &str) -> Result<String, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
            (),
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<String>(0)?)
}
