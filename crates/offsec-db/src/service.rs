//! Service layer running repository operations inside units of work.
//!
//! `OffsecService` wraps `OffsecDb`. All repo methods are implemented as
//! `impl OffsecService` blocks in `crate::repos`, and every public method
//! follows the same protocol:
//! 1. Begin a unit of work (serialized, transactional)
//! 2. Run the repository functions against it
//! 3. Commit on success, roll back on failure

use std::time::Duration;

use crate::OffsecDb;
use crate::error::DatabaseError;

/// Entry point for all storage operations.
pub struct OffsecService {
    db: OffsecDb,
}

impl OffsecService {
    /// Create a new service wrapping a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` — Path to the libSQL database file, or `":memory:"` for tests.
    /// * `busy_timeout` — How long a statement waits on a locked database file.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or migrated.
    pub async fn open_local(db_path: &str, busy_timeout: Duration) -> Result<Self, DatabaseError> {
        let db = OffsecDb::open_local(db_path, busy_timeout).await?;
        Ok(Self { db })
    }

    /// Create from an existing `OffsecDb`.
    #[must_use]
    pub const fn from_db(db: OffsecDb) -> Self {
        Self { db }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &OffsecDb {
        &self.db
    }
}
