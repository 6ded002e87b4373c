//! Database error types for offsec-db.

use offsec_core::errors::CoreError;
use thiserror::Error;

/// Errors from database operations.
///
/// `NotFound`, `Validation` and `Conflict` carry the domain failure kinds
/// through the store unchanged; the remaining variants are storage faults.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Input outside an enumeration, missing, or violating a field rule.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A uniqueness or state precondition was violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., bad data in DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<libsql::Error> for DatabaseError {
    fn from(err: libsql::Error) -> Self {
        let message = err.to_string();
        match message.find("UNIQUE constraint failed: ") {
            Some(pos) => {
                let columns = &message[pos + "UNIQUE constraint failed: ".len()..];
                let columns = columns.trim().trim_end_matches('`');
                Self::Conflict(format!("duplicate value for {columns}"))
            }
            None => Self::LibSql(err),
        }
    }
}

impl From<CoreError> for DatabaseError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, id } => Self::NotFound { entity, id },
            CoreError::Validation(msg) => Self::Validation(msg),
            CoreError::Conflict(msg) => Self::Conflict(msg),
            CoreError::Other(e) => Self::Other(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_becomes_conflict() {
        let err: DatabaseError = libsql::Error::SqliteFailure(
            2067,
            "UNIQUE constraint failed: assets.asset_type, assets.value".into(),
        )
        .into();
        match err {
            DatabaseError::Conflict(msg) => {
                assert_eq!(msg, "duplicate value for assets.asset_type, assets.value");
            }
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn core_errors_keep_their_kind() {
        let err: DatabaseError = CoreError::Validation("bad due date".into()).into();
        assert!(matches!(err, DatabaseError::Validation(_)));
        let err: DatabaseError = CoreError::not_found("finding", "fnd-1").into();
        assert!(matches!(err, DatabaseError::NotFound { entity: "finding", .. }));
    }
}
