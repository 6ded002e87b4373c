//! Cross-cutting error types for offsec.
//!
//! These are the failure kinds every core operation can surface. Storage
//! errors (`DatabaseError`) live in `offsec-db` and carry these kinds through;
//! the HTTP layer maps each kind onto one status code.

use thiserror::Error;

/// Errors that can be raised by any offsec crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A field is outside its closed enumeration, missing, or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A state precondition was violated (e.g. promoting a promoted intake).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}
