use offsec_db::error::DatabaseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing X-API-Key header")]
    MissingToken,

    #[error("invalid API key")]
    InvalidToken,

    #[error("no users exist; run `offsecd bootstrap-admin` first")]
    NoUsers,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("token generation failed: {0}")]
    TokenGeneration(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}
