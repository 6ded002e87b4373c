//! # offsec-auth
//!
//! API token issuance and request identity for the offsec program tracker.
//!
//! Each user holds one opaque API token. The token is shown once, when it is
//! issued or regenerated; storage keeps only its SHA-256 digest. Requests
//! name their actor through the `X-API-Key` header, resolved by an
//! [`IdentityResolver`] chosen from [`offsec_config::AuthConfig`].

pub mod error;
pub mod resolver;
pub mod token;

pub use error::AuthError;
pub use resolver::{FallbackResolver, IdentityResolver, TokenResolver, resolver_for};
pub use token::{generate_token, hash_token};

use offsec_core::entities::IssuedToken;
use offsec_core::identity::Actor;
use offsec_db::inputs::NewUser;
use offsec_db::service::OffsecService;

/// Create a user and issue their first token.
///
/// # Errors
///
/// `AuthError::Database` wrapping `Conflict` when the name or email is taken.
pub async fn issue_user(svc: &OffsecService, new: NewUser) -> Result<IssuedToken, AuthError> {
    let token = generate_token()?;
    let user = svc.create_user(new, &hash_token(&token)).await?;
    Ok(IssuedToken { user, token })
}

/// Create the first admin on an empty database and issue their token.
///
/// # Errors
///
/// `AuthError::Database` wrapping `Conflict` once any user exists.
pub async fn bootstrap_admin(svc: &OffsecService, new: NewUser) -> Result<IssuedToken, AuthError> {
    let token = generate_token()?;
    let user = svc.bootstrap_admin(new, &hash_token(&token)).await?;
    tracing::info!(user_id = %user.id, "bootstrap admin created");
    Ok(IssuedToken { user, token })
}

/// Replace a user's token. Admin only; the old token stops working at once.
///
/// # Errors
///
/// `AuthError::Forbidden` for non-admin actors, `AuthError::Database`
/// wrapping `NotFound` for an unknown user.
pub async fn regenerate_token(
    svc: &OffsecService,
    actor: &Actor,
    user_id: &str,
) -> Result<IssuedToken, AuthError> {
    if !actor.is_admin() {
        return Err(AuthError::Forbidden(
            "only admins can regenerate tokens".into(),
        ));
    }
    let token = generate_token()?;
    let user = svc.set_user_token_hash(user_id, &hash_token(&token)).await?;
    tracing::info!(user_id, by = %actor.user_id, "token regenerated");
    Ok(IssuedToken { user, token })
}
