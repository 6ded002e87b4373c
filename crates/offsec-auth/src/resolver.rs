//! Map an optional `X-API-Key` value to the acting user.

use async_trait::async_trait;

use offsec_config::{AuthConfig, AuthMode};
use offsec_core::entities::User;
use offsec_core::identity::Actor;
use offsec_db::service::OffsecService;

use crate::error::AuthError;
use crate::token::hash_token;

/// Resolves the actor for a request.
///
/// A key that is present but unknown is always `InvalidToken`, whatever the
/// implementation does for a missing key.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, svc: &OffsecService, api_key: Option<&str>)
    -> Result<Actor, AuthError>;
}

fn actor_of(user: User) -> Actor {
    Actor {
        user_id: user.id,
        name: user.name,
        role: user.role,
    }
}

async fn lookup(svc: &OffsecService, api_key: &str) -> Result<Actor, AuthError> {
    let user = svc
        .find_user_by_token_hash(&hash_token(api_key))
        .await?
        .ok_or(AuthError::InvalidToken)?;
    tracing::debug!(user_id = %user.id, "api key resolved");
    Ok(actor_of(user))
}

/// Requires a valid key on every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenResolver;

#[async_trait]
impl IdentityResolver for TokenResolver {
    async fn resolve(
        &self,
        svc: &OffsecService,
        api_key: Option<&str>,
    ) -> Result<Actor, AuthError> {
        match api_key {
            Some(key) => lookup(svc, key).await,
            None => Err(AuthError::MissingToken),
        }
    }
}

/// Lets keyless requests act as a fixed user: the named fallback user, or
/// the earliest created user when no name is configured.
#[derive(Debug, Clone, Default)]
pub struct FallbackResolver {
    pub fallback_user: Option<String>,
}

#[async_trait]
impl IdentityResolver for FallbackResolver {
    async fn resolve(
        &self,
        svc: &OffsecService,
        api_key: Option<&str>,
    ) -> Result<Actor, AuthError> {
        if let Some(key) = api_key {
            return lookup(svc, key).await;
        }
        let user = match self.fallback_user {
            Some(ref name) => svc.find_user_by_name(name).await?,
            None => svc.first_user().await?,
        };
        user.map(actor_of).ok_or(AuthError::NoUsers)
    }
}

/// Build the resolver selected by configuration.
#[must_use]
pub fn resolver_for(config: &AuthConfig) -> Box<dyn IdentityResolver> {
    match config.mode {
        AuthMode::Token => Box::new(TokenResolver),
        AuthMode::Fallback => {
            tracing::warn!("fallback identity enabled: requests without X-API-Key are trusted");
            Box::new(FallbackResolver {
                fallback_user: config.fallback_user.clone(),
            })
        }
    }
}
