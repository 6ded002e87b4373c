//! Request identity.
//!
//! Every route except `/health` takes a [`CurrentActor`], resolved from the
//! `X-API-Key` header by the configured [`offsec_auth::IdentityResolver`].

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use offsec_core::identity::Actor;

use crate::error::ApiError;
use crate::server::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// The user a request acts as.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentActor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(existing) = parts.extensions.get::<Self>() {
            return Ok(existing.clone());
        }

        let api_key = match parts.headers.get(API_KEY_HEADER) {
            Some(value) => Some(
                value
                    .to_str()
                    .map_err(|_| ApiError::unauthorized("invalid API key"))?
                    .trim(),
            ),
            None => None,
        };

        let actor = state.resolver.resolve(&state.svc, api_key).await?;
        let current = Self(actor);
        parts.extensions.insert(current.clone());
        Ok(current)
    }
}
