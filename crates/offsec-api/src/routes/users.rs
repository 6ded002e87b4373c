//! User routes.
//!
//! - `GET  /users` - List users
//! - `POST /users` - Create a user and issue their token (admin)
//! - `GET  /users/me` - The acting user
//! - `POST /users/:id/regenerate-token` - Replace a user's token (admin)

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use offsec_core::entities::{IssuedToken, User};
use offsec_db::inputs::NewUser;

use crate::context::CurrentActor;
use crate::error::{ApiError, ApiResult};
use crate::extract::JsonBody;
use crate::server::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/me", get(me))
        .route("/users/:id/regenerate-token", post(regenerate_token))
}

async fn list_users(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.svc.list_users().await?))
}

async fn create_user(
    CurrentActor(actor): CurrentActor,
    State(state): State<Arc<AppState>>,
    JsonBody(new): JsonBody<NewUser>,
) -> ApiResult<(StatusCode, Json<IssuedToken>)> {
    if !actor.is_admin() {
        return Err(ApiError::forbidden("only admins can create users"));
    }
    let issued = offsec_auth::issue_user(&state.svc, new).await?;
    Ok((StatusCode::CREATED, Json(issued)))
}

async fn me(
    CurrentActor(actor): CurrentActor,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.svc.get_user(&actor.user_id).await?))
}

async fn regenerate_token(
    CurrentActor(actor): CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<IssuedToken>> {
    let issued = offsec_auth::regenerate_token(&state.svc, &actor, &id).await?;
    Ok(Json(issued))
}
