//! Finding routes addressed by finding id.
//!
//! - `GET   /findings/:id` - Get a finding
//! - `PATCH /findings/:id` - Partial update, including asset replacement

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use offsec_core::entities::Finding;
use offsec_db::updates::finding::FindingUpdate;

use crate::context::CurrentActor;
use crate::error::ApiResult;
use crate::extract::JsonBody;
use crate::server::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/findings/:id", get(fetch).patch(update))
}

async fn fetch(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Finding>> {
    Ok(Json(state.svc.get_finding(&id).await?))
}

async fn update(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<FindingUpdate>,
) -> ApiResult<Json<Finding>> {
    Ok(Json(state.svc.update_finding(&id, update).await?))
}
