//! Finding template routes.
//!
//! - `GET/POST         /finding-templates` - List (`?category=`) / create
//! - `GET/PATCH/DELETE /finding-templates/:id` - Get / update / delete

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use offsec_core::entities::FindingTemplate;
use offsec_db::inputs::NewTemplate;
use offsec_db::updates::template::TemplateUpdate;

use crate::context::CurrentActor;
use crate::error::ApiResult;
use crate::extract::{JsonBody, QueryParams};
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
struct TemplateQuery {
    category: Option<String>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/finding-templates", get(list).post(create))
        .route(
            "/finding-templates/:id",
            get(fetch).patch(update).delete(remove),
        )
}

async fn list(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<TemplateQuery>,
) -> ApiResult<Json<Vec<FindingTemplate>>> {
    Ok(Json(
        state.svc.list_templates(query.category.as_deref()).await?,
    ))
}

async fn create(
    CurrentActor(actor): CurrentActor,
    State(state): State<Arc<AppState>>,
    JsonBody(new): JsonBody<NewTemplate>,
) -> ApiResult<(StatusCode, Json<FindingTemplate>)> {
    let tpl = state.svc.create_template(&actor, new).await?;
    Ok((StatusCode::CREATED, Json(tpl)))
}

async fn fetch(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<FindingTemplate>> {
    Ok(Json(state.svc.get_template(&id).await?))
}

async fn update(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<TemplateUpdate>,
) -> ApiResult<Json<FindingTemplate>> {
    Ok(Json(state.svc.update_template(&id, update).await?))
}

async fn remove(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.svc.delete_template(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
