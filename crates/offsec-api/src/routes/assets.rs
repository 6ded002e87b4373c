//! Asset catalog routes.
//!
//! - `GET/POST  /assets` - List (`?asset_type=`) / create
//! - `GET/PATCH /assets/:id` - Get / update

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use offsec_core::entities::Asset;
use offsec_core::enums::AssetType;
use offsec_db::inputs::NewAsset;
use offsec_db::updates::asset::AssetUpdate;

use crate::context::CurrentActor;
use crate::error::ApiResult;
use crate::extract::{JsonBody, QueryParams};
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
struct AssetQuery {
    asset_type: Option<AssetType>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/assets", get(list).post(create))
        .route("/assets/:id", get(fetch).patch(update))
}

async fn list(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<AssetQuery>,
) -> ApiResult<Json<Vec<Asset>>> {
    Ok(Json(state.svc.list_assets(query.asset_type).await?))
}

async fn create(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    JsonBody(new): JsonBody<NewAsset>,
) -> ApiResult<(StatusCode, Json<Asset>)> {
    let asset = state.svc.create_asset(new).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

async fn fetch(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Asset>> {
    Ok(Json(state.svc.get_asset(&id).await?))
}

async fn update(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<AssetUpdate>,
) -> ApiResult<Json<Asset>> {
    Ok(Json(state.svc.update_asset(&id, update).await?))
}
