//! Program year routes.
//!
//! - `GET   /program-years` - List years
//! - `POST  /program-years` - Create a year
//! - `GET   /program-years/:id` - Get a year
//! - `PATCH /program-years/:id` - Correct the label, theme or objectives

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use offsec_core::entities::ProgramYear;
use offsec_db::inputs::NewProgramYear;
use offsec_db::updates::program_year::ProgramYearUpdate;

use crate::context::CurrentActor;
use crate::error::ApiResult;
use crate::extract::JsonBody;
use crate::server::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/program-years", get(list).post(create))
        .route("/program-years/:id", get(fetch).patch(update))
}

async fn list(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ProgramYear>>> {
    Ok(Json(state.svc.list_program_years().await?))
}

async fn create(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    JsonBody(new): JsonBody<NewProgramYear>,
) -> ApiResult<(StatusCode, Json<ProgramYear>)> {
    let year = state.svc.create_program_year(new).await?;
    Ok((StatusCode::CREATED, Json(year)))
}

async fn fetch(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProgramYear>> {
    Ok(Json(state.svc.get_program_year(&id).await?))
}

async fn update(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<ProgramYearUpdate>,
) -> ApiResult<Json<ProgramYear>> {
    Ok(Json(state.svc.update_program_year(&id, update).await?))
}
