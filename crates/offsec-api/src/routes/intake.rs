//! Intake queue routes.
//!
//! - `GET/POST /intake` - List (`?status=`) newest first / submit
//! - `GET      /intake/:id` - Get a request
//! - `POST     /intake/:id/review` - Mark reviewed
//! - `POST     /intake/:id/promote` - Promote into a new engagement
//! - `POST     /intake/:id/reject` - Reject

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use offsec_core::entities::{Engagement, IntakeRequest};
use offsec_core::enums::IntakeStatus;
use offsec_db::inputs::{NewIntake, PromoteIntake};

use crate::context::CurrentActor;
use crate::error::ApiResult;
use crate::extract::{JsonBody, QueryParams};
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
struct IntakeQuery {
    status: Option<IntakeStatus>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/intake", get(list).post(create))
        .route("/intake/:id", get(fetch))
        .route("/intake/:id/review", post(review))
        .route("/intake/:id/promote", post(promote))
        .route("/intake/:id/reject", post(reject))
}

async fn list(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<IntakeQuery>,
) -> ApiResult<Json<Vec<IntakeRequest>>> {
    Ok(Json(state.svc.list_intake(query.status).await?))
}

async fn create(
    CurrentActor(actor): CurrentActor,
    State(state): State<Arc<AppState>>,
    JsonBody(new): JsonBody<NewIntake>,
) -> ApiResult<(StatusCode, Json<IntakeRequest>)> {
    let intake = state.svc.create_intake(&actor, new).await?;
    Ok((StatusCode::CREATED, Json(intake)))
}

async fn fetch(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<IntakeRequest>> {
    Ok(Json(state.svc.get_intake(&id).await?))
}

async fn review(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<IntakeRequest>> {
    Ok(Json(state.svc.review_intake(&id).await?))
}

async fn promote(
    CurrentActor(actor): CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(fields): JsonBody<PromoteIntake>,
) -> ApiResult<(StatusCode, Json<Engagement>)> {
    let eng = state.svc.promote_intake(&actor, &id, fields).await?;
    Ok((StatusCode::CREATED, Json(eng)))
}

async fn reject(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<IntakeRequest>> {
    Ok(Json(state.svc.reject_intake(&id).await?))
}
