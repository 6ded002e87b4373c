//! Engagement routes and everything nested under an engagement.
//!
//! - `GET/POST  /engagements` - List (filters) / create
//! - `GET/PATCH /engagements/:id` - Get / partial update
//! - `GET/POST  /engagements/:id/findings` - Findings ledger
//! - `POST      /engagements/:id/findings/from-template` - Copy a template
//! - `GET/POST  /engagements/:id/timeline` - Timeline
//! - `GET/POST  /engagements/:id/comments` - Comments
//! - `GET/POST  /engagements/:id/assets` - Scope links
//! - `GET       /engagements/:id/report` - Report snapshot
//! - `GET       /engagements/:id/export/markdown` - Markdown report
//! - `GET       /engagements/:id/export/csv` - Findings CSV

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use offsec_core::entities::{Comment, Engagement, Finding, Report, ScopedAsset, TimelineEvent};
use offsec_db::inputs::{
    FromTemplate, NewComment, NewEngagement, NewFinding, NewTimelineEvent, ScopeLink,
};
use offsec_db::repos::engagement::EngagementFilter;
use offsec_db::updates::engagement::EngagementUpdate;

use crate::context::CurrentActor;
use crate::error::ApiResult;
use crate::export;
use crate::extract::{JsonBody, QueryParams};
use crate::server::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/engagements", get(list).post(create))
        .route("/engagements/:id", get(fetch).patch(update))
        .route(
            "/engagements/:id/findings",
            get(list_findings).post(create_finding),
        )
        .route(
            "/engagements/:id/findings/from-template",
            post(create_finding_from_template),
        )
        .route(
            "/engagements/:id/timeline",
            get(list_timeline).post(append_timeline),
        )
        .route(
            "/engagements/:id/comments",
            get(list_comments).post(add_comment),
        )
        .route("/engagements/:id/assets", get(list_scope).post(link_asset))
        .route("/engagements/:id/report", get(report))
        .route("/engagements/:id/export/markdown", get(export_markdown))
        .route("/engagements/:id/export/csv", get(export_csv))
}

async fn list(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    QueryParams(filter): QueryParams<EngagementFilter>,
) -> ApiResult<Json<Vec<Engagement>>> {
    Ok(Json(state.svc.list_engagements(&filter).await?))
}

async fn create(
    CurrentActor(actor): CurrentActor,
    State(state): State<Arc<AppState>>,
    JsonBody(new): JsonBody<NewEngagement>,
) -> ApiResult<(StatusCode, Json<Engagement>)> {
    let eng = state.svc.create_engagement(&actor, new).await?;
    Ok((StatusCode::CREATED, Json(eng)))
}

async fn fetch(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Engagement>> {
    Ok(Json(state.svc.get_engagement(&id).await?))
}

async fn update(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<EngagementUpdate>,
) -> ApiResult<Json<Engagement>> {
    Ok(Json(state.svc.update_engagement(&id, update).await?))
}

async fn list_findings(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Finding>>> {
    Ok(Json(state.svc.list_findings(&id).await?))
}

async fn create_finding(
    CurrentActor(actor): CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(new): JsonBody<NewFinding>,
) -> ApiResult<(StatusCode, Json<Finding>)> {
    let finding = state.svc.create_finding(&actor, &id, new).await?;
    Ok((StatusCode::CREATED, Json(finding)))
}

async fn create_finding_from_template(
    CurrentActor(actor): CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(from): JsonBody<FromTemplate>,
) -> ApiResult<(StatusCode, Json<Finding>)> {
    let finding = state
        .svc
        .create_finding_from_template(&actor, &id, from)
        .await?;
    Ok((StatusCode::CREATED, Json(finding)))
}

async fn list_timeline(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<TimelineEvent>>> {
    Ok(Json(state.svc.list_timeline(&id).await?))
}

async fn append_timeline(
    CurrentActor(actor): CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(new): JsonBody<NewTimelineEvent>,
) -> ApiResult<(StatusCode, Json<TimelineEvent>)> {
    let event = state.svc.append_timeline_event(&actor, &id, new).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

async fn list_comments(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Comment>>> {
    Ok(Json(state.svc.list_comments(&id).await?))
}

async fn add_comment(
    CurrentActor(actor): CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(new): JsonBody<NewComment>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let comment = state.svc.add_comment(&actor, &id, new).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn list_scope(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<ScopedAsset>>> {
    Ok(Json(state.svc.list_engagement_assets(&id).await?))
}

async fn link_asset(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(link): JsonBody<ScopeLink>,
) -> ApiResult<(StatusCode, Json<ScopedAsset>)> {
    let scoped = state.svc.link_engagement_asset(&id, link).await?;
    Ok((StatusCode::CREATED, Json(scoped)))
}

async fn report(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Report>> {
    Ok(Json(state.svc.assemble_report(&id).await?))
}

async fn export_markdown(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let (report, scope) = state.svc.assemble_report_with_scope(&id).await?;
    tracing::debug!(engagement_id = %id, "exporting markdown report");
    Ok((
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"engagement_{id}_report.md\""),
            ),
        ],
        export::render_markdown(&report, &scope),
    ))
}

async fn export_csv(
    _actor: CurrentActor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let report = state.svc.assemble_report(&id).await?;
    tracing::debug!(engagement_id = %id, "exporting findings csv");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"engagement_{id}_findings.csv\""),
            ),
        ],
        export::render_csv(&report),
    ))
}
