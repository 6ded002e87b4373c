//! Route table. Each module owns one resource family.

use std::sync::Arc;

use axum::Router;

use crate::server::AppState;

pub mod assets;
pub mod engagements;
pub mod findings;
pub mod health;
pub mod intake;
pub mod program_years;
pub mod templates;
pub mod users;

/// Every API route, without state.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health::routes())
        .merge(users::routes())
        .merge(program_years::routes())
        .merge(engagements::routes())
        .merge(findings::routes())
        .merge(intake::routes())
        .merge(assets::routes())
        .merge(templates::routes())
}
