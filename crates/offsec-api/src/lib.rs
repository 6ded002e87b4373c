//! # offsec-api
//!
//! JSON-over-HTTP API for the offsec program tracker.
//!
//! Routes map one-to-one onto [`offsec_db::service::OffsecService`]
//! operations. Errors from every layer convert into [`error::ApiError`],
//! which renders `{ "code", "message" }` with the matching status.

pub mod context;
pub mod error;
pub mod export;
pub mod extract;
pub mod routes;
pub mod server;

pub use server::{AppState, router, serve};
