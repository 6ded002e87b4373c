//! Repository modules, one per entity.
//!
//! Each module exposes `pub(crate)` functions taking `&libsql::Connection`,
//! so they compose inside one unit of work, and an `impl OffsecService`
//! block whose public methods wrap them in a unit of work.

pub mod asset;
pub mod comment;
pub mod engagement;
pub mod finding;
pub mod intake;
pub mod program_year;
pub mod report;
pub mod template;
pub mod timeline;
pub mod user;
