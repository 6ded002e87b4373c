//! Entity structs for all offsec domain objects.
//!
//! Each entity maps to a table in the libSQL database (see `001_initial.sql`
//! in `offsec-db`). All structs derive `Serialize`, `Deserialize`, and
//! `JsonSchema` for JSON roundtrip and schema validation. Relations are carried
//! as ids; no entity embeds its parent.

mod asset;
mod comment;
mod engagement;
mod finding;
mod intake;
mod program_year;
mod report;
mod template;
mod timeline;
mod user;

pub use asset::{Asset, ScopedAsset};
pub use comment::Comment;
pub use engagement::Engagement;
pub use finding::Finding;
pub use intake::IntakeRequest;
pub use program_year::ProgramYear;
pub use report::{Report, ReportFinding, SeverityCount};
pub use template::FindingTemplate;
pub use timeline::TimelineEvent;
pub use user::{IssuedToken, User};
