//! Intake queue repository.
//!
//! ```text
//! New → Reviewed → Promoted
//!  │        │
//!  └────────┴──→ Rejected → Promoted
//! ```
//!
//! Promotion inserts the engagement and flips the request to `Promoted` with
//! its link inside one unit of work. A promoted request never changes again.

use offsec_core::entities::{Engagement, IntakeRequest};
use offsec_core::enums::IntakeStatus;
use offsec_core::identity::Actor;
use offsec_core::ids::PREFIX_INTAKE;
use offsec_core::validation::require_text;

use super::engagement;
use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{
    collect_rows, fmt_ts, get_opt_string, now, parse_datetime, parse_enum, parse_optional_enum,
};
use crate::inputs::{NewEngagement, NewIntake, PromoteIntake};
use crate::service::OffsecService;

const SELECT: &str = "SELECT id, title, requester, requester_email, business_unit, system_name, \
     description, risk_level, desired_window, desired_type, status, linked_engagement_id, \
     created_by, created_at, updated_at FROM intake_requests";

fn row_to_intake(row: &libsql::Row) -> Result<IntakeRequest, DatabaseError> {
    Ok(IntakeRequest {
        id: row.get::<String>(0)?,
        title: row.get::<String>(1)?,
        requester: row.get::<String>(2)?,
        requester_email: get_opt_string(row, 3)?,
        business_unit: get_opt_string(row, 4)?,
        system_name: get_opt_string(row, 5)?,
        description: get_opt_string(row, 6)?,
        risk_level: parse_optional_enum(get_opt_string(row, 7)?.as_deref())?,
        desired_window: get_opt_string(row, 8)?,
        desired_type: parse_optional_enum(get_opt_string(row, 9)?.as_deref())?,
        status: parse_enum(&row.get::<String>(10)?)?,
        linked_engagement_id: get_opt_string(row, 11)?,
        created_by: get_opt_string(row, 12)?,
        created_at: parse_datetime(&row.get::<String>(13)?)?,
        updated_at: parse_datetime(&row.get::<String>(14)?)?,
    })
}

pub(crate) async fn get(
    conn: &libsql::Connection,
    id: &str,
) -> Result<IntakeRequest, DatabaseError> {
    let mut rows = conn.query(&format!("{SELECT} WHERE id = ?1"), [id]).await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("intake request", id))?;
    row_to_intake(&row)
}

/// Move a request to `next`. Re-applying the current status is a no-op;
/// any other transition not allowed from the current status is a conflict.
async fn transition(
    conn: &libsql::Connection,
    id: &str,
    next: IntakeStatus,
) -> Result<IntakeRequest, DatabaseError> {
    let current = get(conn, id).await?;
    if current.status == next {
        return Ok(current);
    }
    if !current.status.can_transition_to(next) {
        return Err(DatabaseError::Conflict(format!(
            "intake request {id} is {} and cannot become {next}",
            current.status
        )));
    }
    conn.execute(
        "UPDATE intake_requests SET status = ?1, updated_at = ?2 WHERE id = ?3",
        libsql::params![next.as_str(), fmt_ts(now()), id],
    )
    .await?;
    tracing::info!(intake_id = %id, from = %current.status, to = %next, "intake request transitioned");
    get(conn, id).await
}

impl OffsecService {
    /// Submit a request in status `New`.
    pub async fn create_intake(
        &self,
        actor: &Actor,
        new: NewIntake,
    ) -> Result<IntakeRequest, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = async {
            require_text("title", &new.title)?;
            require_text("requester", &new.requester)?;
            let id = generate_id(&uow, PREFIX_INTAKE).await?;
            let ts = fmt_ts(now());
            uow.execute(
                "INSERT INTO intake_requests (id, title, requester, requester_email, business_unit,
                     system_name, description, risk_level, desired_window, desired_type, status,
                     created_by, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                libsql::params![
                    id.as_str(),
                    new.title.trim(),
                    new.requester.trim(),
                    new.requester_email.as_deref(),
                    new.business_unit.as_deref(),
                    new.system_name.as_deref(),
                    new.description.as_deref(),
                    new.risk_level.map(|r| r.as_str()),
                    new.desired_window.as_deref(),
                    new.desired_type.map(|t| t.as_str()),
                    IntakeStatus::New.as_str(),
                    actor.user_id.as_str(),
                    ts.as_str(),
                    ts.as_str()
                ],
            )
            .await?;
            tracing::info!(intake_id = %id, "intake request created");
            get(&uow, &id).await
        }
        .await;
        uow.finish(result).await
    }

    pub async fn get_intake(&self, id: &str) -> Result<IntakeRequest, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = get(&uow, id).await;
        uow.finish(result).await
    }

    /// List requests newest first, optionally in one status.
    pub async fn list_intake(
        &self,
        status: Option<IntakeStatus>,
    ) -> Result<Vec<IntakeRequest>, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = async {
            let rows = match status {
                Some(s) => {
                    uow.query(
                        &format!("{SELECT} WHERE status = ?1 ORDER BY rowid DESC"),
                        [s.as_str()],
                    )
                    .await?
                }
                None => uow.query(&format!("{SELECT} ORDER BY rowid DESC"), ()).await?,
            };
            collect_rows(rows, row_to_intake).await
        }
        .await;
        uow.finish(result).await
    }

    pub async fn review_intake(&self, id: &str) -> Result<IntakeRequest, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = transition(&uow, id, IntakeStatus::Reviewed).await;
        uow.finish(result).await
    }

    /// Reject a request. Rejecting a rejected request returns it unchanged.
    pub async fn reject_intake(&self, id: &str) -> Result<IntakeRequest, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = transition(&uow, id, IntakeStatus::Rejected).await;
        uow.finish(result).await
    }

    /// Promote a request into a new engagement owned by `actor`.
    ///
    /// The engagement type defaults to the request's desired type and the
    /// name to its title. Fails with `Conflict` when already promoted; the
    /// engagement it was promoted into is left untouched.
    pub async fn promote_intake(
        &self,
        actor: &Actor,
        id: &str,
        fields: PromoteIntake,
    ) -> Result<Engagement, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = async {
            let intake = get(&uow, id).await?;
            if !intake.status.can_transition_to(IntakeStatus::Promoted) {
                return Err(DatabaseError::Conflict(format!(
                    "intake request {id} is already promoted into {}",
                    intake.linked_engagement_id.as_deref().unwrap_or("an engagement")
                )));
            }

            let engagement_type = fields
                .engagement_type
                .or(intake.desired_type)
                .ok_or_else(|| {
                    DatabaseError::Validation(format!(
                        "engagement_type is required: intake request {id} has no desired type"
                    ))
                })?;
            let mut new = NewEngagement::new(
                fields.program_year.clone(),
                engagement_type,
                fields.name.clone().unwrap_or_else(|| intake.title.clone()),
            );
            new.scope_summary = fields.scope_summary.clone().or(intake.description.clone());
            new.business_unit.clone_from(&intake.business_unit);
            new.start_date = fields.start_date;
            new.end_date = fields.end_date;
            new.objectives.clone_from(&fields.objectives);
            new.methodology.clone_from(&fields.methodology);

            let eng = engagement::insert(&uow, actor, &new).await?;

            let flipped = uow
                .execute(
                    "UPDATE intake_requests
                     SET status = ?1, linked_engagement_id = ?2, updated_at = ?3
                     WHERE id = ?4 AND status <> ?1",
                    libsql::params![
                        IntakeStatus::Promoted.as_str(),
                        eng.id.as_str(),
                        fmt_ts(now()),
                        id
                    ],
                )
                .await?;
            if flipped != 1 {
                return Err(DatabaseError::Conflict(format!(
                    "intake request {id} was promoted concurrently"
                )));
            }

            tracing::info!(intake_id = %id, engagement_id = %eng.id, "intake request promoted");
            Ok(eng)
        }
        .await;
        uow.finish(result).await
    }
}
