//! Engagement timeline: append-only, ordered by when events occurred.

use offsec_core::entities::TimelineEvent;
use offsec_core::identity::Actor;
use offsec_core::ids::PREFIX_TIMELINE;
use offsec_core::validation::{require_text, validate_storable};

use super::engagement;
use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{collect_rows, fmt_ts, get_opt_string, now, parse_datetime};
use crate::inputs::NewTimelineEvent;
use crate::service::OffsecService;

const SELECT: &str = "SELECT id, engagement_id, occurred_at, actor_id, event_type, description, \
     details FROM timeline_events";

fn row_to_event(row: &libsql::Row) -> Result<TimelineEvent, DatabaseError> {
    Ok(TimelineEvent {
        id: row.get::<String>(0)?,
        engagement_id: row.get::<String>(1)?,
        occurred_at: parse_datetime(&row.get::<String>(2)?)?,
        actor_id: get_opt_string(row, 3)?,
        event_type: row.get::<String>(4)?,
        description: row.get::<String>(5)?,
        details: get_opt_string(row, 6)?,
    })
}

async fn get(conn: &libsql::Connection, id: &str) -> Result<TimelineEvent, DatabaseError> {
    let mut rows = conn.query(&format!("{SELECT} WHERE id = ?1"), [id]).await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("timeline event", id))?;
    row_to_event(&row)
}

/// Events ordered by `occurred_at`, ties broken by insertion order.
pub(crate) async fn list_for_engagement(
    conn: &libsql::Connection,
    engagement_id: &str,
) -> Result<Vec<TimelineEvent>, DatabaseError> {
    let rows = conn
        .query(
            &format!("{SELECT} WHERE engagement_id = ?1 ORDER BY occurred_at, rowid"),
            [engagement_id],
        )
        .await?;
    collect_rows(rows, row_to_event).await
}

impl OffsecService {
    /// Append an event to an engagement's timeline, attributed to `actor`.
    pub async fn append_timeline_event(
        &self,
        actor: &Actor,
        engagement_id: &str,
        new: NewTimelineEvent,
    ) -> Result<TimelineEvent, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = async {
            engagement::get(&uow, engagement_id).await?;
            require_text("event_type", &new.event_type)?;
            require_text("description", &new.description)?;

            let occurred_at = new.occurred_at.unwrap_or_else(now);
            validate_storable("occurred_at", &occurred_at)?;
            let id = generate_id(&uow, PREFIX_TIMELINE).await?;
            uow.execute(
                "INSERT INTO timeline_events (id, engagement_id, occurred_at, actor_id, event_type,
                     description, details)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                libsql::params![
                    id.as_str(),
                    engagement_id,
                    fmt_ts(occurred_at),
                    actor.user_id.as_str(),
                    new.event_type.trim(),
                    new.description.trim(),
                    new.details.as_deref()
                ],
            )
            .await?;
            tracing::info!(engagement_id, event_id = %id, event_type = %new.event_type, "timeline event appended");
            get(&uow, &id).await
        }
        .await;
        uow.finish(result).await
    }

    pub async fn list_timeline(
        &self,
        engagement_id: &str,
    ) -> Result<Vec<TimelineEvent>, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = async {
            engagement::get(&uow, engagement_id).await?;
            list_for_engagement(&uow, engagement_id).await
        }
        .await;
        uow.finish(result).await
    }
}
