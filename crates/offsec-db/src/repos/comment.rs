//! Engagement comments, optionally attached to a finding of the same
//! engagement. Comments are never edited.

use offsec_core::entities::Comment;
use offsec_core::identity::Actor;
use offsec_core::ids::PREFIX_COMMENT;
use offsec_core::validation::require_text;

use super::{engagement, finding};
use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{collect_rows, fmt_ts, get_opt_string, now, parse_datetime};
use crate::inputs::NewComment;
use crate::service::OffsecService;

const SELECT: &str =
    "SELECT id, engagement_id, finding_id, author_id, body, created_at FROM comments";

fn row_to_comment(row: &libsql::Row) -> Result<Comment, DatabaseError> {
    Ok(Comment {
        id: row.get::<String>(0)?,
        engagement_id: row.get::<String>(1)?,
        finding_id: get_opt_string(row, 2)?,
        author_id: row.get::<String>(3)?,
        body: row.get::<String>(4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

async fn get(conn: &libsql::Connection, id: &str) -> Result<Comment, DatabaseError> {
    let mut rows = conn.query(&format!("{SELECT} WHERE id = ?1"), [id]).await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("comment", id))?;
    row_to_comment(&row)
}

pub(crate) async fn list_for_engagement(
    conn: &libsql::Connection,
    engagement_id: &str,
) -> Result<Vec<Comment>, DatabaseError> {
    let rows = conn
        .query(
            &format!("{SELECT} WHERE engagement_id = ?1 ORDER BY created_at, rowid"),
            [engagement_id],
        )
        .await?;
    collect_rows(rows, row_to_comment).await
}

impl OffsecService {
    /// Add a comment authored by `actor`.
    ///
    /// A `finding_id` must name a finding of the same engagement: a missing
    /// finding is `NotFound`, one from another engagement is `Validation`.
    pub async fn add_comment(
        &self,
        actor: &Actor,
        engagement_id: &str,
        new: NewComment,
    ) -> Result<Comment, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = async {
            engagement::get(&uow, engagement_id).await?;
            require_text("body", &new.body)?;
            if let Some(ref finding_id) = new.finding_id {
                let finding = finding::get(&uow, finding_id).await?;
                if finding.engagement_id != engagement_id {
                    return Err(DatabaseError::Validation(format!(
                        "finding {finding_id} belongs to engagement {}, not {engagement_id}",
                        finding.engagement_id
                    )));
                }
            }

            let id = generate_id(&uow, PREFIX_COMMENT).await?;
            uow.execute(
                "INSERT INTO comments (id, engagement_id, finding_id, author_id, body, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                libsql::params![
                    id.as_str(),
                    engagement_id,
                    new.finding_id.as_deref(),
                    actor.user_id.as_str(),
                    new.body.as_str(),
                    fmt_ts(now())
                ],
            )
            .await?;
            tracing::info!(engagement_id, comment_id = %id, "comment added");
            get(&uow, &id).await
        }
        .await;
        uow.finish(result).await
    }

    /// Comments of an engagement, oldest first.
    pub async fn list_comments(&self, engagement_id: &str) -> Result<Vec<Comment>, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = async {
            engagement::get(&uow, engagement_id).await?;
            list_for_engagement(&uow, engagement_id).await
        }
        .await;
        uow.finish(result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::NewFinding;
    use crate::test_support::{admin, test_actor, test_engagement, test_service};
    use offsec_core::enums::{Severity, UserRole};
    use pretty_assertions::assert_eq;

    fn note(body: &str) -> NewComment {
        NewComment {
            body: body.into(),
            finding_id: None,
        }
    }

    #[tokio::test]
    async fn comments_list_in_creation_order_with_authors() {
        let svc = test_service().await;
        let lead = admin(&svc).await;
        let blue = test_actor(&svc, "jayne", UserRole::Blue).await;
        let eng = test_engagement(&svc, &lead, "Checkout App Pentest").await;

        let first = svc.add_comment(&lead, &eng.id, note("Scope confirmed")).await.unwrap();
        let second = svc.add_comment(&blue, &eng.id, note("SOC notified")).await.unwrap();

        assert!(first.id.starts_with("cmt-"));
        assert_eq!(second.author_id, blue.user_id);
        let listed = svc.list_comments(&eng.id).await.unwrap();
        assert_eq!(listed, vec![first, second]);
    }

    #[tokio::test]
    async fn comment_on_finding_of_same_engagement() {
        let svc = test_service().await;
        let actor = admin(&svc).await;
        let eng = test_engagement(&svc, &actor, "Checkout App Pentest").await;
        let finding = svc
            .create_finding(&actor, &eng.id, NewFinding::new("SQLi in login", Severity::High))
            .await
            .unwrap();

        let c = svc
            .add_comment(
                &actor,
                &eng.id,
                NewComment {
                    body: "Retest scheduled".into(),
                    finding_id: Some(finding.id.clone()),
                },
            )
            .await
            .unwrap();
        assert_eq!(c.finding_id, Some(finding.id));
    }

    #[tokio::test]
    async fn comment_on_finding_of_other_engagement_is_rejected() {
        let svc = test_service().await;
        let actor = admin(&svc).await;
        let eng = test_engagement(&svc, &actor, "Checkout App Pentest").await;
        let other = test_engagement(&svc, &actor, "Payroll Review").await;
        let finding = svc
            .create_finding(&actor, &other.id, NewFinding::new("Weak TLS", Severity::Low))
            .await
            .unwrap();

        let err = svc
            .add_comment(
                &actor,
                &eng.id,
                NewComment {
                    body: "wrong place".into(),
                    finding_id: Some(finding.id),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
        assert!(svc.list_comments(&eng.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn comment_on_missing_finding_is_not_found() {
        let svc = test_service().await;
        let actor = admin(&svc).await;
        let eng = test_engagement(&svc, &actor, "Checkout App Pentest").await;
        let err = svc
            .add_comment(
                &actor,
                &eng.id,
                NewComment {
                    body: "x".into(),
                    finding_id: Some("fnd-missing".into()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[tokio::test]
    async fn empty_body_is_rejected() {
        let svc = test_service().await;
        let actor = admin(&svc).await;
        let eng = test_engagement(&svc, &actor, "Checkout App Pentest").await;
        let err = svc.add_comment(&actor, &eng.id, note("")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
    }
}
