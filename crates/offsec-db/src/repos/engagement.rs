//! Engagement aggregate repository: creation, partial update, filtered
//! listing, and scope links to catalog assets.

use serde::{Deserialize, Serialize};

use offsec_core::entities::{Engagement, ScopedAsset};
use offsec_core::enums::{EngagementStatus, EngagementType};
use offsec_core::identity::Actor;
use offsec_core::ids::PREFIX_ENGAGEMENT;
use offsec_core::validation::{require_text, validate_date_range};

use super::asset::{ASSET_COLUMNS, ASSET_COLUMN_COUNT, row_to_asset};
use super::program_year;
use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{
    collect_rows, fmt_date, fmt_ts, get_opt_string, now, parse_datetime, parse_enum,
    parse_optional_date,
};
use crate::inputs::{NewEngagement, ScopeLink};
use crate::service::OffsecService;
use crate::updates::SetClauses;
use crate::updates::engagement::EngagementUpdate;

const SELECT: &str = "SELECT e.id, e.program_year_id, p.year, e.engagement_type, e.name, \
     e.scope_summary, e.status, e.start_date, e.end_date, e.business_unit, e.owner_id, \
     e.objectives, e.methodology, e.exec_summary, e.recommendations_overall, \
     e.created_at, e.updated_at \
     FROM engagements e JOIN program_years p ON p.id = e.program_year_id";

/// Optional filters for listing engagements. All given filters must match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngagementFilter {
    pub program_year: Option<String>,
    pub engagement_type: Option<EngagementType>,
    pub status: Option<EngagementStatus>,
}

fn row_to_engagement(row: &libsql::Row) -> Result<Engagement, DatabaseError> {
    Ok(Engagement {
        id: row.get::<String>(0)?,
        program_year_id: row.get::<String>(1)?,
        program_year: row.get::<String>(2)?,
        engagement_type: parse_enum(&row.get::<String>(3)?)?,
        name: row.get::<String>(4)?,
        scope_summary: get_opt_string(row, 5)?,
        status: parse_enum(&row.get::<String>(6)?)?,
        start_date: parse_optional_date(get_opt_string(row, 7)?.as_deref())?,
        end_date: parse_optional_date(get_opt_string(row, 8)?.as_deref())?,
        business_unit: get_opt_string(row, 9)?,
        owner_id: get_opt_string(row, 10)?,
        objectives: get_opt_string(row, 11)?,
        methodology: get_opt_string(row, 12)?,
        exec_summary: get_opt_string(row, 13)?,
        recommendations_overall: get_opt_string(row, 14)?,
        created_at: parse_datetime(&row.get::<String>(15)?)?,
        updated_at: parse_datetime(&row.get::<String>(16)?)?,
    })
}

pub(crate) async fn get(conn: &libsql::Connection, id: &str) -> Result<Engagement, DatabaseError> {
    let mut rows = conn.query(&format!("{SELECT} WHERE e.id = ?1"), [id]).await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("engagement", id))?;
    row_to_engagement(&row)
}

/// Insert an engagement in status `Planned`, creating its program year by
/// label when missing.
pub(crate) async fn insert(
    conn: &libsql::Connection,
    actor: &Actor,
    new: &NewEngagement,
) -> Result<Engagement, DatabaseError> {
    require_text("name", &new.name)?;
    validate_date_range(new.start_date, new.end_date)?;

    let year = program_year::get_or_create(conn, &new.program_year).await?;
    let id = generate_id(conn, PREFIX_ENGAGEMENT).await?;
    let ts = fmt_ts(now());

    conn.execute(
        "INSERT INTO engagements (id, program_year_id, engagement_type, name, scope_summary, status,
             start_date, end_date, business_unit, owner_id, objectives, methodology, exec_summary,
             recommendations_overall, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        libsql::params![
            id.as_str(),
            year.id.as_str(),
            new.engagement_type.as_str(),
            new.name.trim(),
            new.scope_summary.as_deref(),
            EngagementStatus::Planned.as_str(),
            new.start_date.map(fmt_date),
            new.end_date.map(fmt_date),
            new.business_unit.as_deref(),
            actor.user_id.as_str(),
            new.objectives.as_deref(),
            new.methodology.as_deref(),
            new.exec_summary.as_deref(),
            new.recommendations_overall.as_deref(),
            ts.as_str(),
            ts.as_str()
        ],
    )
    .await?;

    tracing::info!(
        engagement_id = %id,
        program_year = %year.year,
        engagement_type = %new.engagement_type,
        owner = %actor.user_id,
        "engagement created"
    );
    get(conn, &id).await
}

pub(crate) async fn apply_update(
    conn: &libsql::Connection,
    id: &str,
    update: &EngagementUpdate,
) -> Result<Engagement, DatabaseError> {
    let current = get(conn, id).await?;

    if let Some(ref year) = update.program_year {
        if year.trim() != current.program_year {
            return Err(DatabaseError::Validation(format!(
                "program_year is immutable: engagement {id} belongs to {}",
                current.program_year
            )));
        }
    }

    let start = update.start_date.unwrap_or(current.start_date);
    let end = update.end_date.unwrap_or(current.end_date);
    validate_date_range(start, end)?;

    let mut sets = SetClauses::default();
    if let Some(engagement_type) = update.engagement_type {
        sets.push("engagement_type", engagement_type.as_str());
    }
    if let Some(ref name) = update.name {
        require_text("name", name)?;
        sets.push("name", name.trim());
    }
    if let Some(status) = update.status {
        sets.push("status", status.as_str());
    }
    if let Some(ref scope_summary) = update.scope_summary {
        sets.push("scope_summary", scope_summary.as_deref());
    }
    if let Some(start_date) = update.start_date {
        sets.push("start_date", start_date.map(fmt_date));
    }
    if let Some(end_date) = update.end_date {
        sets.push("end_date", end_date.map(fmt_date));
    }
    if let Some(ref business_unit) = update.business_unit {
        sets.push("business_unit", business_unit.as_deref());
    }
    if let Some(ref objectives) = update.objectives {
        sets.push("objectives", objectives.as_deref());
    }
    if let Some(ref methodology) = update.methodology {
        sets.push("methodology", methodology.as_deref());
    }
    if let Some(ref exec_summary) = update.exec_summary {
        sets.push("exec_summary", exec_summary.as_deref());
    }
    if let Some(ref recommendations_overall) = update.recommendations_overall {
        sets.push("recommendations_overall", recommendations_overall.as_deref());
    }

    if sets.is_empty() {
        return Ok(current);
    }
    sets.push("updated_at", fmt_ts(now()));

    let (sql, params) = sets.into_sql("engagements", id);
    conn.execute(&sql, libsql::params_from_iter(params)).await?;
    tracing::info!(engagement_id = %id, "engagement updated");
    get(conn, id).await
}

pub(crate) async fn list(
    conn: &libsql::Connection,
    filter: &EngagementFilter,
) -> Result<Vec<Engagement>, DatabaseError> {
    let mut clauses = Vec::new();
    let mut params: Vec<libsql::Value> = Vec::new();

    if let Some(ref year) = filter.program_year {
        params.push(year.trim().into());
        clauses.push(format!("p.year = ?{}", params.len()));
    }
    if let Some(engagement_type) = filter.engagement_type {
        params.push(engagement_type.as_str().into());
        clauses.push(format!("e.engagement_type = ?{}", params.len()));
    }
    if let Some(status) = filter.status {
        params.push(status.as_str().into());
        clauses.push(format!("e.status = ?{}", params.len()));
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    let rows = conn
        .query(
            &format!("{SELECT}{where_clause} ORDER BY e.rowid"),
            libsql::params_from_iter(params),
        )
        .await?;
    collect_rows(rows, row_to_engagement).await
}

fn row_to_scoped_asset(row: &libsql::Row) -> Result<ScopedAsset, DatabaseError> {
    Ok(ScopedAsset {
        asset: row_to_asset(row)?,
        role: get_opt_string(row, ASSET_COLUMN_COUNT)?,
        notes: get_opt_string(row, ASSET_COLUMN_COUNT + 1)?,
    })
}

pub(crate) async fn list_scope(
    conn: &libsql::Connection,
    engagement_id: &str,
) -> Result<Vec<ScopedAsset>, DatabaseError> {
    let rows = conn
        .query(
            &format!(
                "SELECT {ASSET_COLUMNS}, ea.role, ea.notes FROM engagement_assets ea
                 JOIN assets a ON a.id = ea.asset_id
                 WHERE ea.engagement_id = ?1 ORDER BY ea.rowid"
            ),
            [engagement_id],
        )
        .await?;
    collect_rows(rows, row_to_scoped_asset).await
}

impl OffsecService {
    /// Create an engagement owned by `actor`, in status `Planned`.
    pub async fn create_engagement(
        &self,
        actor: &Actor,
        new: NewEngagement,
    ) -> Result<Engagement, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = insert(&uow, actor, &new).await;
        uow.finish(result).await
    }

    pub async fn get_engagement(&self, id: &str) -> Result<Engagement, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = get(&uow, id).await;
        uow.finish(result).await
    }

    /// Apply a partial update. The program year cannot change.
    pub async fn update_engagement(
        &self,
        id: &str,
        update: EngagementUpdate,
    ) -> Result<Engagement, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = apply_update(&uow, id, &update).await;
        uow.finish(result).await
    }

    /// List engagements in creation order.
    pub async fn list_engagements(
        &self,
        filter: &EngagementFilter,
    ) -> Result<Vec<Engagement>, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = list(&uow, filter).await;
        uow.finish(result).await
    }

    /// Link a catalog asset into an engagement's scope. Re-linking the same
    /// asset replaces its role and notes.
    pub async fn link_engagement_asset(
        &self,
        engagement_id: &str,
        link: ScopeLink,
    ) -> Result<ScopedAsset, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = async {
            get(&uow, engagement_id).await?;
            let asset = super::asset::get(&uow, &link.asset_id).await?;
            uow.execute(
                "INSERT INTO engagement_assets (engagement_id, asset_id, role, notes)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (engagement_id, asset_id)
                 DO UPDATE SET role = excluded.role, notes = excluded.notes",
                libsql::params![
                    engagement_id,
                    link.asset_id.as_str(),
                    link.role.as_deref(),
                    link.notes.as_deref()
                ],
            )
            .await?;
            tracing::info!(engagement_id, asset_id = %link.asset_id, "asset linked to engagement scope");
            Ok(ScopedAsset {
                asset,
                role: link.role.clone(),
                notes: link.notes.clone(),
            })
        }
        .await;
        uow.finish(result).await
    }

    /// Assets in an engagement's scope, in link order.
    pub async fn list_engagement_assets(
        &self,
        engagement_id: &str,
    ) -> Result<Vec<ScopedAsset>, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = async {
            get(&uow, engagement_id).await?;
            list_scope(&uow, engagement_id).await
        }
        .await;
        uow.finish(result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{admin, test_asset, test_engagement, test_service};
    use crate::updates::engagement::EngagementUpdateBuilder;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn create_engagement_is_planned_and_owned() {
        let svc = test_service().await;
        let actor = admin(&svc).await;
        let eng = test_engagement(&svc, &actor, "Checkout App Pentest").await;

        assert!(eng.id.starts_with("eng-"));
        assert_eq!(eng.status, EngagementStatus::Planned);
        assert_eq!(eng.engagement_type, EngagementType::WebApp);
        assert_eq!(eng.program_year, "2025");
        assert_eq!(eng.owner_id.as_deref(), Some(actor.user_id.as_str()));
    }

    #[tokio::test]
    async fn create_reuses_existing_program_year() {
        let svc = test_service().await;
        let actor = admin(&svc).await;
        let a = test_engagement(&svc, &actor, "A").await;
        let b = test_engagement(&svc, &actor, "B").await;
        assert_eq!(a.program_year_id, b.program_year_id);
        assert_eq!(svc.list_program_years().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn partial_update_merges_and_keeps_program_year() {
        let svc = test_service().await;
        let actor = admin(&svc).await;
        let eng = test_engagement(&svc, &actor, "Checkout App Pentest").await;

        let update = EngagementUpdateBuilder::new()
            .status(EngagementStatus::InProgress)
            .methodology(Some("OWASP WSTG".into()))
            .build();
        svc.update_engagement(&eng.id, update).await.unwrap();

        let fetched = svc.get_engagement(&eng.id).await.unwrap();
        assert_eq!(fetched.status, EngagementStatus::InProgress);
        assert_eq!(fetched.methodology.as_deref(), Some("OWASP WSTG"));
        assert_eq!(fetched.name, "Checkout App Pentest");
        assert_eq!(fetched.program_year, eng.program_year);
        assert_eq!(fetched.program_year_id, eng.program_year_id);
    }

    #[tokio::test]
    async fn changing_program_year_is_rejected() {
        let svc = test_service().await;
        let actor = admin(&svc).await;
        let eng = test_engagement(&svc, &actor, "E").await;

        let err = svc
            .update_engagement(&eng.id, EngagementUpdateBuilder::new().program_year("2026").build())
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)), "got {err:?}");

        // Repeating the current label is accepted.
        svc.update_engagement(&eng.id, EngagementUpdateBuilder::new().program_year("2025").build())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn inverted_dates_are_rejected() {
        let svc = test_service().await;
        let actor = admin(&svc).await;
        let eng = test_engagement(&svc, &actor, "E").await;
        let update = EngagementUpdateBuilder::new()
            .start_date(NaiveDate::from_ymd_opt(2025, 5, 1))
            .end_date(NaiveDate::from_ymd_opt(2025, 4, 1))
            .build();
        let err = svc.update_engagement(&eng.id, update).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_engagement_is_not_found() {
        let svc = test_service().await;
        let err = svc.get_engagement("eng-00000000").await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { entity: "engagement", .. }));
        let err = svc
            .update_engagement("eng-00000000", EngagementUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[tokio::test]
    async fn list_filters_and_keeps_creation_order() {
        let svc = test_service().await;
        let actor = admin(&svc).await;
        let first = test_engagement(&svc, &actor, "First").await;
        svc.create_engagement(&actor, NewEngagement::new("2026", EngagementType::Pci, "Card env"))
            .await
            .unwrap();
        let third = test_engagement(&svc, &actor, "Third").await;
        svc.update_engagement(
            &third.id,
            EngagementUpdateBuilder::new().status(EngagementStatus::Reporting).build(),
        )
        .await
        .unwrap();

        let all = svc.list_engagements(&EngagementFilter::default()).await.unwrap();
        let names: Vec<&str> = all.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Card env", "Third"]);

        let in_2025 = svc
            .list_engagements(&EngagementFilter {
                program_year: Some("2025".into()),
                ..EngagementFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(in_2025.len(), 2);
        assert_eq!(in_2025[0].id, first.id);

        let reporting_webapp = svc
            .list_engagements(&EngagementFilter {
                program_year: None,
                engagement_type: Some(EngagementType::WebApp),
                status: Some(EngagementStatus::Reporting),
            })
            .await
            .unwrap();
        assert_eq!(reporting_webapp.len(), 1);
        assert_eq!(reporting_webapp[0].id, third.id);
    }

    #[tokio::test]
    async fn scope_links_are_upserted() {
        let svc = test_service().await;
        let actor = admin(&svc).await;
        let eng = test_engagement(&svc, &actor, "E").await;
        let asset = test_asset(&svc, "nickel.corp.local").await;

        svc.link_engagement_asset(
            &eng.id,
            ScopeLink {
                asset_id: asset.id.clone(),
                role: Some("Supporting".into()),
                notes: None,
            },
        )
        .await
        .unwrap();
        svc.link_engagement_asset(
            &eng.id,
            ScopeLink {
                asset_id: asset.id.clone(),
                role: Some("Primary".into()),
                notes: Some("jump host".into()),
            },
        )
        .await
        .unwrap();

        let scope = svc.list_engagement_assets(&eng.id).await.unwrap();
        assert_eq!(scope.len(), 1);
        assert_eq!(scope[0].asset, asset);
        assert_eq!(scope[0].role.as_deref(), Some("Primary"));
        assert_eq!(scope[0].notes.as_deref(), Some("jump host"));
    }

    #[tokio::test]
    async fn linking_missing_asset_is_not_found() {
        let svc = test_service().await;
        let actor = admin(&svc).await;
        let eng = test_engagement(&svc, &actor, "E").await;
        let err = svc
            .link_engagement_asset(
                &eng.id,
                ScopeLink {
                    asset_id: "ast-00000000".into(),
                    ..ScopeLink::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { entity: "asset", .. }));
    }
}
