//! Finding ledger repository.
//!
//! Findings belong to exactly one engagement, fixed at creation, and link to
//! zero or more catalog assets through `finding_assets`. The asset set is
//! written in the same unit of work as the finding row, so a finding is never
//! visible with half its links.

use offsec_core::entities::Finding;
use offsec_core::identity::Actor;
use offsec_core::ids::PREFIX_FINDING;
use offsec_core::validation::{require_text, validate_due_date};

use super::{asset, engagement, template};
use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{
    collect_rows, fmt_date, fmt_ts, get_opt_string, now, parse_datetime, parse_enum,
    parse_optional_date, parse_optional_enum, today,
};
use crate::inputs::{FromTemplate, NewFinding};
use crate::service::OffsecService;
use crate::updates::SetClauses;
use crate::updates::finding::FindingUpdate;

const SELECT: &str = "SELECT id, engagement_id, title, description, severity, status, impact, \
     poc, recommendation, attack_techniques, remediation_status, remediation_owner, due_date, \
     detection_status, detection_notes, risk_accepted, risk_accepted_notes, created_by, \
     created_at, updated_at FROM findings";

/// Map a finding row. `asset_ids` is filled in by [`load_asset_ids`].
fn row_to_finding(row: &libsql::Row) -> Result<Finding, DatabaseError> {
    Ok(Finding {
        id: row.get::<String>(0)?,
        engagement_id: row.get::<String>(1)?,
        title: row.get::<String>(2)?,
        description: get_opt_string(row, 3)?,
        severity: parse_enum(&row.get::<String>(4)?)?,
        status: parse_enum(&row.get::<String>(5)?)?,
        impact: get_opt_string(row, 6)?,
        poc: get_opt_string(row, 7)?,
        recommendation: get_opt_string(row, 8)?,
        attack_techniques: get_opt_string(row, 9)?,
        remediation_status: parse_enum(&row.get::<String>(10)?)?,
        remediation_owner: get_opt_string(row, 11)?,
        due_date: parse_optional_date(get_opt_string(row, 12)?.as_deref())?,
        detection_status: parse_optional_enum(get_opt_string(row, 13)?.as_deref())?,
        detection_notes: get_opt_string(row, 14)?,
        risk_accepted: row.get::<i64>(15)? != 0,
        risk_accepted_notes: get_opt_string(row, 16)?,
        created_by: get_opt_string(row, 17)?,
        asset_ids: Vec::new(),
        created_at: parse_datetime(&row.get::<String>(18)?)?,
        updated_at: parse_datetime(&row.get::<String>(19)?)?,
    })
}

async fn load_asset_ids(
    conn: &libsql::Connection,
    finding: &mut Finding,
) -> Result<(), DatabaseError> {
    let rows = conn
        .query(
            "SELECT asset_id FROM finding_assets WHERE finding_id = ?1 ORDER BY rowid",
            [finding.id.as_str()],
        )
        .await?;
    finding.asset_ids = collect_rows(rows, |row| Ok(row.get::<String>(0)?)).await?;
    Ok(())
}

/// Collapse duplicate ids, keeping the first occurrence of each.
fn dedupe(ids: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(id.clone());
        }
    }
    out
}

/// Replace the finding's asset set. Callers check the ids exist first.
async fn replace_assets(
    conn: &libsql::Connection,
    finding_id: &str,
    asset_ids: &[String],
) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM finding_assets WHERE finding_id = ?1", [finding_id])
        .await?;
    for asset_id in asset_ids {
        conn.execute(
            "INSERT INTO finding_assets (finding_id, asset_id) VALUES (?1, ?2)",
            [finding_id, asset_id.as_str()],
        )
        .await?;
    }
    Ok(())
}

pub(crate) async fn get(conn: &libsql::Connection, id: &str) -> Result<Finding, DatabaseError> {
    let mut rows = conn.query(&format!("{SELECT} WHERE id = ?1"), [id]).await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("finding", id))?;
    let mut finding = row_to_finding(&row)?;
    load_asset_ids(conn, &mut finding).await?;
    Ok(finding)
}

/// Findings of an engagement in creation order. Callers check the
/// engagement exists.
pub(crate) async fn list_for_engagement(
    conn: &libsql::Connection,
    engagement_id: &str,
) -> Result<Vec<Finding>, DatabaseError> {
    let rows = conn
        .query(
            &format!("{SELECT} WHERE engagement_id = ?1 ORDER BY rowid"),
            [engagement_id],
        )
        .await?;
    let mut findings = collect_rows(rows, row_to_finding).await?;
    for finding in &mut findings {
        load_asset_ids(conn, finding).await?;
    }
    Ok(findings)
}

pub(crate) async fn insert(
    conn: &libsql::Connection,
    actor: &Actor,
    engagement_id: &str,
    new: &NewFinding,
) -> Result<Finding, DatabaseError> {
    engagement::get(conn, engagement_id).await?;
    require_text("title", &new.title)?;

    if let Some(due) = new.due_date {
        validate_due_date(due, today())?;
    }

    let asset_ids = dedupe(&new.asset_ids);
    asset::ensure_all_exist(conn, &asset_ids).await?;

    let id = generate_id(conn, PREFIX_FINDING).await?;
    let ts = fmt_ts(now());
    conn.execute(
        "INSERT INTO findings (id, engagement_id, title, description, severity, status, impact, poc,
             recommendation, attack_techniques, remediation_status, remediation_owner, due_date,
             detection_status, detection_notes, risk_accepted, risk_accepted_notes, created_by,
             created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
        libsql::params![
            id.as_str(),
            engagement_id,
            new.title.trim(),
            new.description.as_deref(),
            new.severity.as_str(),
            new.status.as_str(),
            new.impact.as_deref(),
            new.poc.as_deref(),
            new.recommendation.as_deref(),
            new.attack_techniques.as_deref(),
            new.remediation_status.as_str(),
            new.remediation_owner.as_deref(),
            new.due_date.map(fmt_date),
            new.detection_status.map(|d| d.as_str()),
            new.detection_notes.as_deref(),
            i64::from(new.risk_accepted),
            new.risk_accepted_notes.as_deref(),
            actor.user_id.as_str(),
            ts.as_str(),
            ts.as_str()
        ],
    )
    .await?;
    replace_assets(conn, &id, &asset_ids).await?;

    tracing::info!(
        finding_id = %id,
        engagement_id,
        severity = %new.severity,
        assets = asset_ids.len(),
        "finding created"
    );
    get(conn, &id).await
}

pub(crate) async fn apply_update(
    conn: &libsql::Connection,
    id: &str,
    update: &FindingUpdate,
) -> Result<Finding, DatabaseError> {
    let current = get(conn, id).await?;

    if let Some(ref engagement_id) = update.engagement_id {
        if *engagement_id != current.engagement_id {
            return Err(DatabaseError::Validation(format!(
                "engagement_id is immutable: finding {id} belongs to {}",
                current.engagement_id
            )));
        }
    }
    if let Some(Some(due)) = update.due_date {
        validate_due_date(due, current.created_at.date_naive())?;
    }

    let mut sets = SetClauses::default();
    if let Some(ref title) = update.title {
        require_text("title", title)?;
        sets.push("title", title.trim());
    }
    if let Some(severity) = update.severity {
        sets.push("severity", severity.as_str());
    }
    if let Some(status) = update.status {
        sets.push("status", status.as_str());
    }
    if let Some(remediation_status) = update.remediation_status {
        sets.push("remediation_status", remediation_status.as_str());
    }
    if let Some(due_date) = update.due_date {
        sets.push("due_date", due_date.map(fmt_date));
    }
    if let Some(detection_status) = update.detection_status {
        sets.push("detection_status", detection_status.map(|d| d.as_str()));
    }
    if let Some(risk_accepted) = update.risk_accepted {
        sets.push("risk_accepted", i64::from(risk_accepted));
    }
    let text_fields = [
        ("description", &update.description),
        ("impact", &update.impact),
        ("poc", &update.poc),
        ("recommendation", &update.recommendation),
        ("attack_techniques", &update.attack_techniques),
        ("remediation_owner", &update.remediation_owner),
        ("detection_notes", &update.detection_notes),
        ("risk_accepted_notes", &update.risk_accepted_notes),
    ];
    for (column, value) in text_fields {
        if let Some(value) = value {
            sets.push(column, value.as_deref());
        }
    }

    let asset_ids = update.asset_ids.as_deref().map(dedupe);
    if let Some(ref ids) = asset_ids {
        asset::ensure_all_exist(conn, ids).await?;
    }

    if sets.is_empty() && asset_ids.is_none() {
        return Ok(current);
    }
    sets.push("updated_at", fmt_ts(now()));
    let (sql, params) = sets.into_sql("findings", id);
    conn.execute(&sql, libsql::params_from_iter(params)).await?;

    if let Some(ref ids) = asset_ids {
        replace_assets(conn, id, ids).await?;
    }

    tracing::info!(finding_id = %id, "finding updated");
    get(conn, id).await
}

impl OffsecService {
    /// Record a finding against an engagement.
    ///
    /// Fails with `NotFound` when the engagement or any asset is missing, in
    /// which case nothing is written.
    pub async fn create_finding(
        &self,
        actor: &Actor,
        engagement_id: &str,
        new: NewFinding,
    ) -> Result<Finding, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = insert(&uow, actor, engagement_id, &new).await;
        uow.finish(result).await
    }

    pub async fn get_finding(&self, id: &str) -> Result<Finding, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = get(&uow, id).await;
        uow.finish(result).await
    }

    /// Apply a partial update. Field changes and asset replacement commit
    /// together.
    pub async fn update_finding(
        &self,
        id: &str,
        update: FindingUpdate,
    ) -> Result<Finding, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = apply_update(&uow, id, &update).await;
        uow.finish(result).await
    }

    /// Findings of an engagement in creation order.
    pub async fn list_findings(&self, engagement_id: &str) -> Result<Vec<Finding>, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = async {
            engagement::get(&uow, engagement_id).await?;
            list_for_engagement(&uow, engagement_id).await
        }
        .await;
        uow.finish(result).await
    }

    /// Instantiate a finding from a template's text. The finding keeps no
    /// reference to the template.
    pub async fn create_finding_from_template(
        &self,
        actor: &Actor,
        engagement_id: &str,
        from: FromTemplate,
    ) -> Result<Finding, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = async {
            let tpl = template::get(&uow, &from.template_id).await?;
            let mut new = NewFinding::new(
                from.title.clone().unwrap_or(tpl.title),
                from.severity.unwrap_or(tpl.default_severity),
            );
            new.status = from.status.unwrap_or_default();
            new.description = tpl.description;
            new.impact = tpl.impact;
            new.recommendation = tpl.recommendation;
            new.attack_techniques = tpl.attack_techniques;
            new.poc.clone_from(&from.poc);
            new.due_date = from.due_date;
            new.asset_ids.clone_from(&from.asset_ids);
            insert(&uow, actor, engagement_id, &new).await
        }
        .await;
        uow.finish(result).await
    }
}
