//! Finding template library repository.
//!
//! Templates are copied by value into findings and never referenced by key,
//! so deleting one never touches existing findings.

use offsec_core::entities::FindingTemplate;
use offsec_core::identity::Actor;
use offsec_core::ids::PREFIX_TEMPLATE;
use offsec_core::validation::require_text;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{collect_rows, fmt_ts, get_opt_string, now, parse_datetime, parse_enum};
use crate::inputs::NewTemplate;
use crate::service::OffsecService;
use crate::updates::SetClauses;
use crate::updates::template::TemplateUpdate;

const SELECT: &str = "SELECT id, title, category, default_severity, description, impact, \
     recommendation, cwe_id, attack_techniques, refs, created_by, created_at, updated_at \
     FROM finding_templates";

fn row_to_template(row: &libsql::Row) -> Result<FindingTemplate, DatabaseError> {
    Ok(FindingTemplate {
        id: row.get::<String>(0)?,
        title: row.get::<String>(1)?,
        category: get_opt_string(row, 2)?,
        default_severity: parse_enum(&row.get::<String>(3)?)?,
        description: get_opt_string(row, 4)?,
        impact: get_opt_string(row, 5)?,
        recommendation: get_opt_string(row, 6)?,
        cwe_id: get_opt_string(row, 7)?,
        attack_techniques: get_opt_string(row, 8)?,
        references: get_opt_string(row, 9)?,
        created_by: get_opt_string(row, 10)?,
        created_at: parse_datetime(&row.get::<String>(11)?)?,
        updated_at: parse_datetime(&row.get::<String>(12)?)?,
    })
}

pub(crate) async fn get(
    conn: &libsql::Connection,
    id: &str,
) -> Result<FindingTemplate, DatabaseError> {
    let mut rows = conn.query(&format!("{SELECT} WHERE id = ?1"), [id]).await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("finding template", id))?;
    row_to_template(&row)
}

impl OffsecService {
    pub async fn create_template(
        &self,
        actor: &Actor,
        new: NewTemplate,
    ) -> Result<FindingTemplate, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = async {
            require_text("title", &new.title)?;
            let id = generate_id(&uow, PREFIX_TEMPLATE).await?;
            let ts = fmt_ts(now());
            uow.execute(
                "INSERT INTO finding_templates (id, title, category, default_severity, description, impact,
                     recommendation, cwe_id, attack_techniques, refs, created_by, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                libsql::params![
                    id.as_str(),
                    new.title.trim(),
                    new.category.as_deref(),
                    new.default_severity.as_str(),
                    new.description.as_deref(),
                    new.impact.as_deref(),
                    new.recommendation.as_deref(),
                    new.cwe_id.as_deref(),
                    new.attack_techniques.as_deref(),
                    new.references.as_deref(),
                    actor.user_id.as_str(),
                    ts.as_str(),
                    ts.as_str()
                ],
            )
            .await?;
            tracing::info!(template_id = %id, "finding template created");
            get(&uow, &id).await
        }
        .await;
        uow.finish(result).await
    }

    pub async fn get_template(&self, id: &str) -> Result<FindingTemplate, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = get(&uow, id).await;
        uow.finish(result).await
    }

    /// List templates in creation order, optionally within one category.
    pub async fn list_templates(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<FindingTemplate>, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = async {
            let rows = match category {
                Some(c) => {
                    uow.query(&format!("{SELECT} WHERE category = ?1 ORDER BY rowid"), [c])
                        .await?
                }
                None => uow.query(&format!("{SELECT} ORDER BY rowid"), ()).await?,
            };
            collect_rows(rows, row_to_template).await
        }
        .await;
        uow.finish(result).await
    }

    pub async fn update_template(
        &self,
        id: &str,
        update: TemplateUpdate,
    ) -> Result<FindingTemplate, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = async {
            get(&uow, id).await?;

            let mut sets = SetClauses::default();
            if let Some(ref title) = update.title {
                require_text("title", title)?;
                sets.push("title", title.trim());
            }
            if let Some(severity) = update.default_severity {
                sets.push("default_severity", severity.as_str());
            }
            let text_fields = [
                ("category", &update.category),
                ("description", &update.description),
                ("impact", &update.impact),
                ("recommendation", &update.recommendation),
                ("cwe_id", &update.cwe_id),
                ("attack_techniques", &update.attack_techniques),
                ("refs", &update.references),
            ];
            for (column, value) in text_fields {
                if let Some(value) = value {
                    sets.push(column, value.as_deref());
                }
            }
            if sets.is_empty() {
                return get(&uow, id).await;
            }
            sets.push("updated_at", fmt_ts(now()));

            let (sql, params) = sets.into_sql("finding_templates", id);
            uow.execute(&sql, libsql::params_from_iter(params)).await?;
            tracing::info!(template_id = %id, "finding template updated");
            get(&uow, id).await
        }
        .await;
        uow.finish(result).await
    }

    pub async fn delete_template(&self, id: &str) -> Result<(), DatabaseError> {
        let uow = self.db().begin().await?;
        let result = async {
            let deleted = uow
                .execute("DELETE FROM finding_templates WHERE id = ?1", [id])
                .await?;
            if deleted == 0 {
                return Err(DatabaseError::not_found("finding template", id));
            }
            tracing::info!(template_id = %id, "finding template deleted");
            Ok(())
        }
        .await;
        uow.finish(result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{admin, test_service};
    use crate::updates::template::TemplateUpdateBuilder;
    use offsec_core::enums::Severity;

    fn default_creds() -> NewTemplate {
        let mut new = NewTemplate::new("Default credentials", Severity::Critical);
        new.category = Some("Network".into());
        new.cwe_id = Some("CWE-1392".into());
        new.references = Some("https://cwe.mitre.org/data/definitions/1392.html".into());
        new
    }

    #[tokio::test]
    async fn create_template_roundtrip() {
        let svc = test_service().await;
        let actor = admin(&svc).await;
        let tpl = svc.create_template(&actor, default_creds()).await.unwrap();

        assert!(tpl.id.starts_with("tpl-"));
        assert_eq!(tpl.default_severity, Severity::Critical);
        assert_eq!(tpl.created_by.as_deref(), Some(actor.user_id.as_str()));
        assert_eq!(svc.get_template(&tpl.id).await.unwrap(), tpl);
    }

    #[tokio::test]
    async fn list_filters_by_category() {
        let svc = test_service().await;
        let actor = admin(&svc).await;
        svc.create_template(&actor, default_creds()).await.unwrap();
        let mut web = NewTemplate::new("Reflected XSS", Severity::Medium);
        web.category = Some("Web".into());
        svc.create_template(&actor, web).await.unwrap();

        assert_eq!(svc.list_templates(None).await.unwrap().len(), 2);
        let web_only = svc.list_templates(Some("Web")).await.unwrap();
        assert_eq!(web_only.len(), 1);
        assert_eq!(web_only[0].title, "Reflected XSS");
    }

    #[tokio::test]
    async fn update_template_fields() {
        let svc = test_service().await;
        let actor = admin(&svc).await;
        let tpl = svc.create_template(&actor, default_creds()).await.unwrap();

        let update = TemplateUpdateBuilder::new()
            .default_severity(Severity::High)
            .category(None)
            .build();
        let updated = svc.update_template(&tpl.id, update).await.unwrap();
        assert_eq!(updated.default_severity, Severity::High);
        assert_eq!(updated.category, None);
        assert_eq!(updated.cwe_id.as_deref(), Some("CWE-1392"));
    }

    #[tokio::test]
    async fn delete_template_then_not_found() {
        let svc = test_service().await;
        let actor = admin(&svc).await;
        let tpl = svc.create_template(&actor, default_creds()).await.unwrap();

        svc.delete_template(&tpl.id).await.unwrap();
        let err = svc.get_template(&tpl.id).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
        let err = svc.delete_template(&tpl.id).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }
}
