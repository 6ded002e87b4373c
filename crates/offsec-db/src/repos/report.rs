//! Report assembly: one engagement with its findings (assets expanded),
//! timeline and comments, read inside a single unit of work so the snapshot
//! is consistent.

use offsec_core::entities::{Report, ReportFinding, ScopedAsset};

use super::{asset, comment, engagement, finding, timeline};
use crate::error::DatabaseError;
use crate::service::OffsecService;

pub(crate) async fn assemble(
    conn: &libsql::Connection,
    engagement_id: &str,
) -> Result<Report, DatabaseError> {
    let engagement = engagement::get(conn, engagement_id).await?;

    let mut findings = Vec::new();
    for f in finding::list_for_engagement(conn, engagement_id).await? {
        let assets = asset::list_for_finding(conn, &f.id).await?;
        findings.push(ReportFinding { finding: f, assets });
    }
    let timeline = timeline::list_for_engagement(conn, engagement_id).await?;
    let comments = comment::list_for_engagement(conn, engagement_id).await?;

    tracing::debug!(
        engagement_id,
        findings = findings.len(),
        timeline = timeline.len(),
        comments = comments.len(),
        "report assembled"
    );
    Ok(Report {
        engagement,
        findings,
        timeline,
        comments,
    })
}

impl OffsecService {
    /// Assemble the nested report for an engagement.
    ///
    /// # Errors
    ///
    /// `NotFound` when the engagement does not exist.
    pub async fn assemble_report(&self, engagement_id: &str) -> Result<Report, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = assemble(&uow, engagement_id).await;
        uow.finish(result).await
    }

    /// The report together with the engagement's scoped assets, both read
    /// from the same unit of work.
    pub async fn assemble_report_with_scope(
        &self,
        engagement_id: &str,
    ) -> Result<(Report, Vec<ScopedAsset>), DatabaseError> {
        let uow = self.db().begin().await?;
        let result = async {
            let report = assemble(&uow, engagement_id).await?;
            let scope = engagement::list_scope(&uow, engagement_id).await?;
            Ok((report, scope))
        }
        .await;
        uow.finish(result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::{
        NewComment, NewEngagement, NewFinding, NewProgramYear, NewTimelineEvent, ScopeLink,
    };
    use crate::test_support::{admin, test_asset, test_engagement, test_service};
    use chrono::{Duration, TimeZone, Utc};
    use offsec_core::enums::{EngagementStatus, EngagementType, FindingStatus, Severity};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn checkout_app_scenario() {
        let svc = test_service().await;
        let actor = admin(&svc).await;
        svc.create_program_year(NewProgramYear {
            year: "2025".into(),
            ..NewProgramYear::default()
        })
        .await
        .unwrap();
        let eng = svc
            .create_engagement(
                &actor,
                NewEngagement::new("2025", EngagementType::WebApp, "Checkout App Pentest"),
            )
            .await
            .unwrap();
        assert_eq!(eng.status, EngagementStatus::Planned);

        let mut new = NewFinding::new("SQLi in login", Severity::High);
        new.status = FindingStatus::Open;
        let f = svc.create_finding(&actor, &eng.id, new).await.unwrap();
        assert_eq!(svc.list_findings(&eng.id).await.unwrap(), vec![f.clone()]);

        let report = svc.assemble_report(&eng.id).await.unwrap();
        assert_eq!(report.engagement, eng);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].finding, f);
        assert!(report.findings[0].assets.is_empty());
        assert!(report.timeline.is_empty());
        assert!(report.comments.is_empty());
    }

    #[tokio::test]
    async fn report_counts_and_orders_children() {
        let svc = test_service().await;
        let actor = admin(&svc).await;
        let eng = test_engagement(&svc, &actor, "Checkout App Pentest").await;
        let host = test_asset(&svc, "web01.corp").await;

        for (title, sev) in [("XSS", Severity::Medium), ("RCE", Severity::Critical)] {
            let mut new = NewFinding::new(title, sev);
            new.asset_ids = vec![host.id.clone()];
            svc.create_finding(&actor, &eng.id, new).await.unwrap();
        }
        let t0 = Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap();
        for offset in [3, 1, 2] {
            svc.append_timeline_event(
                &actor,
                &eng.id,
                NewTimelineEvent {
                    event_type: "note".into(),
                    description: format!("hour {offset}"),
                    occurred_at: Some(t0 + Duration::hours(offset)),
                    details: None,
                },
            )
            .await
            .unwrap();
        }
        for body in ["first", "second", "third", "fourth"] {
            svc.add_comment(
                &actor,
                &eng.id,
                NewComment {
                    body: body.into(),
                    finding_id: None,
                },
            )
            .await
            .unwrap();
        }

        let report = svc.assemble_report(&eng.id).await.unwrap();
        assert_eq!(report.findings.len(), 2);
        assert_eq!(report.timeline.len(), 3);
        assert_eq!(report.comments.len(), 4);

        let titles: Vec<&str> = report.findings.iter().map(|f| f.finding.title.as_str()).collect();
        assert_eq!(titles, vec!["XSS", "RCE"]);
        assert_eq!(report.findings[1].assets, vec![host]);

        let descriptions: Vec<&str> = report.timeline.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(descriptions, vec!["hour 1", "hour 2", "hour 3"]);
        assert!(report.comments.windows(2).all(|w| w[0].created_at <= w[1].created_at));
        let bodies: Vec<&str> = report.comments.iter().map(|c| c.body.as_str()).collect();
        assert_eq!(bodies, vec!["first", "second", "third", "fourth"]);
    }

    #[tokio::test]
    async fn report_excludes_other_engagements() {
        let svc = test_service().await;
        let actor = admin(&svc).await;
        let eng = test_engagement(&svc, &actor, "Checkout App Pentest").await;
        let other = test_engagement(&svc, &actor, "Payroll Review").await;
        svc.create_finding(&actor, &other.id, NewFinding::new("Weak TLS", Severity::Low))
            .await
            .unwrap();

        let report = svc.assemble_report(&eng.id).await.unwrap();
        assert!(report.findings.is_empty());
    }

    #[tokio::test]
    async fn report_with_scope_reads_both_together() {
        let svc = test_service().await;
        let actor = admin(&svc).await;
        let eng = test_engagement(&svc, &actor, "Checkout App Pentest").await;
        let host = test_asset(&svc, "checkout.example.com").await;
        svc.link_engagement_asset(
            &eng.id,
            ScopeLink {
                asset_id: host.id.clone(),
                role: Some("primary".into()),
                notes: None,
            },
        )
        .await
        .unwrap();

        let (report, scope) = svc.assemble_report_with_scope(&eng.id).await.unwrap();
        assert_eq!(report, svc.assemble_report(&eng.id).await.unwrap());
        assert_eq!(scope, svc.list_engagement_assets(&eng.id).await.unwrap());
        assert_eq!(scope.len(), 1);
        assert_eq!(scope[0].asset, host);
    }

    #[tokio::test]
    async fn missing_engagement_is_not_found() {
        let svc = test_service().await;
        let err = svc.assemble_report("eng-missing").await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { entity: "engagement", .. }));
        let err = svc.assemble_report_with_scope("eng-missing").await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { entity: "engagement", .. }));
    }
}
