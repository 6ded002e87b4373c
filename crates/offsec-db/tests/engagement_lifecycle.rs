//! Engagement lifecycle integration tests.
//!
//! Drive the public service API end to end:
//! - Intake submission, review and promotion into an engagement
//! - Findings, remediation tracking and asset links across the engagement
//! - Report assembly over a file-backed store reopened from disk
//! - Concurrent writers sharing one service

use std::sync::Arc;

use chrono::{Days, Utc};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use offsec_core::enums::{
    AssetType, EngagementStatus, EngagementType, FindingStatus, IntakeStatus, RemediationStatus,
    Severity, UserRole,
};
use offsec_core::identity::Actor;
use offsec_db::DEFAULT_BUSY_TIMEOUT;
use offsec_db::error::DatabaseError;
use offsec_db::inputs::{NewAsset, NewFinding, NewIntake, NewTemplate, NewUser, PromoteIntake};
use offsec_db::repos::engagement::EngagementFilter;
use offsec_db::service::OffsecService;
use offsec_db::updates::engagement::EngagementUpdateBuilder;
use offsec_db::updates::finding::FindingUpdateBuilder;

async fn actor(svc: &OffsecService, name: &str, role: UserRole) -> Actor {
    let user = svc
        .create_user(NewUser::new(name, role), &format!("hash-{name}"))
        .await
        .unwrap();
    Actor {
        user_id: user.id,
        name: user.name,
        role: user.role,
    }
}

// ---------------------------------------------------------------------------
// Intake to report
// ---------------------------------------------------------------------------

#[tokio::test]
async fn intake_to_report_lifecycle() {
    let svc = OffsecService::open_local(":memory:", DEFAULT_BUSY_TIMEOUT)
        .await
        .unwrap();
    let lead = actor(&svc, "river", UserRole::Red).await;

    let intake = svc
        .create_intake(
            &lead,
            NewIntake {
                title: "Checkout App Pentest".into(),
                requester: "Payments team".into(),
                desired_type: Some(EngagementType::WebApp),
                ..NewIntake::default()
            },
        )
        .await
        .unwrap();
    svc.review_intake(&intake.id).await.unwrap();
    let eng = svc
        .promote_intake(
            &lead,
            &intake.id,
            PromoteIntake {
                program_year: "2025".into(),
                ..PromoteIntake::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(eng.status, EngagementStatus::Planned);
    assert_eq!(eng.owner_id.as_deref(), Some(lead.user_id.as_str()));

    let eng = svc
        .update_engagement(
            &eng.id,
            EngagementUpdateBuilder::new()
                .status(EngagementStatus::InProgress)
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(eng.status, EngagementStatus::InProgress);

    let web = svc
        .create_asset(NewAsset::new(AssetType::Url, "https://checkout.corp"))
        .await
        .unwrap();
    let tpl = svc
        .create_template(&lead, NewTemplate::new("Reflected XSS", Severity::Medium))
        .await
        .unwrap();

    let mut sqli = NewFinding::new("SQLi in login", Severity::High);
    sqli.asset_ids = vec![web.id.clone()];
    sqli.due_date = Utc::now().date_naive().checked_add_days(Days::new(30));
    let sqli = svc.create_finding(&lead, &eng.id, sqli).await.unwrap();
    let xss = svc
        .create_finding_from_template(
            &lead,
            &eng.id,
            offsec_db::inputs::FromTemplate {
                template_id: tpl.id.clone(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(xss.severity, Severity::Medium);

    let sqli = svc
        .update_finding(
            &sqli.id,
            FindingUpdateBuilder::new()
                .status(FindingStatus::Remediated)
                .remediation_status(RemediationStatus::Verified)
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(sqli.remediation_status, RemediationStatus::Verified);

    let report = svc.assemble_report(&eng.id).await.unwrap();
    assert_eq!(report.engagement.status, EngagementStatus::InProgress);
    assert_eq!(report.findings.len(), 2);
    assert_eq!(report.findings[0].finding, sqli);
    assert_eq!(report.findings[0].assets, vec![web]);
    assert!(report.findings[1].assets.is_empty());

    let promoted = svc.get_intake(&intake.id).await.unwrap();
    assert_eq!(promoted.status, IntakeStatus::Promoted);
    assert_eq!(promoted.linked_engagement_id, Some(eng.id));
}

#[tokio::test]
async fn second_promotion_leaves_first_engagement_alone() {
    let svc = OffsecService::open_local(":memory:", DEFAULT_BUSY_TIMEOUT)
        .await
        .unwrap();
    let lead = actor(&svc, "river", UserRole::Red).await;
    let intake = svc
        .create_intake(
            &lead,
            NewIntake {
                title: "Badge readers".into(),
                requester: "Facilities".into(),
                desired_type: Some(EngagementType::Ot),
                ..NewIntake::default()
            },
        )
        .await
        .unwrap();
    let promote = PromoteIntake {
        program_year: "2026".into(),
        ..PromoteIntake::default()
    };

    let first = svc.promote_intake(&lead, &intake.id, promote.clone()).await.unwrap();
    let err = svc
        .promote_intake(&lead, &intake.id, promote)
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::Conflict(_)));

    let engagements = svc
        .list_engagements(&EngagementFilter {
            program_year: Some("2026".into()),
            ..EngagementFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(engagements, vec![first]);
}

// ---------------------------------------------------------------------------
// Persistence and concurrency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn report_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("offsec.db");
    let path = path.to_str().unwrap();

    let eng_id = {
        let svc = OffsecService::open_local(path, DEFAULT_BUSY_TIMEOUT)
            .await
            .unwrap();
        let lead = actor(&svc, "river", UserRole::Red).await;
        let eng = svc
            .create_engagement(
                &lead,
                offsec_db::inputs::NewEngagement::new("2025", EngagementType::Infra, "DC sweep"),
            )
            .await
            .unwrap();
        svc.create_finding(&lead, &eng.id, NewFinding::new("SMB signing off", Severity::Medium))
            .await
            .unwrap();
        eng.id
    };

    let svc = OffsecService::open_local(path, DEFAULT_BUSY_TIMEOUT)
        .await
        .unwrap();
    let report = svc.assemble_report(&eng_id).await.unwrap();
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].finding.title, "SMB signing off");
}

#[tokio::test]
async fn concurrent_finding_writers_all_land() {
    let svc = Arc::new(
        OffsecService::open_local(":memory:", DEFAULT_BUSY_TIMEOUT)
            .await
            .unwrap(),
    );
    let lead = actor(&svc, "river", UserRole::Red).await;
    let eng = svc
        .create_engagement(
            &lead,
            offsec_db::inputs::NewEngagement::new("2025", EngagementType::Purple, "Purple week"),
        )
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let svc = Arc::clone(&svc);
        let lead = lead.clone();
        let eng_id = eng.id.clone();
        handles.push(tokio::spawn(async move {
            svc.create_finding(&lead, &eng_id, NewFinding::new(format!("finding {i}"), Severity::Low))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let report = svc.assemble_report(&eng.id).await.unwrap();
    assert_eq!(report.findings.len(), 16);
    let counts = report.severity_counts();
    let low = counts.iter().find(|c| c.severity == Severity::Low).unwrap();
    assert_eq!(low.count, 16);
}
