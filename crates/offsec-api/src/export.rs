//! Markdown and CSV renderings of an assembled report.
//!
//! Both are built from one [`Report`] snapshot. The Markdown document also
//! lists the engagement's scoped assets.

use std::fmt::Write;

use offsec_core::entities::{Asset, Report, ScopedAsset};

const CSV_HEADER: [&str; 14] = [
    "Finding ID",
    "Title",
    "Severity",
    "Status",
    "Description",
    "Impact",
    "Recommendation",
    "Remediation Status",
    "Remediation Owner",
    "Due Date",
    "Detection Status",
    "Risk Accepted",
    "Affected Assets",
    "ATT&CK Techniques",
];

fn asset_label(asset: &Asset) -> String {
    match asset.name {
        Some(ref name) => format!("{name} ({})", asset.value),
        None => asset.value.clone(),
    }
}

fn section(out: &mut String, heading: &str, body: Option<&str>) {
    if let Some(text) = body.filter(|t| !t.trim().is_empty()) {
        let _ = write!(out, "## {heading}\n\n{text}\n\n");
    }
}

fn paragraph(out: &mut String, label: &str, body: Option<&str>) {
    if let Some(text) = body.filter(|t| !t.trim().is_empty()) {
        let _ = write!(out, "**{label}:**\n\n{text}\n\n");
    }
}

/// Render the report as a Markdown document.
#[must_use]
pub fn render_markdown(report: &Report, scope: &[ScopedAsset]) -> String {
    let eng = &report.engagement;
    let mut out = String::new();

    let _ = write!(out, "# {}\n\n## Engagement Metadata\n\n", eng.name);
    let _ = writeln!(out, "- **Type**: {}", eng.engagement_type);
    let _ = writeln!(out, "- **Status**: {}", eng.status);
    let _ = writeln!(
        out,
        "- **Business Unit**: {}",
        eng.business_unit.as_deref().unwrap_or("N/A")
    );
    let _ = writeln!(out, "- **Program Year**: {}", eng.program_year);
    if let Some(start) = eng.start_date {
        let _ = writeln!(out, "- **Start Date**: {start}");
    }
    if let Some(end) = eng.end_date {
        let _ = writeln!(out, "- **End Date**: {end}");
    }
    out.push('\n');

    section(&mut out, "Executive Summary", eng.exec_summary.as_deref());
    section(&mut out, "Scope", eng.scope_summary.as_deref());
    if !scope.is_empty() {
        out.push_str("### In-Scope Assets\n\n");
        for scoped in scope {
            let _ = write!(
                out,
                "- **{}** ({})",
                asset_label(&scoped.asset),
                scoped.asset.asset_type
            );
            if let Some(ref role) = scoped.role {
                let _ = write!(out, ": {role}");
            }
            out.push('\n');
        }
        out.push('\n');
    }
    section(&mut out, "Objectives", eng.objectives.as_deref());
    section(&mut out, "Methodology", eng.methodology.as_deref());

    out.push_str("## Findings Summary\n\n");
    if report.findings.is_empty() {
        out.push_str("No findings recorded.\n\n");
    } else {
        out.push_str("| Severity | Count |\n|----------|-------|\n");
        for count in report.severity_counts().iter().filter(|c| c.count > 0) {
            let _ = writeln!(out, "| {} | {} |", count.severity, count.count);
        }
        out.push('\n');

        out.push_str("## Detailed Findings\n\n");
        for (i, entry) in report.findings.iter().enumerate() {
            let f = &entry.finding;
            let _ = write!(out, "### {}. {}\n\n", i + 1, f.title);
            let _ = writeln!(out, "- **Severity**: {}", f.severity);
            let _ = writeln!(out, "- **Status**: {}", f.status);
            let _ = writeln!(out, "- **Remediation Status**: {}", f.remediation_status);
            if let Some(ref owner) = f.remediation_owner {
                let _ = writeln!(out, "- **Remediation Owner**: {owner}");
            }
            if let Some(due) = f.due_date {
                let _ = writeln!(out, "- **Due Date**: {due}");
            }
            out.push('\n');

            if !entry.assets.is_empty() {
                out.push_str("**Affected Assets:**\n");
                for asset in &entry.assets {
                    let _ = writeln!(out, "- {}", asset_label(asset));
                }
                out.push('\n');
            }
            paragraph(&mut out, "Description", f.description.as_deref());
            paragraph(&mut out, "Impact", f.impact.as_deref());
            paragraph(&mut out, "Proof of Concept", f.poc.as_deref());
            paragraph(&mut out, "Recommendation", f.recommendation.as_deref());
            if let Some(ref techniques) = f.attack_techniques {
                let _ = write!(out, "**ATT&CK Techniques:** {techniques}\n\n");
            }
        }
    }

    section(
        &mut out,
        "Overall Recommendations",
        eng.recommendations_overall.as_deref(),
    );
    out
}

/// Quote a CSV field when it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_row<I, S>(out: &mut String, fields: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let row: Vec<String> = fields.into_iter().map(|f| csv_field(f.as_ref())).collect();
    out.push_str(&row.join(","));
    out.push_str("\r\n");
}

/// Render the report's findings as CSV, one row per finding.
#[must_use]
pub fn render_csv(report: &Report) -> String {
    let mut out = String::new();
    csv_row(&mut out, CSV_HEADER);
    for entry in &report.findings {
        let f = &entry.finding;
        let assets = if entry.assets.is_empty() {
            "N/A".to_string()
        } else {
            entry
                .assets
                .iter()
                .map(asset_label)
                .collect::<Vec<_>>()
                .join(", ")
        };
        csv_row(
            &mut out,
            [
                f.id.clone(),
                f.title.clone(),
                f.severity.to_string(),
                f.status.to_string(),
                f.description.clone().unwrap_or_default(),
                f.impact.clone().unwrap_or_default(),
                f.recommendation.clone().unwrap_or_default(),
                f.remediation_status.to_string(),
                f.remediation_owner.clone().unwrap_or_default(),
                f.due_date.map(|d| d.to_string()).unwrap_or_default(),
                f.detection_status.map(|d| d.to_string()).unwrap_or_default(),
                if f.risk_accepted { "Yes" } else { "No" }.to_string(),
                assets,
                f.attack_techniques.clone().unwrap_or_default(),
            ],
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use offsec_core::entities::{Engagement, Finding, ReportFinding};
    use offsec_core::enums::{
        AssetType, EngagementStatus, EngagementType, FindingStatus, RemediationStatus, Severity,
    };
    use pretty_assertions::assert_eq;

    fn engagement() -> Engagement {
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        Engagement {
            id: "eng-00000001".into(),
            program_year_id: "pyr-00000001".into(),
            program_year: "2025".into(),
            engagement_type: EngagementType::WebApp,
            name: "Checkout App Pentest".into(),
            scope_summary: Some("Checkout flow".into()),
            status: EngagementStatus::InProgress,
            start_date: None,
            end_date: None,
            business_unit: None,
            owner_id: None,
            objectives: None,
            methodology: None,
            exec_summary: None,
            recommendations_overall: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn finding(id: &str, title: &str, severity: Severity) -> Finding {
        let ts = Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap();
        Finding {
            id: id.into(),
            engagement_id: "eng-00000001".into(),
            title: title.into(),
            description: None,
            severity,
            status: FindingStatus::Open,
            impact: None,
            poc: None,
            recommendation: None,
            attack_techniques: None,
            remediation_status: RemediationStatus::NotStarted,
            remediation_owner: None,
            due_date: None,
            detection_status: None,
            detection_notes: None,
            risk_accepted: false,
            risk_accepted_notes: None,
            created_by: None,
            asset_ids: Vec::new(),
            created_at: ts,
            updated_at: ts,
        }
    }

    fn host(value: &str) -> Asset {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        Asset {
            id: "ast-00000001".into(),
            asset_type: AssetType::Host,
            value: value.into(),
            name: Some("web".into()),
            description: None,
            environment: None,
            business_unit: None,
            criticality: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn report(findings: Vec<ReportFinding>) -> Report {
        Report {
            engagement: engagement(),
            findings,
            timeline: Vec::new(),
            comments: Vec::new(),
        }
    }

    #[test]
    fn markdown_without_findings() {
        let md = render_markdown(&report(Vec::new()), &[]);
        assert!(md.starts_with("# Checkout App Pentest\n"));
        assert!(md.contains("- **Status**: In-Progress\n"));
        assert!(md.contains("## Scope\n\nCheckout flow\n"));
        assert!(md.contains("No findings recorded."));
        assert!(!md.contains("## Detailed Findings"));
    }

    #[test]
    fn markdown_summarizes_by_severity() {
        let r = report(vec![
            ReportFinding {
                finding: finding("fnd-1", "XSS", Severity::Medium),
                assets: vec![host("web01.corp")],
            },
            ReportFinding {
                finding: finding("fnd-2", "RCE", Severity::Critical),
                assets: Vec::new(),
            },
        ]);
        let md = render_markdown(&r, &[]);
        assert!(md.contains("| Critical | 1 |\n| Medium | 1 |\n"));
        assert!(!md.contains("| High |"));
        assert!(md.contains("### 1. XSS"));
        assert!(md.contains("### 2. RCE"));
        assert!(md.contains("- web (web01.corp)\n"));
    }

    #[test]
    fn csv_header_and_rows() {
        let mut f = finding("fnd-1", "SQLi, login", Severity::High);
        f.description = Some("says \"hi\"".into());
        f.risk_accepted = true;
        let csv = render_csv(&report(vec![ReportFinding {
            finding: f,
            assets: Vec::new(),
        }]));

        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Finding ID,Title,Severity,Status,"));
        assert_eq!(
            lines[1],
            "fnd-1,\"SQLi, login\",High,Open,\"says \"\"hi\"\"\",,,Not-Started,,,,Yes,N/A,"
        );
        assert_eq!(lines[2], "");
    }

    #[test]
    fn csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a\nb"), "\"a\nb\"");
        assert_eq!(csv_field(""), "");
    }
}
