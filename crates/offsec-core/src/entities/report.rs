use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Asset, Comment, Engagement, Finding, TimelineEvent};
use crate::enums::Severity;

/// Point-in-time snapshot of an engagement and everything it owns.
///
/// `timeline` is ordered by `occurred_at` and `comments` by `created_at`,
/// both ascending. `findings` are in creation order.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Report {
    pub engagement: Engagement,
    pub findings: Vec<ReportFinding>,
    pub timeline: Vec<TimelineEvent>,
    pub comments: Vec<Comment>,
}

/// A finding with its linked assets expanded inline.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ReportFinding {
    #[serde(flatten)]
    pub finding: Finding,
    pub assets: Vec<Asset>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SeverityCount {
    pub severity: Severity,
    pub count: usize,
}

impl Report {
    /// Findings per severity, most severe first. Every severity is present.
    #[must_use]
    pub fn severity_counts(&self) -> Vec<SeverityCount> {
        Severity::ALL
            .iter()
            .map(|&severity| SeverityCount {
                severity,
                count: self
                    .findings
                    .iter()
                    .filter(|f| f.finding.severity == severity)
                    .count(),
            })
            .collect()
    }

    /// Findings sorted most severe first, ties kept in creation order.
    #[must_use]
    pub fn findings_by_severity(&self) -> Vec<&ReportFinding> {
        let mut sorted: Vec<&ReportFinding> = self.findings.iter().collect();
        sorted.sort_by(|a, b| b.finding.severity.cmp(&a.finding.severity));
        sorted
    }
}
