//! Creation payloads for every entity.
//!
//! These deserialize straight from request bodies. Closed enumerations are
//! typed, so a value outside an enumeration fails at the JSON boundary.
//! Required fields are plain, everything else is optional.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use offsec_core::enums::{
    AssetType, DetectionStatus, EngagementType, FindingStatus, RemediationStatus, RiskLevel,
    Severity, UserRole,
};

/// A program year label given either as text (`"2025"`) or a number (`2025`).
#[derive(Deserialize)]
#[serde(untagged)]
enum YearLabel {
    Text(String),
    Number(i64),
}

impl From<YearLabel> for String {
    fn from(label: YearLabel) -> Self {
        match label {
            YearLabel::Text(s) => s,
            YearLabel::Number(n) => n.to_string(),
        }
    }
}

pub(crate) fn year_label<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    YearLabel::deserialize(d).map(String::from)
}

pub(crate) fn optional_year_label<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<String>, D::Error> {
    Option::<YearLabel>::deserialize(d).map(|label| label.map(String::from))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProgramYear {
    #[serde(deserialize_with = "year_label")]
    pub year: String,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub objectives: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEngagement {
    /// Calendar label of the owning program year; created if missing.
    #[serde(deserialize_with = "year_label")]
    pub program_year: String,
    pub engagement_type: EngagementType,
    pub name: String,
    #[serde(default)]
    pub scope_summary: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub business_unit: Option<String>,
    #[serde(default)]
    pub objectives: Option<String>,
    #[serde(default)]
    pub methodology: Option<String>,
    #[serde(default)]
    pub exec_summary: Option<String>,
    #[serde(default)]
    pub recommendations_overall: Option<String>,
}

impl NewEngagement {
    pub fn new(
        program_year: impl Into<String>,
        engagement_type: EngagementType,
        name: impl Into<String>,
    ) -> Self {
        Self {
            program_year: program_year.into(),
            engagement_type,
            name: name.into(),
            scope_summary: None,
            start_date: None,
            end_date: None,
            business_unit: None,
            objectives: None,
            methodology: None,
            exec_summary: None,
            recommendations_overall: None,
        }
    }
}

/// Fields supplied when promoting an intake request. Type and name fall back
/// to the request's desired type and title.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromoteIntake {
    #[serde(deserialize_with = "year_label")]
    pub program_year: String,
    #[serde(default)]
    pub engagement_type: Option<EngagementType>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub scope_summary: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub objectives: Option<String>,
    #[serde(default)]
    pub methodology: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewIntake {
    pub title: String,
    pub requester: String,
    #[serde(default)]
    pub requester_email: Option<String>,
    #[serde(default)]
    pub business_unit: Option<String>,
    #[serde(default)]
    pub system_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
    #[serde(default)]
    pub desired_window: Option<String>,
    #[serde(default)]
    pub desired_type: Option<EngagementType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAsset {
    pub asset_type: AssetType,
    pub value: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub business_unit: Option<String>,
    #[serde(default)]
    pub criticality: Option<RiskLevel>,
}

impl NewAsset {
    pub fn new(asset_type: AssetType, value: impl Into<String>) -> Self {
        Self {
            asset_type,
            value: value.into(),
            name: None,
            description: None,
            environment: None,
            business_unit: None,
            criticality: None,
        }
    }
}

/// Links an existing asset into an engagement's scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScopeLink {
    pub asset_id: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFinding {
    pub title: String,
    pub severity: Severity,
    #[serde(default)]
    pub status: FindingStatus,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub poc: Option<String>,
    #[serde(default)]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub attack_techniques: Option<String>,
    #[serde(default)]
    pub remediation_status: RemediationStatus,
    #[serde(default)]
    pub remediation_owner: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub detection_status: Option<DetectionStatus>,
    #[serde(default)]
    pub detection_notes: Option<String>,
    #[serde(default)]
    pub risk_accepted: bool,
    #[serde(default)]
    pub risk_accepted_notes: Option<String>,
    #[serde(default)]
    pub asset_ids: Vec<String>,
}

impl NewFinding {
    pub fn new(title: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            severity,
            status: FindingStatus::default(),
            description: None,
            impact: None,
            poc: None,
            recommendation: None,
            attack_techniques: None,
            remediation_status: RemediationStatus::default(),
            remediation_owner: None,
            due_date: None,
            detection_status: None,
            detection_notes: None,
            risk_accepted: false,
            risk_accepted_notes: None,
            asset_ids: Vec::new(),
        }
    }
}

/// Overrides applied on top of template text when instantiating a finding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FromTemplate {
    pub template_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub status: Option<FindingStatus>,
    #[serde(default)]
    pub poc: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub asset_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTemplate {
    pub title: String,
    pub default_severity: Severity,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub cwe_id: Option<String>,
    #[serde(default)]
    pub attack_techniques: Option<String>,
    #[serde(default)]
    pub references: Option<String>,
}

impl NewTemplate {
    pub fn new(title: impl Into<String>, default_severity: Severity) -> Self {
        Self {
            title: title.into(),
            default_severity,
            category: None,
            description: None,
            impact: None,
            recommendation: None,
            cwe_id: None,
            attack_techniques: None,
            references: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTimelineEvent {
    pub event_type: String,
    pub description: String,
    /// Defaults to the time of recording.
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewComment {
    pub body: String,
    #[serde(default)]
    pub finding_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub role: UserRole,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl NewUser {
    pub fn new(name: impl Into<String>, role: UserRole) -> Self {
        Self {
            name: name.into(),
            role,
            full_name: None,
            email: None,
        }
    }
}
