use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{DetectionStatus, FindingStatus, RemediationStatus, Severity};

/// A recorded vulnerability, owned by exactly one engagement.
///
/// `asset_ids` is a set: duplicates collapse on write and order follows the
/// order in which assets were first linked.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Finding {
    pub id: String,
    pub engagement_id: String,
    pub title: String,
    pub description: Option<String>,
    pub severity: Severity,
    pub status: FindingStatus,
    pub impact: Option<String>,
    pub poc: Option<String>,
    pub recommendation: Option<String>,
    pub attack_techniques: Option<String>,
    pub remediation_status: RemediationStatus,
    pub remediation_owner: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub detection_status: Option<DetectionStatus>,
    pub detection_notes: Option<String>,
    pub risk_accepted: bool,
    pub risk_accepted_notes: Option<String>,
    pub created_by: Option<String>,
    pub asset_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
