use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{EngagementType, IntakeStatus, RiskLevel};

/// A stakeholder request for testing. Once `Promoted`, `linked_engagement_id`
/// is set and never changes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct IntakeRequest {
    pub id: String,
    pub title: String,
    pub requester: String,
    pub requester_email: Option<String>,
    pub business_unit: Option<String>,
    pub system_name: Option<String>,
    pub description: Option<String>,
    pub risk_level: Option<RiskLevel>,
    pub desired_window: Option<String>,
    pub desired_type: Option<EngagementType>,
    pub status: IntakeStatus,
    pub linked_engagement_id: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
