use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{EngagementStatus, EngagementType};

/// One scoped penetration-testing exercise within a program year.
///
/// `program_year_id` and its label `program_year` are fixed at creation.
/// Engagements are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Engagement {
    pub id: String,
    pub program_year_id: String,
    pub program_year: String,
    pub engagement_type: EngagementType,
    pub name: String,
    pub scope_summary: Option<String>,
    pub status: EngagementStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub business_unit: Option<String>,
    pub owner_id: Option<String>,
    pub objectives: Option<String>,
    pub methodology: Option<String>,
    pub exec_summary: Option<String>,
    pub recommendations_overall: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
