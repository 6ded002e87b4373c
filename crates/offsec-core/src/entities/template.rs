use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Severity;

/// Reusable finding text. Copied by value into new findings, never referenced.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FindingTemplate {
    pub id: String,
    pub title: String,
    pub category: Option<String>,
    pub default_severity: Severity,
    pub description: Option<String>,
    pub impact: Option<String>,
    pub recommendation: Option<String>,
    pub cwe_id: Option<String>,
    pub attack_techniques: Option<String>,
    pub references: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
