use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Append-only note on an engagement, optionally about one of its findings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Comment {
    pub id: String,
    pub engagement_id: String,
    pub finding_id: Option<String>,
    pub author_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
