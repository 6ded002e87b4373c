use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Append-only record of something that happened during an engagement.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TimelineEvent {
    pub id: String,
    pub engagement_id: String,
    pub occurred_at: DateTime<Utc>,
    pub actor_id: Option<String>,
    pub event_type: String,
    pub description: String,
    pub details: Option<String>,
}
