//! Finding update builder.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use offsec_core::enums::{DetectionStatus, FindingStatus, RemediationStatus, Severity};

use super::present;

/// Partial finding update. Any status may be set from any other.
///
/// `engagement_id` may only repeat the current engagement. `asset_ids`, when
/// present, replaces the whole asset set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindingUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagement_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FindingStatus>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub impact: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub poc: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub attack_techniques: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation_status: Option<RemediationStatus>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub remediation_owner: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub detection_status: Option<Option<DetectionStatus>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub detection_notes: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_accepted: Option<bool>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub risk_accepted_notes: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_ids: Option<Vec<String>>,
}

pub struct FindingUpdateBuilder(FindingUpdate);

impl FindingUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(FindingUpdate::default())
    }

    #[must_use]
    pub fn engagement_id(mut self, val: impl Into<String>) -> Self {
        self.0.engagement_id = Some(val.into());
        self
    }

    #[must_use]
    pub fn title(mut self, val: impl Into<String>) -> Self {
        self.0.title = Some(val.into());
        self
    }

    #[must_use]
    pub fn severity(mut self, val: Severity) -> Self {
        self.0.severity = Some(val);
        self
    }

    #[must_use]
    pub fn status(mut self, val: FindingStatus) -> Self {
        self.0.status = Some(val);
        self
    }

    #[must_use]
    pub fn description(mut self, val: Option<String>) -> Self {
        self.0.description = Some(val);
        self
    }

    #[must_use]
    pub fn recommendation(mut self, val: Option<String>) -> Self {
        self.0.recommendation = Some(val);
        self
    }

    #[must_use]
    pub fn remediation_status(mut self, val: RemediationStatus) -> Self {
        self.0.remediation_status = Some(val);
        self
    }

    #[must_use]
    pub fn remediation_owner(mut self, val: Option<String>) -> Self {
        self.0.remediation_owner = Some(val);
        self
    }

    #[must_use]
    pub fn due_date(mut self, val: Option<NaiveDate>) -> Self {
        self.0.due_date = Some(val);
        self
    }

    #[must_use]
    pub fn detection_status(mut self, val: Option<DetectionStatus>) -> Self {
        self.0.detection_status = Some(val);
        self
    }

    #[must_use]
    pub fn risk_accepted(mut self, val: bool) -> Self {
        self.0.risk_accepted = Some(val);
        self
    }

    #[must_use]
    pub fn asset_ids(mut self, val: Vec<String>) -> Self {
        self.0.asset_ids = Some(val);
        self
    }

    #[must_use]
    pub fn build(self) -> FindingUpdate {
        self.0
    }
}
