//! Engagement update builder.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use offsec_core::enums::{EngagementStatus, EngagementType};

use super::present;

/// Partial engagement update.
///
/// `program_year` is accepted only so a request that repeats the current
/// label succeeds; any other value is rejected because the program year is
/// fixed at creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngagementUpdate {
    #[serde(
        default,
        deserialize_with = "crate::inputs::optional_year_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub program_year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagement_type: Option<EngagementType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EngagementStatus>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub scope_summary: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub business_unit: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub objectives: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub methodology: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub exec_summary: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub recommendations_overall: Option<Option<String>>,
}

pub struct EngagementUpdateBuilder(EngagementUpdate);

impl EngagementUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(EngagementUpdate::default())
    }

    #[must_use]
    pub fn program_year(mut self, val: impl Into<String>) -> Self {
        self.0.program_year = Some(val.into());
        self
    }

    #[must_use]
    pub fn engagement_type(mut self, val: EngagementType) -> Self {
        self.0.engagement_type = Some(val);
        self
    }

    #[must_use]
    pub fn name(mut self, val: impl Into<String>) -> Self {
        self.0.name = Some(val.into());
        self
    }

    #[must_use]
    pub fn status(mut self, val: EngagementStatus) -> Self {
        self.0.status = Some(val);
        self
    }

    #[must_use]
    pub fn scope_summary(mut self, val: Option<String>) -> Self {
        self.0.scope_summary = Some(val);
        self
    }

    #[must_use]
    pub fn start_date(mut self, val: Option<NaiveDate>) -> Self {
        self.0.start_date = Some(val);
        self
    }

    #[must_use]
    pub fn end_date(mut self, val: Option<NaiveDate>) -> Self {
        self.0.end_date = Some(val);
        self
    }

    #[must_use]
    pub fn business_unit(mut self, val: Option<String>) -> Self {
        self.0.business_unit = Some(val);
        self
    }

    #[must_use]
    pub fn objectives(mut self, val: Option<String>) -> Self {
        self.0.objectives = Some(val);
        self
    }

    #[must_use]
    pub fn methodology(mut self, val: Option<String>) -> Self {
        self.0.methodology = Some(val);
        self
    }

    #[must_use]
    pub fn exec_summary(mut self, val: Option<String>) -> Self {
        self.0.exec_summary = Some(val);
        self
    }

    #[must_use]
    pub fn recommendations_overall(mut self, val: Option<String>) -> Self {
        self.0.recommendations_overall = Some(val);
        self
    }

    #[must_use]
    pub fn build(self) -> EngagementUpdate {
        self.0
    }
}
