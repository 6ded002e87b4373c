//! Finding template update builder.

use serde::{Deserialize, Serialize};

use offsec_core::enums::Severity;

use super::present;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_severity: Option<Severity>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub impact: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub cwe_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub attack_techniques: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub references: Option<Option<String>>,
}

pub struct TemplateUpdateBuilder(TemplateUpdate);

impl TemplateUpdateBuilder {
    pub fn new() -> Self {
        Self(TemplateUpdate::default())
    }

    pub fn title(mut self, val: impl Into<String>) -> Self {
        self.0.title = Some(val.into());
        self
    }

    pub fn default_severity(mut self, val: Severity) -> Self {
        self.0.default_severity = Some(val);
        self
    }

    pub fn category(mut self, val: Option<String>) -> Self {
        self.0.category = Some(val);
        self
    }

    pub fn build(self) -> TemplateUpdate {
        self.0
    }
}
