//! Asset update builder.

use serde::{Deserialize, Serialize};

use offsec_core::enums::{AssetType, RiskLevel};

use super::present;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<AssetType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub environment: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub business_unit: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub criticality: Option<Option<RiskLevel>>,
}

pub struct AssetUpdateBuilder(AssetUpdate);

impl AssetUpdateBuilder {
    pub fn new() -> Self {
        Self(AssetUpdate::default())
    }

    pub fn asset_type(mut self, val: AssetType) -> Self {
        self.0.asset_type = Some(val);
        self
    }

    pub fn value(mut self, val: impl Into<String>) -> Self {
        self.0.value = Some(val.into());
        self
    }

    pub fn name(mut self, val: Option<String>) -> Self {
        self.0.name = Some(val);
        self
    }

    pub fn criticality(mut self, val: Option<RiskLevel>) -> Self {
        self.0.criticality = Some(val);
        self
    }

    pub fn build(self) -> AssetUpdate {
        self.0
    }
}
