use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{AssetType, RiskLevel};

/// A reusable scan target. `(asset_type, value)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Asset {
    pub id: String,
    pub asset_type: AssetType,
    pub value: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub environment: Option<String>,
    pub business_unit: Option<String>,
    pub criticality: Option<RiskLevel>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An asset as linked into an engagement's scope.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ScopedAsset {
    #[serde(flatten)]
    pub asset: Asset,
    pub role: Option<String>,
    pub notes: Option<String>,
}
