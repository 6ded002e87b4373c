//! Program year update builder. Only the label, theme and objectives change.

use serde::{Deserialize, Serialize};

use super::present;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramYearUpdate {
    #[serde(
        default,
        deserialize_with = "crate::inputs::optional_year_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub theme: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub objectives: Option<Option<String>>,
}

pub struct ProgramYearUpdateBuilder(ProgramYearUpdate);

impl ProgramYearUpdateBuilder {
    pub fn new() -> Self {
        Self(ProgramYearUpdate::default())
    }

    pub fn year(mut self, val: impl Into<String>) -> Self {
        self.0.year = Some(val.into());
        self
    }

    pub fn theme(mut self, val: Option<String>) -> Self {
        self.0.theme = Some(val);
        self
    }

    pub fn objectives(mut self, val: Option<String>) -> Self {
        self.0.objectives = Some(val);
        self
    }

    pub fn build(self) -> ProgramYearUpdate {
        self.0
    }
}
