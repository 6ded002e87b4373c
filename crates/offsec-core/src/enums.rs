//! Closed enumerations for offsec entities.
//!
//! Every enum serializes to the exact string stored in SQL and shown on the
//! wire (`"In-Progress"`, `"Accepted-Risk"`, ...). A few variants also accept
//! an unhyphenated alias on input. Values outside an enumeration are rejected
//! at deserialization and by `FromStr`, which reports `CoreError::Validation`.
//!
//! `IntakeStatus` is the only enum with a state machine; it provides
//! `allowed_next_states()` to enforce transitions at the service layer.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

/// Parse `value` through the enum's serde representation so aliases and
/// wire strings stay in one place.
fn parse_closed<T: DeserializeOwned>(kind: &str, value: &str) -> Result<T, CoreError> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| CoreError::Validation(format!("{kind} '{value}' is not recognized")))
}

macro_rules! closed_enum_impls {
    ($ty:ident, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_closed($kind, s)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Finding severity.
///
/// Declared lowest first so the derived `Ord` gives
/// `Critical > High > Medium > Low > Info`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// All severities, most severe first (report order).
    pub const ALL: [Self; 5] = [
        Self::Critical,
        Self::High,
        Self::Medium,
        Self::Low,
        Self::Info,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

closed_enum_impls!(Severity, "severity");

// ---------------------------------------------------------------------------
// FindingStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a finding. Any status may follow any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum FindingStatus {
    #[default]
    Open,
    Validated,
    Exploited,
    Remediated,
    #[serde(rename = "Accepted-Risk", alias = "AcceptedRisk")]
    AcceptedRisk,
    #[serde(rename = "False-Positive", alias = "FalsePositive")]
    FalsePositive,
}

impl FindingStatus {
    pub const ALL: [Self; 6] = [
        Self::Open,
        Self::Validated,
        Self::Exploited,
        Self::Remediated,
        Self::AcceptedRisk,
        Self::FalsePositive,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Validated => "Validated",
            Self::Exploited => "Exploited",
            Self::Remediated => "Remediated",
            Self::AcceptedRisk => "Accepted-Risk",
            Self::FalsePositive => "False-Positive",
        }
    }
}

closed_enum_impls!(FindingStatus, "finding status");

// ---------------------------------------------------------------------------
// RemediationStatus
// ---------------------------------------------------------------------------

/// Progress of the owning team's fix for a finding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum RemediationStatus {
    #[default]
    #[serde(rename = "Not-Started", alias = "NotStarted")]
    NotStarted,
    #[serde(rename = "In-Progress", alias = "InProgress")]
    InProgress,
    Completed,
    Verified,
    #[serde(rename = "Wont-Fix", alias = "WontFix")]
    WontFix,
}

impl RemediationStatus {
    pub const ALL: [Self; 5] = [
        Self::NotStarted,
        Self::InProgress,
        Self::Completed,
        Self::Verified,
        Self::WontFix,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "Not-Started",
            Self::InProgress => "In-Progress",
            Self::Completed => "Completed",
            Self::Verified => "Verified",
            Self::WontFix => "Wont-Fix",
        }
    }
}

closed_enum_impls!(RemediationStatus, "remediation status");

// ---------------------------------------------------------------------------
// DetectionStatus
// ---------------------------------------------------------------------------

/// Whether the defensive team detected the activity behind a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum DetectionStatus {
    Detected,
    Missed,
    #[serde(rename = "Not-Applicable", alias = "NotApplicable")]
    NotApplicable,
}

impl DetectionStatus {
    pub const ALL: [Self; 3] = [Self::Detected, Self::Missed, Self::NotApplicable];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Detected => "Detected",
            Self::Missed => "Missed",
            Self::NotApplicable => "Not-Applicable",
        }
    }
}

closed_enum_impls!(DetectionStatus, "detection status");

// ---------------------------------------------------------------------------
// EngagementType
// ---------------------------------------------------------------------------

/// Kind of engagement. Also used as an intake request's desired type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum EngagementType {
    Infra,
    WebApp,
    #[serde(rename = "PCI")]
    Pci,
    #[serde(rename = "OT")]
    Ot,
    External,
    Purple,
}

impl EngagementType {
    pub const ALL: [Self; 6] = [
        Self::Infra,
        Self::WebApp,
        Self::Pci,
        Self::Ot,
        Self::External,
        Self::Purple,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Infra => "Infra",
            Self::WebApp => "WebApp",
            Self::Pci => "PCI",
            Self::Ot => "OT",
            Self::External => "External",
            Self::Purple => "Purple",
        }
    }
}

closed_enum_impls!(EngagementType, "engagement type");

// ---------------------------------------------------------------------------
// EngagementStatus
// ---------------------------------------------------------------------------

/// Status of an engagement. New engagements start as `Planned`; updates may
/// set any value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum EngagementStatus {
    Planned,
    #[serde(rename = "In-Progress", alias = "InProgress")]
    InProgress,
    Reporting,
    #[serde(alias = "Complete")]
    Completed,
    #[serde(rename = "On-Hold", alias = "OnHold")]
    OnHold,
}

impl EngagementStatus {
    pub const ALL: [Self; 5] = [
        Self::Planned,
        Self::InProgress,
        Self::Reporting,
        Self::Completed,
        Self::OnHold,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "Planned",
            Self::InProgress => "In-Progress",
            Self::Reporting => "Reporting",
            Self::Completed => "Completed",
            Self::OnHold => "On-Hold",
        }
    }
}

closed_enum_impls!(EngagementStatus, "engagement status");

// ---------------------------------------------------------------------------
// IntakeStatus
// ---------------------------------------------------------------------------

/// Status of an intake request.
///
/// ```text
/// New → Reviewed → Promoted
///     → Promoted
///     → Rejected → Promoted
/// New | Reviewed → Rejected
/// ```
///
/// `Promoted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum IntakeStatus {
    New,
    Reviewed,
    Promoted,
    Rejected,
}

impl IntakeStatus {
    pub const ALL: [Self; 4] = [Self::New, Self::Reviewed, Self::Promoted, Self::Rejected];

    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::New => &[Self::Reviewed, Self::Promoted, Self::Rejected],
            Self::Reviewed => &[Self::Promoted, Self::Rejected],
            Self::Rejected => &[Self::Promoted],
            Self::Promoted => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Promoted)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Reviewed => "Reviewed",
            Self::Promoted => "Promoted",
            Self::Rejected => "Rejected",
        }
    }
}

closed_enum_impls!(IntakeStatus, "intake status");

// ---------------------------------------------------------------------------
// AssetType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum AssetType {
    Host,
    #[serde(rename = "IP-Range", alias = "IpRange")]
    IpRange,
    Domain,
    App,
    #[serde(rename = "URL", alias = "Url")]
    Url,
    #[serde(rename = "Cloud-Account", alias = "CloudAccount")]
    CloudAccount,
    #[serde(rename = "OT-Device", alias = "OtDevice")]
    OtDevice,
    Other,
}

impl AssetType {
    pub const ALL: [Self; 8] = [
        Self::Host,
        Self::IpRange,
        Self::Domain,
        Self::App,
        Self::Url,
        Self::CloudAccount,
        Self::OtDevice,
        Self::Other,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Host => "Host",
            Self::IpRange => "IP-Range",
            Self::Domain => "Domain",
            Self::App => "App",
            Self::Url => "URL",
            Self::CloudAccount => "Cloud-Account",
            Self::OtDevice => "OT-Device",
            Self::Other => "Other",
        }
    }
}

closed_enum_impls!(AssetType, "asset type");

// ---------------------------------------------------------------------------
// RiskLevel
// ---------------------------------------------------------------------------

/// Risk level of an intake request, and criticality of an asset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

closed_enum_impls!(RiskLevel, "risk level");

// ---------------------------------------------------------------------------
// UserRole
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum UserRole {
    #[serde(alias = "admin")]
    Admin,
    #[serde(alias = "red")]
    Red,
    #[serde(alias = "blue")]
    Blue,
    #[serde(alias = "manager")]
    Manager,
}

impl UserRole {
    pub const ALL: [Self; 4] = [Self::Admin, Self::Red, Self::Blue, Self::Manager];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Red => "Red",
            Self::Blue => "Blue",
            Self::Manager => "Manager",
        }
    }
}

closed_enum_impls!(UserRole, "role");

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // --- Serde roundtrip tests ---

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected_str:expr) => {
            #[test]
            fn $name() {
                let val: $ty = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected_str));
                let recovered: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(recovered, val);
            }
        };
    }

    test_serde_roundtrip!(severity_critical, Severity, Severity::Critical, "Critical");
    test_serde_roundtrip!(
        finding_accepted_risk,
        FindingStatus,
        FindingStatus::AcceptedRisk,
        "Accepted-Risk"
    );
    test_serde_roundtrip!(
        finding_false_positive,
        FindingStatus,
        FindingStatus::FalsePositive,
        "False-Positive"
    );
    test_serde_roundtrip!(
        remediation_not_started,
        RemediationStatus,
        RemediationStatus::NotStarted,
        "Not-Started"
    );
    test_serde_roundtrip!(
        remediation_wont_fix,
        RemediationStatus,
        RemediationStatus::WontFix,
        "Wont-Fix"
    );
    test_serde_roundtrip!(
        detection_not_applicable,
        DetectionStatus,
        DetectionStatus::NotApplicable,
        "Not-Applicable"
    );
    test_serde_roundtrip!(
        engagement_type_pci,
        EngagementType,
        EngagementType::Pci,
        "PCI"
    );
    test_serde_roundtrip!(
        engagement_type_webapp,
        EngagementType,
        EngagementType::WebApp,
        "WebApp"
    );
    test_serde_roundtrip!(
        engagement_in_progress,
        EngagementStatus,
        EngagementStatus::InProgress,
        "In-Progress"
    );
    test_serde_roundtrip!(
        engagement_on_hold,
        EngagementStatus,
        EngagementStatus::OnHold,
        "On-Hold"
    );
    test_serde_roundtrip!(intake_promoted, IntakeStatus, IntakeStatus::Promoted, "Promoted");
    test_serde_roundtrip!(asset_ip_range, AssetType, AssetType::IpRange, "IP-Range");
    test_serde_roundtrip!(asset_url, AssetType, AssetType::Url, "URL");
    test_serde_roundtrip!(
        asset_cloud_account,
        AssetType,
        AssetType::CloudAccount,
        "Cloud-Account"
    );
    test_serde_roundtrip!(risk_high, RiskLevel, RiskLevel::High, "High");
    test_serde_roundtrip!(role_manager, UserRole, UserRole::Manager, "Manager");

    // --- Aliases ---

    #[rstest]
    #[case("InProgress", EngagementStatus::InProgress)]
    #[case("Complete", EngagementStatus::Completed)]
    #[case("OnHold", EngagementStatus::OnHold)]
    fn engagement_status_aliases(#[case] input: &str, #[case] expected: EngagementStatus) {
        assert_eq!(input.parse::<EngagementStatus>().unwrap(), expected);
    }

    #[rstest]
    #[case("AcceptedRisk", FindingStatus::AcceptedRisk)]
    #[case("FalsePositive", FindingStatus::FalsePositive)]
    fn finding_status_aliases(#[case] input: &str, #[case] expected: FindingStatus) {
        assert_eq!(input.parse::<FindingStatus>().unwrap(), expected);
    }

    // --- Rejection of values outside the enumeration ---

    #[rstest]
    #[case("Severe")]
    #[case("critical")]
    #[case("")]
    fn unknown_severity_is_validation_error(#[case] input: &str) {
        let err = input.parse::<Severity>().unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)), "got {err:?}");
    }

    #[test]
    fn unknown_engagement_status_is_validation_error() {
        let err = "Finished".parse::<EngagementStatus>().unwrap_err();
        assert!(err.to_string().contains("engagement status 'Finished'"));
    }

    #[test]
    fn unknown_value_fails_deserialization() {
        assert!(serde_json::from_str::<FindingStatus>("\"Closed\"").is_err());
    }

    // --- Ordering ---

    #[test]
    fn severity_orders_critical_highest() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert!(Severity::Low > Severity::Info);
        assert_eq!(Severity::ALL.iter().max(), Some(&Severity::Critical));
    }

    #[test]
    fn severity_all_is_descending() {
        assert!(Severity::ALL.windows(2).all(|w| w[0] > w[1]));
    }

    // --- Transition tests ---

    #[test]
    fn intake_valid_transitions() {
        assert!(IntakeStatus::New.can_transition_to(IntakeStatus::Reviewed));
        assert!(IntakeStatus::New.can_transition_to(IntakeStatus::Promoted));
        assert!(IntakeStatus::Reviewed.can_transition_to(IntakeStatus::Promoted));
        assert!(IntakeStatus::Reviewed.can_transition_to(IntakeStatus::Rejected));
        assert!(IntakeStatus::Rejected.can_transition_to(IntakeStatus::Promoted));
    }

    #[test]
    fn intake_promoted_is_terminal() {
        assert!(IntakeStatus::Promoted.is_terminal());
        assert!(IntakeStatus::Promoted.allowed_next_states().is_empty());
        assert!(!IntakeStatus::Promoted.can_transition_to(IntakeStatus::Rejected));
    }

    // --- Display / as_str tests ---

    #[test]
    fn display_matches_as_str() {
        for s in Severity::ALL {
            assert_eq!(s.to_string(), s.as_str());
            assert_eq!(s.as_str().parse::<Severity>().unwrap(), s);
        }
        for s in FindingStatus::ALL {
            assert_eq!(s.as_str().parse::<FindingStatus>().unwrap(), s);
        }
        for s in RemediationStatus::ALL {
            assert_eq!(s.as_str().parse::<RemediationStatus>().unwrap(), s);
        }
        for s in AssetType::ALL {
            assert_eq!(s.as_str().parse::<AssetType>().unwrap(), s);
        }
        assert_eq!(format!("{}", EngagementType::Ot), "OT");
        assert_eq!(format!("{}", DetectionStatus::Missed), "Missed");
    }
}
