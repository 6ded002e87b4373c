//! Request identity configuration.

use serde::{Deserialize, Serialize};

/// How the API resolves the acting user for a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Every request must carry a valid `X-API-Key`.
    #[default]
    Token,
    /// Requests without a key act as the fallback user. Local development only.
    Fallback,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthMode,

    /// User name that keyless requests act as in fallback mode. When unset,
    /// the earliest created user is used.
    #[serde(default)]
    pub fallback_user: Option<String>,
}
