use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::UserRole;

/// The resolved caller of a request, used for attribution.
///
/// Produced by `offsec-auth`, consumed by `offsec-db` (as `created_by`,
/// `owner_id`, `author_id`) and `offsec-api`. Carries no credentials.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub name: String,
    pub role: UserRole,
}

impl Actor {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
