//! Shared test utilities for offsec-db unit tests.

use offsec_core::entities::{Asset, Engagement};
use offsec_core::enums::{AssetType, EngagementType, UserRole};
use offsec_core::identity::Actor;

use crate::DEFAULT_BUSY_TIMEOUT;
use crate::inputs::{NewAsset, NewEngagement, NewUser};
use crate::service::OffsecService;

/// Create an in-memory service.
pub async fn test_service() -> OffsecService {
    OffsecService::open_local(":memory:", DEFAULT_BUSY_TIMEOUT)
        .await
        .unwrap()
}

/// Create a user with the given role and return it as an actor.
pub async fn test_actor(svc: &OffsecService, name: &str, role: UserRole) -> Actor {
    let user = svc
        .create_user(NewUser::new(name, role), &format!("hash-{name}"))
        .await
        .unwrap();
    Actor {
        user_id: user.id,
        name: user.name,
        role: user.role,
    }
}

/// An admin actor named `malcolm`.
pub async fn admin(svc: &OffsecService) -> Actor {
    test_actor(svc, "malcolm", UserRole::Admin).await
}

/// Create a WebApp engagement in program year 2025.
pub async fn test_engagement(svc: &OffsecService, actor: &Actor, name: &str) -> Engagement {
    svc.create_engagement(
        actor,
        NewEngagement::new("2025", EngagementType::WebApp, name),
    )
    .await
    .unwrap()
}

/// Create a host asset with the given hostname.
pub async fn test_asset(svc: &OffsecService, host: &str) -> Asset {
    svc.create_asset(NewAsset::new(AssetType::Host, host))
        .await
        .unwrap()
}
