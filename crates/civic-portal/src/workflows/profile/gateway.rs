use async_trait::async_trait;

use super::domain::{DocumentSlot, ProfileUpdate, UserProfile};
use crate::gateway::GatewayError;

/// Remote profile operations. Each mutation answers with the full, authoritative profile.
#[async_trait]
pub trait ProfileGateway: Send + Sync {
    async fn fetch_profile(&self) -> Result<UserProfile, GatewayError>;

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, GatewayError>;

    async fn delete_document(&self, slot: DocumentSlot) -> Result<UserProfile, GatewayError>;
}
