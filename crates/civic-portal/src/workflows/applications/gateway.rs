use async_trait::async_trait;

use super::domain::{ApplicationId, ApplicationRecord, Role};
use crate::files::LocalFile;
use crate::gateway::GatewayError;

/// Remote operations on applications so the desk can be exercised without a live portal.
///
/// Mutations return nothing useful; callers re-list to learn the new state.
#[async_trait]
pub trait ApplicationGateway: Send + Sync {
    /// Applications visible to `role`, in the order the portal returns them (oldest first).
    async fn list_applications(&self, role: Role) -> Result<Vec<ApplicationRecord>, GatewayError>;

    /// Applicant accepts the operator's filled form.
    async fn confirm(&self, id: &ApplicationId) -> Result<(), GatewayError>;

    async fn submit_correction(&self, id: &ApplicationId, comment: &str)
        -> Result<(), GatewayError>;

    /// Operator-side confirmation; a different transition from the applicant's.
    async fn operator_confirm(&self, id: &ApplicationId) -> Result<(), GatewayError>;

    async fn reject(&self, id: &ApplicationId, reason: &str) -> Result<(), GatewayError>;

    async fn upload_form(&self, id: &ApplicationId, form: &LocalFile) -> Result<(), GatewayError>;
}
