use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{DocumentSlot, PersonalDetails, ProfileUpdate, UserProfile};
use super::gateway::ProfileGateway;
use crate::files::{LocalFile, StoredFile, MAX_UPLOAD_BYTES};
use crate::gateway::GatewayError;

/// What a slot currently holds, locally and on the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState<'a> {
    Empty,
    Staged(&'a LocalFile),
    Stored(&'a StoredFile),
    Replacing {
        stored: &'a StoredFile,
        staged: &'a LocalFile,
    },
}

/// Explicit yes/no before a stored document is removed.
pub trait DeletionConfirmer {
    fn confirm_deletion(&self, slot: DocumentSlot, file: &StoredFile) -> bool;
}

impl<F> DeletionConfirmer for F
where
    F: Fn(DocumentSlot, &StoredFile) -> bool,
{
    fn confirm_deletion(&self, slot: DocumentSlot, file: &StoredFile) -> bool {
        self(slot, file)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

/// Profile editor state: the last authoritative profile, edited fields, and staged files.
pub struct DocumentSlotManager<G> {
    gateway: Arc<G>,
    profile: Option<UserProfile>,
    details: PersonalDetails,
    staged: BTreeMap<DocumentSlot, LocalFile>,
}

impl<G> DocumentSlotManager<G>
where
    G: ProfileGateway + 'static,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            profile: None,
            details: PersonalDetails::default(),
            staged: BTreeMap::new(),
        }
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn details(&self) -> &PersonalDetails {
        &self.details
    }

    pub fn staged(&self) -> impl Iterator<Item = (DocumentSlot, &LocalFile)> {
        self.staged.iter().map(|(slot, file)| (*slot, file))
    }

    pub fn slot_state(&self, slot: DocumentSlot) -> SlotState<'_> {
        let stored = self.profile.as_ref().and_then(|profile| profile.document(slot));
        match (stored, self.staged.get(&slot)) {
            (None, None) => SlotState::Empty,
            (None, Some(staged)) => SlotState::Staged(staged),
            (Some(stored), None) => SlotState::Stored(stored),
            (Some(stored), Some(staged)) => SlotState::Replacing { stored, staged },
        }
    }

    pub async fn load(&mut self) -> Result<&UserProfile, ProfileError> {
        let profile = self
            .gateway
            .fetch_profile()
            .await
            .map_err(|source| ProfileError::gateway(ProfileOperation::Load, source))?;
        Ok(self.replace(profile))
    }

    pub fn edit_details(&mut self, details: PersonalDetails) {
        self.details = details;
    }

    /// Oversized selections are refused and leave every slot as it was.
    pub fn stage(&mut self, slot: DocumentSlot, file: LocalFile) -> Result<(), ProfileError> {
        if file.exceeds_upload_limit() {
            return Err(ProfileError::FileTooLarge {
                slot,
                size: file.size(),
                limit: MAX_UPLOAD_BYTES,
            });
        }
        self.staged.insert(slot, file);
        Ok(())
    }

    pub fn unstage(&mut self, slot: DocumentSlot) -> Option<LocalFile> {
        self.staged.remove(&slot)
    }

    /// Sends edited fields and every staged file in one request; unstaged slots are left out
    /// so the portal keeps what it has. Staged files survive a failed submission.
    pub async fn submit(&mut self) -> Result<&UserProfile, ProfileError> {
        let update = ProfileUpdate {
            details: self.details.clone(),
            files: std::mem::take(&mut self.staged),
        };

        match self.gateway.update_profile(&update).await {
            Ok(profile) => {
                info!(documents = update.files.len(), "profile updated");
                Ok(self.replace(profile))
            }
            Err(source) => {
                self.staged = update.files;
                Err(ProfileError::gateway(ProfileOperation::Update, source))
            }
        }
    }

    /// Removes a stored document after the confirmer agrees. Declining sends nothing.
    pub async fn delete(
        &mut self,
        slot: DocumentSlot,
        confirmer: &dyn DeletionConfirmer,
    ) -> Result<DeleteOutcome, ProfileError> {
        let stored = self
            .profile
            .as_ref()
            .and_then(|profile| profile.document(slot))
            .ok_or(ProfileError::SlotEmpty(slot))?;

        if !confirmer.confirm_deletion(slot, stored) {
            return Ok(DeleteOutcome::Cancelled);
        }

        let profile = self
            .gateway
            .delete_document(slot)
            .await
            .map_err(|source| ProfileError::gateway(ProfileOperation::DeleteDocument, source))?;
        info!(%slot, "profile document deleted");
        self.replace(profile);
        Ok(DeleteOutcome::Deleted)
    }

    fn replace(&mut self, profile: UserProfile) -> &UserProfile {
        self.details = profile.details.clone();
        self.profile.insert(profile)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileOperation {
    Load,
    Update,
    DeleteDocument,
}

impl ProfileOperation {
    pub const fn failure_alert(self) -> &'static str {
        match self {
            ProfileOperation::Load => "Failed to load profile.",
            ProfileOperation::Update => "Failed to update profile.",
            ProfileOperation::DeleteDocument => "Failed to delete document.",
        }
    }
}

/// Error raised by the document slot manager.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("File too large (max 5MB): {slot} is {size} bytes, limit {limit}")]
    FileTooLarge {
        slot: DocumentSlot,
        size: u64,
        limit: u64,
    },
    #[error("no stored document in {0}")]
    SlotEmpty(DocumentSlot),
    #[error("{}: {source}", .operation.failure_alert())]
    Gateway {
        operation: ProfileOperation,
        #[source]
        source: GatewayError,
    },
}

impl ProfileError {
    fn gateway(operation: ProfileOperation, source: GatewayError) -> Self {
        warn!(?operation, error = %source, "profile request failed");
        ProfileError::Gateway { operation, source }
    }

    pub fn alert(&self) -> String {
        match self {
            ProfileError::FileTooLarge { .. } => "File too large (max 5MB)".to_string(),
            ProfileError::SlotEmpty(_) => self.to_string(),
            ProfileError::Gateway { operation, .. } => operation.failure_alert().to_string(),
        }
    }
}
