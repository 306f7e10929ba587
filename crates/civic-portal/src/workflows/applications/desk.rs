use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{info, warn};

use super::domain::{ApplicationId, ApplicationRecord, ApplicationStatus, Role};
use super::gateway::ApplicationGateway;
use super::lifecycle::{
    evaluate, is_permitted, require_correction_comment, require_reject_reason, Action,
    LifecycleView, ValidationError,
};
use crate::files::LocalFile;
use crate::gateway::GatewayError;

/// One viewer's working copy of the application list plus the actions they can take on it.
///
/// Every successful action is followed by a full re-list; nothing is patched locally.
pub struct ApplicationDesk<G> {
    gateway: Arc<G>,
    role: Role,
    applications: Vec<ApplicationRecord>,
    staged_forms: HashMap<ApplicationId, LocalFile>,
    uploads: UploadIndicator,
}

impl<G> ApplicationDesk<G>
where
    G: ApplicationGateway + 'static,
{
    pub fn new(gateway: Arc<G>, role: Role) -> Self {
        Self {
            gateway,
            role,
            applications: Vec::new(),
            staged_forms: HashMap::new(),
            uploads: UploadIndicator::default(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Newest first.
    pub fn applications(&self) -> &[ApplicationRecord] {
        &self.applications
    }

    pub fn find(&self, id: &ApplicationId) -> Option<&ApplicationRecord> {
        self.applications.iter().find(|record| &record.id == id)
    }

    pub fn lifecycle(&self, id: &ApplicationId) -> Option<LifecycleView> {
        self.find(id).map(|record| evaluate(record, self.role))
    }

    pub fn upload_indicator(&self) -> UploadIndicator {
        self.uploads.clone()
    }

    /// Replace the local listing with the portal's current view.
    pub async fn refresh(&mut self) -> Result<&[ApplicationRecord], DeskError> {
        let mut records = self
            .gateway
            .list_applications(self.role)
            .await
            .map_err(DeskError::Listing)?;
        records.reverse();

        for record in &records {
            for issue in record.inconsistencies() {
                warn!(
                    application_id = %record.id,
                    status = %record.status,
                    issue = issue.describe(),
                    "portal record breaks lifecycle rules"
                );
            }
        }

        self.applications = records;
        Ok(&self.applications)
    }

    /// Applicants confirm the filled form; operators confirm through their own endpoint.
    pub async fn confirm(&mut self, id: &ApplicationId) -> Result<ActionOutcome, DeskError> {
        self.ensure_permitted(id, Action::Confirm)?;
        let result = match self.role {
            Role::Applicant => self.gateway.confirm(id).await,
            Role::Operator => self.gateway.operator_confirm(id).await,
        };
        self.finish(id, Action::Confirm, result).await
    }

    pub async fn submit_correction(
        &mut self,
        id: &ApplicationId,
        comment: &str,
    ) -> Result<ActionOutcome, DeskError> {
        let comment = require_correction_comment(comment)?;
        self.ensure_permitted(id, Action::SubmitCorrection)?;
        let result = self.gateway.submit_correction(id, comment).await;
        self.finish(id, Action::SubmitCorrection, result).await
    }

    pub async fn reject(
        &mut self,
        id: &ApplicationId,
        reason: &str,
    ) -> Result<ActionOutcome, DeskError> {
        let reason = require_reject_reason(reason)?;
        self.ensure_permitted(id, Action::Reject)?;
        let result = self.gateway.reject(id, reason).await;
        self.finish(id, Action::Reject, result).await
    }

    /// Hold a filled PDF against an application until the operator uploads it.
    pub fn stage_form(&mut self, id: &ApplicationId, form: LocalFile) -> Result<(), DeskError> {
        self.ensure_permitted(id, Action::Upload)?;
        if !form.is_pdf() {
            return Err(ValidationError::NotPdf {
                file_name: form.file_name,
            }
            .into());
        }
        self.staged_forms.insert(id.clone(), form);
        Ok(())
    }

    pub fn staged_form(&self, id: &ApplicationId) -> Option<&LocalFile> {
        self.staged_forms.get(id)
    }

    /// The indicator reads "Uploading..." for `id` until the follow-up re-list finishes.
    pub async fn upload_staged_form(
        &mut self,
        id: &ApplicationId,
    ) -> Result<ActionOutcome, DeskError> {
        let form = self
            .staged_forms
            .get(id)
            .cloned()
            .ok_or(ValidationError::NoFormSelected)?;
        self.ensure_permitted(id, Action::Upload)?;

        self.uploads.begin(id);
        let result = self.gateway.upload_form(id, &form).await;
        if result.is_ok() {
            self.staged_forms.remove(id);
        }
        let outcome = self.finish(id, Action::Upload, result).await;
        self.uploads.finish(id);
        outcome
    }

    fn ensure_permitted(&self, id: &ApplicationId, action: Action) -> Result<(), DeskError> {
        let record = self
            .find(id)
            .ok_or_else(|| DeskError::UnknownApplication(id.clone()))?;

        if is_permitted(record.status, self.role, action) {
            Ok(())
        } else {
            Err(DeskError::NotPermitted {
                action,
                status: record.status,
                role: self.role,
            })
        }
    }

    async fn finish(
        &mut self,
        id: &ApplicationId,
        action: Action,
        result: Result<(), GatewayError>,
    ) -> Result<ActionOutcome, DeskError> {
        if let Err(source) = result {
            warn!(application_id = %id, %action, role = %self.role, error = %source, "portal action failed");
            return Err(DeskError::Gateway {
                action,
                role: self.role,
                source,
            });
        }

        info!(application_id = %id, %action, role = %self.role, "portal action accepted");

        let refreshed = match self.refresh().await {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "re-list after action failed; keeping previous listing");
                false
            }
        };

        Ok(ActionOutcome {
            application_id: id.clone(),
            action,
            alert: success_alert(action, self.role),
            refreshed,
        })
    }
}

/// Result of an accepted action, with the alert the viewer should see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub application_id: ApplicationId,
    pub action: Action,
    pub alert: &'static str,
    pub refreshed: bool,
}

pub const fn success_alert(action: Action, role: Role) -> &'static str {
    match (action, role) {
        (Action::Confirm, Role::Applicant) => "Application confirmed!",
        (Action::Confirm, Role::Operator) => "Application confirmed",
        (Action::SubmitCorrection, _) => "Correction sent to operator.",
        (Action::Reject, _) => "Application rejected",
        (Action::Upload, _) => "PDF uploaded successfully",
    }
}

pub const fn failure_alert(action: Action, role: Role) -> &'static str {
    match (action, role) {
        (Action::Confirm, Role::Applicant) => "Failed to confirm application.",
        (Action::Confirm, Role::Operator) => "Confirmation failed",
        (Action::SubmitCorrection, _) => "Failed to send correction.",
        (Action::Reject, _) => "Rejection failed",
        (Action::Upload, _) => "Upload failed",
    }
}

pub const UPLOAD_LABEL: &str = "Upload";
pub const UPLOADING_LABEL: &str = "Uploading...";

/// Shared flag naming the application whose filled form is currently in flight.
#[derive(Debug, Clone, Default)]
pub struct UploadIndicator {
    active: Arc<Mutex<Option<ApplicationId>>>,
}

impl UploadIndicator {
    pub fn is_uploading(&self, id: &ApplicationId) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            == Some(id)
    }

    pub fn label(&self, id: &ApplicationId) -> &'static str {
        if self.is_uploading(id) {
            UPLOADING_LABEL
        } else {
            UPLOAD_LABEL
        }
    }

    fn begin(&self, id: &ApplicationId) {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = Some(id.clone());
    }

    fn finish(&self, id: &ApplicationId) {
        let mut guard = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.as_ref() == Some(id) {
            *guard = None;
        }
    }
}

/// Error raised by the application desk.
#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("cannot {action} a {status} application as {role}")]
    NotPermitted {
        action: Action,
        status: ApplicationStatus,
        role: Role,
    },
    #[error("application {0} is not in the current listing")]
    UnknownApplication(ApplicationId),
    #[error("{action} request failed: {source}")]
    Gateway {
        action: Action,
        role: Role,
        #[source]
        source: GatewayError,
    },
    #[error("failed to load applications: {0}")]
    Listing(#[source] GatewayError),
}

impl DeskError {
    /// Short message for the viewer; transport details stay in the logs.
    pub fn alert(&self) -> String {
        match self {
            DeskError::Gateway { action, role, .. } => failure_alert(*action, *role).to_string(),
            DeskError::Listing(_) => "Failed to load applications.".to_string(),
            DeskError::Validation(_)
            | DeskError::NotPermitted { .. }
            | DeskError::UnknownApplication(_) => self.to_string(),
        }
    }

    pub fn issued_request(&self) -> bool {
        matches!(self, DeskError::Gateway { .. } | DeskError::Listing(_))
    }
}
