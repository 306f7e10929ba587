use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::files::{LocalFile, StoredFile};
use crate::gateway::GatewayError;
use crate::workflows::applications::desk::{ApplicationDesk, UploadIndicator};
use crate::workflows::applications::domain::{
    ApplicantRef, ApplicationId, ApplicationRecord, ApplicationStatus, Role, ServiceRef,
};
use crate::workflows::applications::gateway::ApplicationGateway;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Call {
    List(Role),
    Confirm(ApplicationId),
    OperatorConfirm(ApplicationId),
    Correction { id: ApplicationId, comment: String },
    Reject { id: ApplicationId, reason: String },
    Upload { id: ApplicationId, file_name: String },
}

impl Call {
    pub(super) fn is_mutation(&self) -> bool {
        !matches!(self, Call::List(_))
    }
}

/// In-memory portal that applies each transition the way the service does.
#[derive(Default)]
pub(super) struct MemoryGateway {
    records: Mutex<Vec<ApplicationRecord>>,
    calls: Mutex<Vec<Call>>,
    pub(super) fail_mutations: AtomicBool,
    pub(super) fail_listing: AtomicBool,
    watched: Mutex<Option<(UploadIndicator, ApplicationId)>>,
    observed_labels: Mutex<Vec<&'static str>>,
}

impl MemoryGateway {
    pub(super) fn with_records(records: Vec<ApplicationRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub(super) fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    pub(super) fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(Call::is_mutation)
            .collect()
    }

    /// Samples the indicator label for `id` whenever the upload or a re-list reaches the portal.
    pub(super) fn watch_uploads(&self, indicator: UploadIndicator, id: ApplicationId) {
        *self.watched.lock().expect("watch mutex poisoned") = Some((indicator, id));
    }

    pub(super) fn observed_labels(&self) -> Vec<&'static str> {
        self.observed_labels
            .lock()
            .expect("labels mutex poisoned")
            .clone()
    }

    fn observe(&self) {
        if let Some((indicator, id)) = self.watched.lock().expect("watch mutex poisoned").as_ref()
        {
            self.observed_labels
                .lock()
                .expect("labels mutex poisoned")
                .push(indicator.label(id));
        }
    }

    fn record(&self, call: Call, failing: &AtomicBool) -> Result<(), GatewayError> {
        self.calls.lock().expect("calls mutex poisoned").push(call);
        if failing.load(Ordering::SeqCst) {
            return Err(GatewayError::Server {
                status: 500,
                message: "Internal Server Error".to_string(),
            });
        }
        Ok(())
    }

    fn update(&self, id: &ApplicationId, apply: impl FnOnce(&mut ApplicationRecord)) {
        let mut records = self.records.lock().expect("records mutex poisoned");
        if let Some(record) = records.iter_mut().find(|record| &record.id == id) {
            apply(record);
        }
    }
}

#[async_trait]
impl ApplicationGateway for MemoryGateway {
    async fn list_applications(&self, role: Role) -> Result<Vec<ApplicationRecord>, GatewayError> {
        self.observe();
        self.record(Call::List(role), &self.fail_listing)?;
        Ok(self.records.lock().expect("records mutex poisoned").clone())
    }

    async fn confirm(&self, id: &ApplicationId) -> Result<(), GatewayError> {
        self.record(Call::Confirm(id.clone()), &self.fail_mutations)?;
        self.update(id, |record| {
            record.status = ApplicationStatus::Confirmed;
            record.correction_comment = None;
        });
        Ok(())
    }

    async fn submit_correction(
        &self,
        id: &ApplicationId,
        comment: &str,
    ) -> Result<(), GatewayError> {
        self.record(
            Call::Correction {
                id: id.clone(),
                comment: comment.to_string(),
            },
            &self.fail_mutations,
        )?;
        // Status stays at Pending Confirmation; only the comment is attached.
        self.update(id, |record| {
            record.correction_comment = Some(comment.to_string());
        });
        Ok(())
    }

    async fn operator_confirm(&self, id: &ApplicationId) -> Result<(), GatewayError> {
        self.record(Call::OperatorConfirm(id.clone()), &self.fail_mutations)?;
        self.update(id, |record| {
            record.status = match record.status {
                ApplicationStatus::PendingConfirmation => ApplicationStatus::Confirmed,
                _ => ApplicationStatus::PendingConfirmation,
            };
            record.correction_comment = None;
        });
        Ok(())
    }

    async fn reject(&self, id: &ApplicationId, reason: &str) -> Result<(), GatewayError> {
        self.record(
            Call::Reject {
                id: id.clone(),
                reason: reason.to_string(),
            },
            &self.fail_mutations,
        )?;
        self.update(id, |record| {
            record.status = ApplicationStatus::Rejected;
            record.reject_reason = Some(reason.to_string());
            record.correction_comment = None;
        });
        Ok(())
    }

    async fn upload_form(&self, id: &ApplicationId, form: &LocalFile) -> Result<(), GatewayError> {
        self.observe();
        self.record(
            Call::Upload {
                id: id.clone(),
                file_name: form.file_name.clone(),
            },
            &self.fail_mutations,
        )?;
        let stored = format!("{}-{}", id, form.file_name);
        self.update(id, |record| {
            record.form_pdf = Some(StoredFile::new(stored));
            record.status = ApplicationStatus::PendingConfirmation;
        });
        Ok(())
    }
}

pub(super) fn application(id: &str, status: ApplicationStatus) -> ApplicationRecord {
    let mut record = ApplicationRecord::new(id, status);
    record.user = Some(ApplicantRef {
        name: Some(format!("Applicant {id}")),
        mobile: Some(format!("98765{id:0>5}")),
    });
    record.service = Some(ServiceRef {
        name: Some("Income Certificate".to_string()),
    });
    if status == ApplicationStatus::Rejected {
        record.reject_reason = Some("Illegible income proof".to_string());
    }
    record
}

pub(super) fn applicant(name: &str, mobile: &str, status: ApplicationStatus) -> ApplicationRecord {
    let mut record = ApplicationRecord::new(format!("id-{mobile}"), status);
    record.user = Some(ApplicantRef {
        name: Some(name.to_string()),
        mobile: Some(mobile.to_string()),
    });
    record
}

pub(super) fn pdf(name: &str) -> LocalFile {
    LocalFile::new(name, mime::APPLICATION_PDF, b"%PDF-1.4".to_vec())
}

pub(super) async fn open_desk(
    role: Role,
    records: Vec<ApplicationRecord>,
) -> (ApplicationDesk<MemoryGateway>, Arc<MemoryGateway>) {
    let gateway = Arc::new(MemoryGateway::with_records(records));
    let mut desk = ApplicationDesk::new(gateway.clone(), role);
    desk.refresh().await.expect("initial listing loads");
    (desk, gateway)
}
