use serde::Serialize;

use super::desk::UploadIndicator;
use super::domain::{ApplicationId, ApplicationRecord, Role};
use super::lifecycle::{evaluate, Action, StatusTone};
use crate::files::FileLocator;
use crate::workflows::profile::{DocumentSlot, UserProfile};

pub const NO_APPLICATIONS: &str = "No applications found.";
pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_DOCUMENTS: &str = "No documents uploaded.";

/// A table or its empty-state message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableView<R> {
    Empty { message: &'static str },
    Rows { rows: Vec<R> },
}

impl<R> TableView<R> {
    fn from_rows(rows: Vec<R>) -> Self {
        if rows.is_empty() {
            TableView::Empty {
                message: NO_APPLICATIONS,
            }
        } else {
            TableView::Rows { rows }
        }
    }

    pub fn rows(&self) -> &[R] {
        match self {
            TableView::Empty { .. } => &[],
            TableView::Rows { rows } => rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicantRow {
    pub application_id: ApplicationId,
    pub service: String,
    pub status_label: &'static str,
    pub tone: StatusTone,
    pub reject_reason: Option<String>,
    pub form_link: Option<String>,
    pub certificate_link: Option<String>,
    pub actions: Vec<Action>,
    pub confirmed: bool,
}

impl ApplicantRow {
    pub fn form_cell(&self) -> &str {
        self.form_link.as_deref().unwrap_or("Not uploaded")
    }

    pub fn certificate_cell(&self) -> &str {
        self.certificate_link.as_deref().unwrap_or("Not available")
    }
}

pub fn applicant_table(
    records: &[ApplicationRecord],
    files: &FileLocator,
) -> TableView<ApplicantRow> {
    let rows = records
        .iter()
        .map(|record| {
            let view = evaluate(record, Role::Applicant);
            ApplicantRow {
                application_id: record.id.clone(),
                service: record.service_name().unwrap_or(NOT_AVAILABLE).to_string(),
                status_label: view.status.label(),
                tone: view.tone,
                reject_reason: view.reject_reason,
                form_link: record.form_pdf.as_ref().map(|file| files.url_for_file(file)),
                certificate_link: view.certificate.as_ref().map(|file| files.url_for_file(file)),
                actions: view.actions.to_vec(),
                confirmed: view.confirmed,
            }
        })
        .collect();
    TableView::from_rows(rows)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorRow {
    pub application_id: ApplicationId,
    pub applicant: String,
    pub mobile: Option<String>,
    pub service: String,
    pub status_label: &'static str,
    pub upload_label: Option<&'static str>,
    pub actions: Vec<Action>,
    pub reject_reason: Option<String>,
    pub correction_comment: Option<String>,
}

/// Rows for already-filtered records; `upload_label` is set only where upload is allowed.
pub fn operator_table(
    records: &[&ApplicationRecord],
    uploads: &UploadIndicator,
) -> TableView<OperatorRow> {
    let rows = records
        .iter()
        .map(|record| {
            let view = evaluate(record, Role::Operator);
            OperatorRow {
                application_id: record.id.clone(),
                applicant: record.applicant_name().unwrap_or(NOT_AVAILABLE).to_string(),
                mobile: record.applicant_mobile().map(str::to_string),
                service: record.service_name().unwrap_or(NOT_AVAILABLE).to_string(),
                status_label: view.status.label(),
                upload_label: view
                    .actions
                    .contains(&Action::Upload)
                    .then(|| uploads.label(&record.id)),
                actions: view.actions.to_vec(),
                reject_reason: view.reject_reason,
                correction_comment: record.pending_correction().map(str::to_string),
            }
        })
        .collect();
    TableView::from_rows(rows)
}

/// Read-only profile summary the operator opens from a listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileCard {
    pub name: String,
    pub gender: String,
    pub dob: String,
    pub caste: String,
    pub documents: Vec<DocumentLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentLink {
    pub label: String,
    pub url: String,
}

impl ProfileCard {
    pub fn document_lines(&self) -> Vec<String> {
        if self.documents.is_empty() {
            return vec![NO_DOCUMENTS.to_string()];
        }
        self.documents
            .iter()
            .map(|doc| format!("{}: {}", doc.label, doc.url))
            .collect()
    }
}

pub fn profile_card(profile: &UserProfile, files: &FileLocator) -> ProfileCard {
    let details = &profile.details;
    let or_na = |value: Option<&str>| value.unwrap_or(NOT_AVAILABLE).to_string();

    let slot_documents = profile
        .documents()
        .filter(|(slot, _)| *slot != DocumentSlot::ProfilePicture)
        .map(|(slot, file)| DocumentLink {
            label: slot.label().to_string(),
            url: files.url_for_file(file),
        });
    let named_documents = profile.named_documents().iter().map(|doc| DocumentLink {
        label: doc.doc_name.clone(),
        url: files.url_for(&doc.filename),
    });

    ProfileCard {
        name: or_na(details.name.as_deref()),
        gender: or_na(details.gender.as_deref()),
        dob: details
            .dob
            .map(|dob| dob.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        caste: or_na(details.caste.as_deref()),
        documents: slot_documents.chain(named_documents).collect(),
    }
}
