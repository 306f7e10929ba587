//! Central transition table: which role may do what at each status, and what each viewer sees.

use std::fmt;

use serde::Serialize;

use super::domain::{ApplicationRecord, ApplicationStatus, Role};
use crate::files::StoredFile;

/// Something a viewer can ask the portal to do to an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Upload,
    Confirm,
    Reject,
    SubmitCorrection,
}

impl Action {
    pub const fn label(self) -> &'static str {
        match self {
            Action::Upload => "upload",
            Action::Confirm => "confirm",
            Action::Reject => "reject",
            Action::SubmitCorrection => "submit correction",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const OPERATOR_OPEN: &[Action] = &[Action::Upload, Action::Confirm, Action::Reject];
const OPERATOR_AWAITING_APPLICANT: &[Action] = &[Action::Confirm, Action::Reject];
const APPLICANT_AWAITING_APPLICANT: &[Action] = &[Action::Confirm, Action::SubmitCorrection];
const NONE: &[Action] = &[];

/// Ordered actions `role` may take on an application in `status`.
pub fn permitted_actions(status: ApplicationStatus, role: Role) -> &'static [Action] {
    use ApplicationStatus::*;

    match (role, status) {
        (Role::Operator, Pending | Submitted | InReview) => OPERATOR_OPEN,
        (Role::Operator, PendingConfirmation) => OPERATOR_AWAITING_APPLICANT,
        (Role::Applicant, PendingConfirmation) => APPLICANT_AWAITING_APPLICANT,
        (Role::Applicant, Pending | Submitted | InReview) | (_, Confirmed | Rejected | Completed) => {
            NONE
        }
    }
}

pub fn is_permitted(status: ApplicationStatus, role: Role, action: Action) -> bool {
    permitted_actions(status, role).contains(&action)
}

/// Badge colouring for a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Neutral,
    Warning,
    Success,
    Danger,
}

pub const fn status_tone(status: ApplicationStatus) -> StatusTone {
    match status {
        ApplicationStatus::Rejected => StatusTone::Danger,
        ApplicationStatus::PendingConfirmation => StatusTone::Warning,
        ApplicationStatus::Confirmed => StatusTone::Success,
        ApplicationStatus::Pending
        | ApplicationStatus::Submitted
        | ApplicationStatus::InReview
        | ApplicationStatus::Completed => StatusTone::Neutral,
    }
}

/// Everything a viewer is shown about one application, derived from status alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleView {
    pub status: ApplicationStatus,
    pub tone: StatusTone,
    pub actions: &'static [Action],
    pub reject_reason: Option<String>,
    pub certificate: Option<StoredFile>,
    pub confirmed: bool,
}

pub fn evaluate(record: &ApplicationRecord, role: Role) -> LifecycleView {
    LifecycleView {
        status: record.status,
        tone: status_tone(record.status),
        actions: permitted_actions(record.status, role),
        reject_reason: record.visible_reject_reason().map(str::to_string),
        certificate: record.downloadable_certificate().cloned(),
        confirmed: record.status == ApplicationStatus::Confirmed,
    }
}

/// Local refusals raised before any request is issued.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Rejection reason is required")]
    BlankRejectReason,
    #[error("Please enter correction reason.")]
    BlankCorrectionComment,
    #[error("Please select a PDF file")]
    NoFormSelected,
    #[error("{file_name} is not a PDF file")]
    NotPdf { file_name: String },
}

pub fn require_reject_reason(reason: &str) -> Result<&str, ValidationError> {
    if reason.trim().is_empty() {
        return Err(ValidationError::BlankRejectReason);
    }
    Ok(reason)
}

pub fn require_correction_comment(comment: &str) -> Result<&str, ValidationError> {
    if comment.trim().is_empty() {
        return Err(ValidationError::BlankCorrectionComment);
    }
    Ok(comment)
}
