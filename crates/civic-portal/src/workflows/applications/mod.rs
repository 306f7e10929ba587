//! Service applications as seen by the submitting citizen and by the operator processing them.
//!
//! [`lifecycle`] holds the single transition table; everything else asks it rather than
//! branching on status itself.

pub mod desk;
pub mod domain;
pub mod gateway;
pub mod lifecycle;
pub mod queue;
pub mod views;

#[cfg(test)]
mod tests;

pub use desk::{
    failure_alert, success_alert, ActionOutcome, ApplicationDesk, DeskError, UploadIndicator,
    UPLOADING_LABEL, UPLOAD_LABEL,
};
pub use domain::{
    ApplicantRef, ApplicationId, ApplicationRecord, ApplicationStatus, RecordInconsistency, Role,
    ServiceRef, UnknownStatus,
};
pub use gateway::ApplicationGateway;
pub use lifecycle::{
    evaluate, is_permitted, permitted_actions, status_tone, Action, LifecycleView, StatusTone,
    ValidationError,
};
pub use queue::{status_counts, ApplicationQuery, StatusCount, StatusFilter};
pub use views::{
    applicant_table, operator_table, profile_card, ApplicantRow, OperatorRow, ProfileCard,
    TableView, NO_APPLICATIONS,
};
