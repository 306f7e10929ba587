use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::files::{deserialize_optional_file, StoredFile};
use crate::workflows::profile::UserProfile;

/// Opaque identifier the portal assigns to each application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ApplicationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Lifecycle position of an application, using the portal's exact wire strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    Submitted,
    #[serde(rename = "In Review")]
    InReview,
    #[serde(rename = "Pending Confirmation")]
    PendingConfirmation,
    Confirmed,
    Rejected,
    Completed,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 7] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Submitted,
        ApplicationStatus::InReview,
        ApplicationStatus::PendingConfirmation,
        ApplicationStatus::Confirmed,
        ApplicationStatus::Rejected,
        ApplicationStatus::Completed,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Submitted => "Submitted",
            ApplicationStatus::InReview => "In Review",
            ApplicationStatus::PendingConfirmation => "Pending Confirmation",
            ApplicationStatus::Confirmed => "Confirmed",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Completed => "Completed",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Confirmed | ApplicationStatus::Rejected | ApplicationStatus::Completed
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    /// Accepts the wire label in any case, with spaces, dashes or underscores between words.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(raw);
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| normalize(status.label()) == wanted)
            .ok_or_else(|| UnknownStatus(raw.to_string()))
    }
}

fn normalize(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|ch| !matches!(ch, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Which side of the desk is looking at the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Applicant,
    Operator,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Applicant => "applicant",
            Role::Operator => "operator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The submitting citizen as embedded in application listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApplicantRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
}

/// The requested service type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceRef {
    #[serde(default)]
    pub name: Option<String>,
}

/// Read-only mirror of an application as the portal last reported it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    #[serde(rename = "_id")]
    pub id: ApplicationId,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub user: Option<ApplicantRef>,
    #[serde(default)]
    pub user_profile: Option<UserProfile>,
    #[serde(default)]
    pub service: Option<ServiceRef>,
    #[serde(default, deserialize_with = "deserialize_optional_file")]
    pub form_pdf: Option<StoredFile>,
    #[serde(default, deserialize_with = "deserialize_optional_file")]
    pub certificate: Option<StoredFile>,
    #[serde(default)]
    pub reject_reason: Option<String>,
    #[serde(default)]
    pub correction_comment: Option<String>,
}

/// Ways a server-reported record can contradict the lifecycle rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordInconsistency {
    RejectedWithoutReason,
    ReasonWithoutRejection,
    CertificateBeforeCompletion,
}

impl RecordInconsistency {
    pub const fn describe(self) -> &'static str {
        match self {
            RecordInconsistency::RejectedWithoutReason => "rejected application has no reason",
            RecordInconsistency::ReasonWithoutRejection => {
                "reject reason present on an application that is not rejected"
            }
            RecordInconsistency::CertificateBeforeCompletion => {
                "certificate present on an application that is not completed"
            }
        }
    }
}

impl ApplicationRecord {
    pub fn new(id: impl Into<String>, status: ApplicationStatus) -> Self {
        Self {
            id: ApplicationId(id.into()),
            status,
            user: None,
            user_profile: None,
            service: None,
            form_pdf: None,
            certificate: None,
            reject_reason: None,
            correction_comment: None,
        }
    }

    pub fn applicant_name(&self) -> Option<&str> {
        self.user.as_ref().and_then(|user| user.name.as_deref())
    }

    pub fn applicant_mobile(&self) -> Option<&str> {
        self.user.as_ref().and_then(|user| user.mobile.as_deref())
    }

    pub fn service_name(&self) -> Option<&str> {
        self.service.as_ref().and_then(|service| service.name.as_deref())
    }

    /// Reason shown to viewers: only for rejected applications, only when non-blank.
    pub fn visible_reject_reason(&self) -> Option<&str> {
        if self.status != ApplicationStatus::Rejected {
            return None;
        }
        non_blank(self.reject_reason.as_deref())
    }

    /// Certificate offered for download: only once the application is completed.
    pub fn downloadable_certificate(&self) -> Option<&StoredFile> {
        if self.status != ApplicationStatus::Completed {
            return None;
        }
        self.certificate.as_ref()
    }

    pub fn pending_correction(&self) -> Option<&str> {
        non_blank(self.correction_comment.as_deref())
    }

    pub fn inconsistencies(&self) -> Vec<RecordInconsistency> {
        let mut found = Vec::new();
        let has_reason = non_blank(self.reject_reason.as_deref()).is_some();
        match (self.status == ApplicationStatus::Rejected, has_reason) {
            (true, false) => found.push(RecordInconsistency::RejectedWithoutReason),
            (false, true) => found.push(RecordInconsistency::ReasonWithoutRejection),
            _ => {}
        }
        if self.certificate.is_some() && self.status != ApplicationStatus::Completed {
            found.push(RecordInconsistency::CertificateBeforeCompletion);
        }
        found
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}
