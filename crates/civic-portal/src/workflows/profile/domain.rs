use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::files::{LocalFile, StoredFile};

/// Fixed, named places a citizen can keep one uploaded document each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocumentSlot {
    TenthCertificate,
    TenthMarksheet,
    TwelfthCertificate,
    TwelfthMarksheet,
    GraduationDegree,
    Domicile,
    PgCertificate,
    CasteValidity,
    OtherDocument,
    ProfilePicture,
}

impl DocumentSlot {
    /// Certificate and marksheet slots, in form order. Excludes the profile picture.
    pub const DOCUMENTS: [DocumentSlot; 9] = [
        DocumentSlot::TenthCertificate,
        DocumentSlot::TenthMarksheet,
        DocumentSlot::TwelfthCertificate,
        DocumentSlot::TwelfthMarksheet,
        DocumentSlot::GraduationDegree,
        DocumentSlot::Domicile,
        DocumentSlot::PgCertificate,
        DocumentSlot::CasteValidity,
        DocumentSlot::OtherDocument,
    ];

    pub const ALL: [DocumentSlot; 10] = [
        DocumentSlot::TenthCertificate,
        DocumentSlot::TenthMarksheet,
        DocumentSlot::TwelfthCertificate,
        DocumentSlot::TwelfthMarksheet,
        DocumentSlot::GraduationDegree,
        DocumentSlot::Domicile,
        DocumentSlot::PgCertificate,
        DocumentSlot::CasteValidity,
        DocumentSlot::OtherDocument,
        DocumentSlot::ProfilePicture,
    ];

    /// Key used in profile payloads, multipart forms and the delete endpoint.
    pub const fn field_name(self) -> &'static str {
        match self {
            DocumentSlot::TenthCertificate => "tenthCertificate",
            DocumentSlot::TenthMarksheet => "tenthMarksheet",
            DocumentSlot::TwelfthCertificate => "twelfthCertificate",
            DocumentSlot::TwelfthMarksheet => "twelfthMarksheet",
            DocumentSlot::GraduationDegree => "graduationDegree",
            DocumentSlot::Domicile => "domicile",
            DocumentSlot::PgCertificate => "pgCertificate",
            DocumentSlot::CasteValidity => "casteValidity",
            DocumentSlot::OtherDocument => "otherDocument",
            DocumentSlot::ProfilePicture => "profilePic",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            DocumentSlot::TenthCertificate => "10th Certificate",
            DocumentSlot::TenthMarksheet => "10th Marksheet",
            DocumentSlot::TwelfthCertificate => "12th Certificate",
            DocumentSlot::TwelfthMarksheet => "12th Marksheet",
            DocumentSlot::GraduationDegree => "Graduation Degree",
            DocumentSlot::Domicile => "Domicile",
            DocumentSlot::PgCertificate => "PG Certificate",
            DocumentSlot::CasteValidity => "Caste Validity",
            DocumentSlot::OtherDocument => "Other Document",
            DocumentSlot::ProfilePicture => "Profile Picture",
        }
    }
}

impl fmt::Display for DocumentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown document slot '{0}'")]
pub struct UnknownSlot(pub String);

impl FromStr for DocumentSlot {
    type Err = UnknownSlot;

    /// Matches the wire field name ignoring case, dashes and underscores (`tenth-certificate`).
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted: String = raw
            .trim()
            .chars()
            .filter(|ch| !matches!(ch, '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        DocumentSlot::ALL
            .into_iter()
            .find(|slot| slot.field_name().to_lowercase() == wanted)
            .ok_or_else(|| UnknownSlot(raw.to_string()))
    }
}

/// Editable personal fields sent alongside staged documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonalDetails {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<NaiveDate>,
    pub caste: Option<String>,
}

impl PersonalDetails {
    /// Multipart text fields; absent values are sent as empty strings.
    pub fn form_fields(&self) -> [(&'static str, String); 4] {
        [
            ("name", self.name.clone().unwrap_or_default()),
            ("gender", self.gender.clone().unwrap_or_default()),
            (
                "dob",
                self.dob
                    .map(|dob| dob.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ),
            ("caste", self.caste.clone().unwrap_or_default()),
        ]
    }
}

/// Document listed by name rather than slot, as embedded in operator listings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedDocument {
    pub doc_name: String,
    pub filename: String,
}

/// The citizen's profile as last returned by the portal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub details: PersonalDetails,
    documents: BTreeMap<DocumentSlot, StoredFile>,
    named_documents: Vec<NamedDocument>,
}

impl UserProfile {
    pub fn new(details: PersonalDetails) -> Self {
        Self {
            details,
            ..Self::default()
        }
    }

    pub fn with_document(mut self, slot: DocumentSlot, file: StoredFile) -> Self {
        self.documents.insert(slot, file);
        self
    }

    pub fn document(&self, slot: DocumentSlot) -> Option<&StoredFile> {
        self.documents.get(&slot)
    }

    /// Stored documents in slot order.
    pub fn documents(&self) -> impl Iterator<Item = (DocumentSlot, &StoredFile)> {
        self.documents.iter().map(|(slot, file)| (*slot, file))
    }

    pub fn named_documents(&self) -> &[NamedDocument] {
        &self.named_documents
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileWire {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    dob: Option<String>,
    #[serde(default)]
    caste: Option<String>,
    #[serde(default)]
    profile_docs: Vec<NamedDocument>,
    #[serde(flatten)]
    rest: BTreeMap<String, serde_json::Value>,
}

impl<'de> Deserialize<'de> for UserProfile {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = ProfileWire::deserialize(deserializer)?;

        let documents = DocumentSlot::ALL
            .into_iter()
            .filter_map(|slot| {
                wire.rest
                    .get(slot.field_name())
                    .and_then(StoredFile::from_json)
                    .map(|file| (slot, file))
            })
            .collect();

        Ok(Self {
            details: PersonalDetails {
                name: non_blank(wire.name),
                gender: non_blank(wire.gender),
                dob: wire.dob.as_deref().and_then(parse_dob),
                caste: non_blank(wire.caste),
            },
            documents,
            named_documents: wire.profile_docs,
        })
    }
}

/// Portal dates arrive as ISO timestamps; only the calendar date is meaningful.
fn parse_dob(raw: &str) -> Option<NaiveDate> {
    let date = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// One batched profile submission: personal fields plus only the slots with a staged file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub details: PersonalDetails,
    pub files: BTreeMap<DocumentSlot, LocalFile>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_reads_slots_and_trims_timestamp_dob() {
        let payload = json!({
            "_id": "664f1c",
            "name": "Asha Patil",
            "gender": "female",
            "dob": "1998-04-12T00:00:00.000Z",
            "caste": "OBC",
            "tenthCertificate": { "filename": "10th.pdf", "path": "uploads/10th.pdf" },
            "domicile": null,
            "casteValidity": {},
            "profilePic": { "filename": "me.jpg" }
        });

        let profile: UserProfile = serde_json::from_value(payload).expect("profile parses");
        assert_eq!(profile.details.name.as_deref(), Some("Asha Patil"));
        assert_eq!(
            profile.details.dob,
            NaiveDate::from_ymd_opt(1998, 4, 12)
        );
        assert_eq!(
            profile.document(DocumentSlot::TenthCertificate),
            Some(&StoredFile::new("10th.pdf"))
        );
        assert_eq!(profile.document(DocumentSlot::Domicile), None);
        assert_eq!(profile.document(DocumentSlot::CasteValidity), None);
        assert_eq!(
            profile.document(DocumentSlot::ProfilePicture),
            Some(&StoredFile::new("me.jpg"))
        );
    }

    #[test]
    fn blank_personal_fields_read_as_absent() {
        let payload = json!({ "name": "", "gender": " ", "dob": "", "caste": null });
        let profile: UserProfile = serde_json::from_value(payload).expect("profile parses");
        assert_eq!(profile.details, PersonalDetails::default());
        assert_eq!(profile.documents().count(), 0);
    }

    #[test]
    fn named_documents_are_kept_for_the_operator_viewer() {
        let payload = json!({
            "name": "Ravi",
            "profileDocs": [{ "docName": "Aadhaar", "filename": "aadhaar.pdf" }]
        });
        let profile: UserProfile = serde_json::from_value(payload).expect("profile parses");
        assert_eq!(profile.named_documents().len(), 1);
        assert_eq!(profile.named_documents()[0].doc_name, "Aadhaar");
    }

    #[test]
    fn slots_parse_from_field_names() {
        assert_eq!(
            "tenthCertificate".parse::<DocumentSlot>(),
            Ok(DocumentSlot::TenthCertificate)
        );
        assert_eq!(
            "pg-certificate".parse::<DocumentSlot>(),
            Ok(DocumentSlot::PgCertificate)
        );
        assert_eq!(
            "profile_pic".parse::<DocumentSlot>(),
            Ok(DocumentSlot::ProfilePicture)
        );
        assert!("passport".parse::<DocumentSlot>().is_err());
        assert!("graduationMarksheet".parse::<DocumentSlot>().is_err());
    }

    #[test]
    fn document_slots_match_the_profile_form() {
        let fields: Vec<_> = DocumentSlot::DOCUMENTS
            .iter()
            .map(|slot| slot.field_name())
            .collect();
        assert_eq!(
            fields,
            [
                "tenthCertificate",
                "tenthMarksheet",
                "twelfthCertificate",
                "twelfthMarksheet",
                "graduationDegree",
                "domicile",
                "pgCertificate",
                "casteValidity",
                "otherDocument",
            ]
        );
        assert_eq!(DocumentSlot::ALL.len(), 10);
        assert_eq!(DocumentSlot::ALL[9], DocumentSlot::ProfilePicture);
    }

    #[test]
    fn form_fields_send_empty_strings_for_missing_values() {
        let details = PersonalDetails {
            name: Some("Asha".to_string()),
            dob: NaiveDate::from_ymd_opt(1998, 4, 12),
            ..PersonalDetails::default()
        };
        assert_eq!(
            details.form_fields(),
            [
                ("name", "Asha".to_string()),
                ("gender", String::new()),
                ("dob", "1998-04-12".to_string()),
                ("caste", String::new()),
            ]
        );
    }
}
