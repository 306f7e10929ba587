use chrono::NaiveDate;
use url::Url;

use super::common::{application, open_desk};
use crate::files::{FileLocator, StoredFile};
use crate::workflows::applications::domain::{ApplicationStatus, Role};
use crate::workflows::applications::lifecycle::{Action, StatusTone};
use crate::workflows::applications::views::{
    applicant_table, operator_table, profile_card, NO_DOCUMENTS,
};
use crate::workflows::profile::{DocumentSlot, PersonalDetails, UserProfile};

fn files() -> FileLocator {
    FileLocator::new(Url::parse("http://portal.test/").expect("static url"))
}

#[test]
fn applicant_rows_link_forms_and_certificates() {
    let mut completed = application("a1", ApplicationStatus::Completed);
    completed.certificate = Some(StoredFile::new("cert-a1.pdf"));
    completed.form_pdf = Some(StoredFile::new("form-a1.pdf"));
    let pending = application("a2", ApplicationStatus::PendingConfirmation);

    let table = applicant_table(&[completed, pending], &files());
    let rows = table.rows();
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].form_cell(), "http://portal.test/api/files/form-a1.pdf");
    assert_eq!(
        rows[0].certificate_cell(),
        "http://portal.test/api/files/cert-a1.pdf"
    );
    assert!(rows[0].actions.is_empty());

    assert_eq!(rows[1].form_cell(), "Not uploaded");
    assert_eq!(rows[1].tone, StatusTone::Warning);
    assert_eq!(rows[1].actions, vec![Action::Confirm, Action::SubmitCorrection]);
}

#[tokio::test]
async fn operator_rows_offer_upload_only_where_permitted() {
    let mut corrected = application("a1", ApplicationStatus::InReview);
    corrected.correction_comment = Some("Wrong date of birth".to_string());
    let (desk, _) = open_desk(
        Role::Operator,
        vec![corrected, application("a2", ApplicationStatus::Confirmed)],
    )
    .await;

    let visible: Vec<_> = desk.applications().iter().collect();
    let table = operator_table(&visible, &desk.upload_indicator());
    let rows = table.rows();

    let confirmed = &rows[0];
    assert_eq!(confirmed.status_label, "Confirmed");
    assert_eq!(confirmed.upload_label, None);

    let in_review = &rows[1];
    assert_eq!(in_review.upload_label, Some("Upload"));
    assert_eq!(
        in_review.correction_comment.as_deref(),
        Some("Wrong date of birth")
    );
    assert_eq!(in_review.applicant, "Applicant a1");
}

#[test]
fn profile_card_falls_back_to_placeholders() {
    let card = profile_card(&UserProfile::default(), &files());
    assert_eq!(card.name, "N/A");
    assert_eq!(card.dob, "N/A");
    assert_eq!(card.document_lines(), vec![NO_DOCUMENTS.to_string()]);
}

#[test]
fn profile_card_lists_stored_documents_without_picture() {
    let profile = UserProfile::new(PersonalDetails {
        name: Some("Asha Patil".to_string()),
        gender: Some("female".to_string()),
        dob: NaiveDate::from_ymd_opt(1998, 4, 12),
        caste: None,
    })
    .with_document(DocumentSlot::ProfilePicture, StoredFile::new("me.jpg"))
    .with_document(DocumentSlot::Domicile, StoredFile::new("dom.pdf"));

    let card = profile_card(&profile, &files());
    assert_eq!(card.dob, "12/04/1998");
    assert_eq!(card.caste, "N/A");
    assert_eq!(card.documents.len(), 1);
    assert_eq!(card.documents[0].url, "http://portal.test/api/files/dom.pdf");
}
