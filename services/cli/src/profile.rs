use crate::infra::{parse_date, parse_slot_file, Context, PromptConfirmer};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use civic_portal::error::AppError;
use civic_portal::files::{FileLocator, LocalFile};
use civic_portal::gateway::HttpPortal;
use civic_portal::workflows::profile::{
    DeleteOutcome, DocumentSlot, DocumentSlotManager, PersonalDetails, SlotState, UserProfile,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Subcommand, Debug)]
pub(crate) enum ProfileCommand {
    /// Show personal details and every document slot
    Show,
    /// Edit personal details and upload documents in one submission
    Update(UpdateArgs),
    /// Delete one stored document after confirmation
    DeleteDocument(DeleteArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct UpdateArgs {
    #[arg(long)]
    pub(crate) name: Option<String>,
    #[arg(long, value_parser = ["male", "female", "other"])]
    pub(crate) gender: Option<String>,
    /// Date of birth (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) dob: Option<NaiveDate>,
    #[arg(long, value_parser = ["SC", "ST", "OBC", "General", "Other"])]
    pub(crate) caste: Option<String>,
    /// Document to upload as SLOT=PATH, e.g. domicile=./domicile.pdf (repeatable)
    #[arg(long = "document", value_parser = parse_slot_file)]
    pub(crate) documents: Vec<(DocumentSlot, PathBuf)>,
}

#[derive(Args, Debug)]
pub(crate) struct DeleteArgs {
    /// Slot name, e.g. tenthCertificate or profilePic
    pub(crate) slot: DocumentSlot,
    /// Skip the confirmation prompt
    #[arg(long)]
    pub(crate) yes: bool,
}

pub(crate) async fn run(context: &Context, command: ProfileCommand) -> Result<(), AppError> {
    let mut manager = DocumentSlotManager::new(Arc::new(context.portal()?));
    manager.load().await?;
    let files = context.files();

    match command {
        ProfileCommand::Show => print_profile(&manager, &files),
        ProfileCommand::Update(args) => {
            let details = apply_edits(manager.details().clone(), &args);
            manager.edit_details(details);
            for (slot, path) in args.documents {
                manager.stage(slot, LocalFile::from_path(&path)?)?;
            }
            let profile = manager.submit().await?;
            info!(user = ?profile.details.name, "profile submitted");
            println!("Profile updated");
            print_profile(&manager, &files);
        }
        ProfileCommand::DeleteDocument(args) => {
            let confirmer = PromptConfirmer::new(args.yes);
            match manager.delete(args.slot, &confirmer).await? {
                DeleteOutcome::Deleted => println!("Document deleted"),
                DeleteOutcome::Cancelled => println!("Deletion cancelled"),
            }
        }
    }
    Ok(())
}

/// Only fields given on the command line change; the rest keep their loaded values.
pub(crate) fn apply_edits(mut details: PersonalDetails, args: &UpdateArgs) -> PersonalDetails {
    if let Some(name) = &args.name {
        details.name = Some(name.clone());
    }
    if let Some(gender) = &args.gender {
        details.gender = Some(gender.clone());
    }
    if let Some(dob) = args.dob {
        details.dob = Some(dob);
    }
    if let Some(caste) = &args.caste {
        details.caste = Some(caste.clone());
    }
    details
}

fn print_profile(manager: &DocumentSlotManager<HttpPortal>, files: &FileLocator) {
    for line in render_details(manager.details()) {
        println!("{line}");
    }
    for slot in DocumentSlot::ALL {
        println!("{}", render_slot(slot, manager.slot_state(slot), files));
    }
    if let Some(profile) = manager.profile() {
        for line in render_named_documents(profile, files) {
            println!("{line}");
        }
    }
}

fn render_details(details: &PersonalDetails) -> Vec<String> {
    let or_blank = |value: &Option<String>| value.clone().unwrap_or_else(|| "N/A".to_string());
    vec![
        format!("Name: {}", or_blank(&details.name)),
        format!("Gender: {}", or_blank(&details.gender)),
        format!(
            "Date of birth: {}",
            details
                .dob
                .map(|dob| dob.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "N/A".to_string())
        ),
        format!("Caste: {}", or_blank(&details.caste)),
    ]
}

pub(crate) fn render_slot(slot: DocumentSlot, state: SlotState<'_>, files: &FileLocator) -> String {
    let detail = match state {
        SlotState::Empty => "empty".to_string(),
        SlotState::Staged(file) => format!("staged {}", file.file_name),
        SlotState::Stored(file) => files.url_for_file(file),
        SlotState::Replacing { stored, staged } => {
            format!("{} (replacing with {})", files.url_for_file(stored), staged.file_name)
        }
    };
    format!("{} [{}]: {}", slot.label(), slot.field_name(), detail)
}

fn render_named_documents(profile: &UserProfile, files: &FileLocator) -> Vec<String> {
    profile
        .named_documents()
        .iter()
        .map(|doc| format!("{}: {}", doc.doc_name, files.url_for(&doc.filename)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_portal::files::StoredFile;
    use civic_portal::Url;

    #[test]
    fn only_given_fields_are_overwritten() {
        let loaded = PersonalDetails {
            name: Some("Asha Patil".to_string()),
            gender: Some("female".to_string()),
            dob: NaiveDate::from_ymd_opt(1998, 4, 12),
            caste: Some("OBC".to_string()),
        };
        let args = UpdateArgs {
            caste: Some("General".to_string()),
            ..UpdateArgs::default()
        };

        let edited = apply_edits(loaded.clone(), &args);
        assert_eq!(edited.caste.as_deref(), Some("General"));
        assert_eq!(edited.name, loaded.name);
        assert_eq!(edited.dob, loaded.dob);
    }

    #[test]
    fn stored_slot_renders_file_url() {
        let files = FileLocator::new(Url::parse("http://portal.test").expect("url"));
        let stored = StoredFile::new("dom.pdf");
        assert_eq!(
            render_slot(DocumentSlot::Domicile, SlotState::Stored(&stored), &files),
            "Domicile [domicile]: http://portal.test/api/files/dom.pdf"
        );
        assert_eq!(
            render_slot(DocumentSlot::CasteValidity, SlotState::Empty, &files),
            "Caste Validity [casteValidity]: empty"
        );
    }
}
