use crate::infra::Context;
use clap::{Args, Subcommand, ValueEnum};
use civic_portal::error::AppError;
use civic_portal::files::{FileLocator, LocalFile};
use civic_portal::gateway::HttpPortal;
use civic_portal::workflows::applications::{
    applicant_table, evaluate, operator_table, profile_card, status_counts, Action,
    ActionOutcome, ApplicantRow, ApplicationDesk, ApplicationId, ApplicationQuery,
    ApplicationRecord, DeskError, OperatorRow, Role, StatusCount, StatusFilter, TableView,
    UPLOADING_LABEL,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Subcommand, Debug)]
pub(crate) enum ApplicationsCommand {
    /// List applications, newest first
    List(ListArgs),
    /// Show one application with the actions available to you
    Show(ShowArgs),
    /// Accept the operator's filled form (applicant)
    Confirm(IdArgs),
    /// Send a correction request back to the operator (applicant)
    Correct(CorrectArgs),
    /// Confirm an application from the operator desk
    OperatorConfirm(IdArgs),
    /// Reject an application with a reason (operator)
    Reject(RejectArgs),
    /// Upload the filled PDF form for an application (operator)
    Upload(UploadArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum RoleArg {
    #[default]
    Applicant,
    Operator,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Applicant => Role::Applicant,
            RoleArg::Operator => Role::Operator,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct ListArgs {
    /// Which desk to list from
    #[arg(long, value_enum, default_value_t = RoleArg::Applicant)]
    pub(crate) role: RoleArg,
    /// Operator filter: all, pending, submitted, in-review, pending-confirmation, confirmed, rejected
    #[arg(long, default_value = "all")]
    pub(crate) status: StatusFilter,
    /// Operator search on applicant name or mobile number
    #[arg(long, default_value = "")]
    pub(crate) search: String,
}

#[derive(Args, Debug)]
pub(crate) struct ShowArgs {
    pub(crate) id: String,
    #[arg(long, value_enum, default_value_t = RoleArg::Applicant)]
    pub(crate) role: RoleArg,
}

#[derive(Args, Debug)]
pub(crate) struct IdArgs {
    pub(crate) id: String,
}

#[derive(Args, Debug)]
pub(crate) struct CorrectArgs {
    pub(crate) id: String,
    /// What the operator should fix
    #[arg(long)]
    pub(crate) comment: String,
}

#[derive(Args, Debug)]
pub(crate) struct RejectArgs {
    pub(crate) id: String,
    /// Reason shown to the applicant
    #[arg(long)]
    pub(crate) reason: String,
}

#[derive(Args, Debug)]
pub(crate) struct UploadArgs {
    pub(crate) id: String,
    /// Filled form, PDF only
    pub(crate) form: PathBuf,
}

pub(crate) async fn run(context: &Context, command: ApplicationsCommand) -> Result<(), AppError> {
    match command {
        ApplicationsCommand::List(args) => list(context, args).await,
        ApplicationsCommand::Show(args) => show(context, args).await,
        ApplicationsCommand::Confirm(args) => {
            let mut desk = open_desk(context, Role::Applicant).await?;
            let outcome = desk.confirm(&ApplicationId(args.id)).await?;
            report(&outcome);
            Ok(())
        }
        ApplicationsCommand::Correct(args) => {
            let mut desk = open_desk(context, Role::Applicant).await?;
            let outcome = desk
                .submit_correction(&ApplicationId(args.id), &args.comment)
                .await?;
            report(&outcome);
            Ok(())
        }
        ApplicationsCommand::OperatorConfirm(args) => {
            let mut desk = open_desk(context, Role::Operator).await?;
            let outcome = desk.confirm(&ApplicationId(args.id)).await?;
            report(&outcome);
            Ok(())
        }
        ApplicationsCommand::Reject(args) => {
            let mut desk = open_desk(context, Role::Operator).await?;
            let outcome = desk.reject(&ApplicationId(args.id), &args.reason).await?;
            report(&outcome);
            Ok(())
        }
        ApplicationsCommand::Upload(args) => {
            let id = ApplicationId(args.id);
            let form = LocalFile::from_path(&args.form)?;
            let mut desk = open_desk(context, Role::Operator).await?;
            desk.stage_form(&id, form)?;
            println!("{}", upload_banner(&id));
            let outcome = desk.upload_staged_form(&id).await?;
            report(&outcome);
            Ok(())
        }
    }
}

async fn open_desk(
    context: &Context,
    role: Role,
) -> Result<ApplicationDesk<HttpPortal>, AppError> {
    let mut desk = ApplicationDesk::new(Arc::new(context.portal()?), role);
    desk.refresh().await?;
    Ok(desk)
}

/// Printed as the upload request goes out; the desk's indicator holds this label until the relist.
fn upload_banner(id: &ApplicationId) -> String {
    format!("{id}: {UPLOADING_LABEL}")
}

fn report(outcome: &ActionOutcome) {
    println!("{}", outcome.alert);
    if !outcome.refreshed {
        println!("(listing could not be refreshed; run `applications list` again)");
    }
}

async fn list(context: &Context, args: ListArgs) -> Result<(), AppError> {
    let desk = open_desk(context, args.role.into()).await?;
    let lines = match args.role {
        RoleArg::Applicant => {
            render_applicant_table(&applicant_table(desk.applications(), &context.files()))
        }
        RoleArg::Operator => {
            let query = ApplicationQuery::new(args.status, args.search);
            let mut lines = vec![render_counts(&status_counts(desk.applications()), query.status)];
            let visible = query.apply(desk.applications());
            lines.extend(render_operator_table(&operator_table(
                &visible,
                &desk.upload_indicator(),
            )));
            lines
        }
    };

    for line in lines {
        println!("{line}");
    }
    Ok(())
}

async fn show(context: &Context, args: ShowArgs) -> Result<(), AppError> {
    let role = Role::from(args.role);
    let desk = open_desk(context, role).await?;
    let id = ApplicationId(args.id);
    let record = desk
        .find(&id)
        .ok_or_else(|| DeskError::UnknownApplication(id.clone()))?;

    for line in render_record(record, role, &context.files()) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn render_counts(counts: &[StatusCount], selected: StatusFilter) -> String {
    counts
        .iter()
        .map(|count| {
            let marker = if count.filter == selected { "*" } else { "" };
            format!("{marker}{} ({})", count.filter, count.count)
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

pub(crate) fn render_applicant_table(table: &TableView<ApplicantRow>) -> Vec<String> {
    match table {
        TableView::Empty { message } => vec![(*message).to_string()],
        TableView::Rows { rows } => rows
            .iter()
            .map(|row| {
                let mut line = format!(
                    "{} | {} | {}{} | form: {} | certificate: {}",
                    row.application_id,
                    row.service,
                    row.status_label,
                    if row.confirmed { " [x]" } else { "" },
                    row.form_cell(),
                    row.certificate_cell(),
                );
                if let Some(reason) = &row.reject_reason {
                    line.push_str(&format!(" | reason: {reason}"));
                }
                if !row.actions.is_empty() {
                    line.push_str(&format!(" | actions: {}", join_actions(&row.actions)));
                }
                line
            })
            .collect(),
    }
}

pub(crate) fn render_operator_table(table: &TableView<OperatorRow>) -> Vec<String> {
    match table {
        TableView::Empty { message } => vec![(*message).to_string()],
        TableView::Rows { rows } => rows
            .iter()
            .map(|row| {
                let mut line = format!(
                    "{} | {} ({}) | {} | {}",
                    row.application_id,
                    row.applicant,
                    row.mobile.as_deref().unwrap_or("N/A"),
                    row.service,
                    row.status_label,
                );
                if let Some(comment) = &row.correction_comment {
                    line.push_str(&format!(" | correction: {comment}"));
                }
                if let Some(reason) = &row.reject_reason {
                    line.push_str(&format!(" | reason: {reason}"));
                }
                if let Some(label) = row.upload_label {
                    line.push_str(&format!(" | [{label}]"));
                }
                if !row.actions.is_empty() {
                    line.push_str(&format!(" | actions: {}", join_actions(&row.actions)));
                }
                line
            })
            .collect(),
    }
}

fn render_record(record: &ApplicationRecord, role: Role, files: &FileLocator) -> Vec<String> {
    let view = evaluate(record, role);
    let mut lines = vec![
        format!("Application {}", record.id),
        format!("Service: {}", record.service_name().unwrap_or("N/A")),
        format!("Status: {}", view.status),
        format!(
            "Form: {}",
            record
                .form_pdf
                .as_ref()
                .map(|file| files.url_for_file(file))
                .unwrap_or_else(|| "Not uploaded".to_string())
        ),
    ];
    if let Some(reason) = &view.reject_reason {
        lines.push(format!("Reject reason: {reason}"));
    }
    if let Some(certificate) = &view.certificate {
        lines.push(format!("Certificate: {}", files.url_for_file(certificate)));
    }
    if let Some(comment) = record.pending_correction() {
        lines.push(format!("Correction requested: {comment}"));
    }
    lines.push(if view.actions.is_empty() {
        "Actions: none".to_string()
    } else {
        format!("Actions: {}", join_actions(view.actions))
    });

    if role == Role::Operator {
        match &record.user_profile {
            Some(profile) => {
                let card = profile_card(profile, files);
                lines.push(format!(
                    "Applicant: {} | {} | {} | {}",
                    card.name, card.gender, card.dob, card.caste
                ));
                lines.extend(card.document_lines().into_iter().map(|line| format!("  {line}")));
            }
            None => lines.push("Applicant profile: N/A".to_string()),
        }
    }
    lines
}

fn join_actions(actions: &[Action]) -> String {
    actions
        .iter()
        .map(|action| action.label())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_portal::workflows::applications::{
        ApplicationStatus, UploadIndicator, NO_APPLICATIONS,
    };
    use civic_portal::Url;

    fn files() -> FileLocator {
        FileLocator::new(Url::parse("http://portal.test").expect("url"))
    }

    #[test]
    fn empty_filter_prints_placeholder() {
        let table = operator_table(&[], &UploadIndicator::default());
        assert_eq!(render_operator_table(&table), vec![NO_APPLICATIONS.to_string()]);
    }

    #[test]
    fn counts_mark_the_selected_filter() {
        let records = vec![
            ApplicationRecord::new("a1", ApplicationStatus::Rejected),
            ApplicationRecord::new("a2", ApplicationStatus::Pending),
        ];
        let rendered = render_counts(
            &status_counts(&records),
            StatusFilter::Only(ApplicationStatus::Rejected),
        );
        assert!(rendered.starts_with("All (2) | Pending (1)"));
        assert!(rendered.ends_with("*Rejected (1)"));
    }

    #[test]
    fn applicant_row_shows_confirm_check_and_missing_form() {
        let records = vec![ApplicationRecord::new("a1", ApplicationStatus::Confirmed)];
        let lines = render_applicant_table(&applicant_table(&records, &files()));
        assert_eq!(
            lines,
            vec!["a1 | N/A | Confirmed [x] | form: Not uploaded | certificate: Not available"]
        );
    }

    #[test]
    fn upload_banner_shows_the_in_flight_label() {
        assert_eq!(
            upload_banner(&ApplicationId::from("a1")),
            "a1: Uploading..."
        );
    }

    #[test]
    fn operator_detail_without_profile_says_so() {
        let record = ApplicationRecord::new("a7", ApplicationStatus::InReview);
        let lines = render_record(&record, Role::Operator, &files());
        assert!(lines.contains(&"Actions: upload, confirm, reject".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("Applicant profile: N/A"));
    }
}
