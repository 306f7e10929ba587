use crate::cli::ConnectionArgs;
use chrono::NaiveDate;
use civic_portal::config::AppConfig;
use civic_portal::error::AppError;
use civic_portal::files::{FileLocator, StoredFile};
use civic_portal::gateway::HttpPortal;
use civic_portal::telemetry;
use civic_portal::workflows::profile::{DeletionConfirmer, DocumentSlot};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::info;

/// Loaded configuration plus the ways commands reach the portal.
pub(crate) struct Context {
    config: AppConfig,
}

impl Context {
    /// Gateway carrying the configured session; fails early when credentials are missing.
    pub(crate) fn portal(&self) -> Result<HttpPortal, AppError> {
        let session = self.config.session()?;
        Ok(HttpPortal::from_config(&self.config.portal, Some(session))?)
    }

    /// Gateway for public endpoints. Uses the session when one is configured.
    pub(crate) fn public_portal(&self) -> Result<HttpPortal, AppError> {
        Ok(HttpPortal::from_config(
            &self.config.portal,
            self.config.session().ok(),
        )?)
    }

    pub(crate) fn files(&self) -> FileLocator {
        FileLocator::new(self.config.portal.base_url.clone())
    }
}

pub(crate) fn connect(args: ConnectionArgs) -> Result<Context, AppError> {
    let mut config = AppConfig::load()?;
    apply_overrides(&mut config, args)?;
    telemetry::init(&config.telemetry)?;

    info!(
        environment = ?config.environment,
        base_url = %config.portal.base_url,
        "portal client configured"
    );
    Ok(Context { config })
}

pub(crate) fn apply_overrides(
    config: &mut AppConfig,
    args: ConnectionArgs,
) -> Result<(), AppError> {
    if let Some(base_url) = args.base_url {
        config.set_base_url(&base_url)?;
    }
    if let Some(token) = args.token {
        config.credentials.token = Some(token);
    }
    if let Some(user_id) = args.user_id {
        config.credentials.user_id = Some(user_id);
    }
    Ok(())
}

/// Asks on the terminal before a stored document is deleted.
pub(crate) struct PromptConfirmer {
    assume_yes: bool,
}

impl PromptConfirmer {
    pub(crate) fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl DeletionConfirmer for PromptConfirmer {
    fn confirm_deletion(&self, slot: DocumentSlot, file: &StoredFile) -> bool {
        if self.assume_yes {
            return true;
        }

        eprint!(
            "Are you sure you want to delete {} ({})? [y/N] ",
            slot.label(),
            file.filename
        );
        let _ = io::stderr().flush();

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            Err(_) => false,
        }
    }
}

pub(crate) fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_slot_file(raw: &str) -> Result<(DocumentSlot, PathBuf), String> {
    let (slot, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected SLOT=PATH, got '{raw}'"))?;
    let slot = slot.parse::<DocumentSlot>().map_err(|err| err.to_string())?;
    let path = path.trim();
    if path.is_empty() {
        return Err(format!("missing file path for {slot}"));
    }
    Ok((slot, PathBuf::from(path)))
}
