mod applications;
mod cli;
mod content;
mod files;
mod infra;
mod profile;

use civic_portal::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
