use crate::infra::Context;
use clap::{Args, Subcommand};
use civic_portal::error::AppError;
use std::path::PathBuf;
use tracing::info;

#[derive(Subcommand, Debug)]
pub(crate) enum FilesCommand {
    /// Download a stored file by its portal filename
    Fetch(FetchArgs),
}

#[derive(Args, Debug)]
pub(crate) struct FetchArgs {
    pub(crate) filename: String,
    /// Where to write the file (defaults to the filename in the current directory)
    #[arg(long, short)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) async fn run(context: &Context, command: FilesCommand) -> Result<(), AppError> {
    match command {
        FilesCommand::Fetch(args) => {
            let portal = context.public_portal()?;
            let bytes = portal.fetch_file(&args.filename).await?;
            let output = output_path(&args);
            std::fs::write(&output, &bytes)?;
            info!(file = %args.filename, bytes = bytes.len(), "file downloaded");
            println!("saved {} bytes to {}", bytes.len(), output.display());
            Ok(())
        }
    }
}

/// Portal filenames are flat; any directory part is dropped before writing locally.
pub(crate) fn output_path(args: &FetchArgs) -> PathBuf {
    if let Some(output) = &args.output {
        return output.clone();
    }
    PathBuf::from(&args.filename)
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("download"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_strips_directories() {
        let args = FetchArgs {
            filename: "../../etc/cert.pdf".to_string(),
            output: None,
        };
        assert_eq!(output_path(&args), PathBuf::from("cert.pdf"));

        let explicit = FetchArgs {
            filename: "cert.pdf".to_string(),
            output: Some(PathBuf::from("/tmp/out.pdf")),
        };
        assert_eq!(output_path(&explicit), PathBuf::from("/tmp/out.pdf"));
    }
}
