use crate::applications::{self, ApplicationsCommand};
use crate::content::{self, ContentCommand};
use crate::files::{self, FilesCommand};
use crate::infra;
use crate::profile::{self, ProfileCommand};
use clap::{Args, Parser, Subcommand};
use civic_portal::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "civic-portal",
    about = "Track, confirm and process citizen service applications from the command line",
    version
)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) connection: ConnectionArgs,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// List applications and act on them as applicant or operator
    Applications {
        #[command(subcommand)]
        command: ApplicationsCommand,
    },
    /// View and edit the signed-in citizen's profile and documents
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },
    /// Landing page slides and notices
    Content {
        #[command(subcommand)]
        command: ContentCommand,
    },
    /// Download stored files
    Files {
        #[command(subcommand)]
        command: FilesCommand,
    },
}

#[derive(Args, Debug, Default)]
pub(crate) struct ConnectionArgs {
    /// Portal base URL (overrides PORTAL_BASE_URL)
    #[arg(long, global = true)]
    pub(crate) base_url: Option<String>,
    /// Bearer token issued at sign-in (overrides PORTAL_TOKEN)
    #[arg(long, global = true)]
    pub(crate) token: Option<String>,
    /// Signed-in user id (overrides PORTAL_USER_ID)
    #[arg(long, global = true)]
    pub(crate) user_id: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let context = infra::connect(cli.connection)?;

    match cli.command {
        Command::Applications { command } => applications::run(&context, command).await,
        Command::Profile { command } => profile::run(&context, command).await,
        Command::Content { command } => content::run(&context, command).await,
        Command::Files { command } => files::run(&context, command).await,
    }
}
