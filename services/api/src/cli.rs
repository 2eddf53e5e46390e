use crate::report::{run_assessment, run_catalog, AssessArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use mindcheck::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "MindCheck",
    about = "Score mental-health self-assessments over HTTP or from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score one questionnaire and print the report
    Assess(AssessArgs),
    /// List the available assessments and their questions
    Catalog,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assess(args) => run_assessment(args),
        Command::Catalog => {
            run_catalog();
            Ok(())
        }
    }
}
