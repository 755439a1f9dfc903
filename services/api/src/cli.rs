use crate::report::{run_survey_report, SurveyReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use survey_window::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Survey Window",
    about = "Report which certificates and surveys are inside their actionable window",
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
    /// Work with survey item exports from the command line
    Surveys {
        #[command(subcommand)]
        command: SurveysCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SurveysCommand {
    /// Print the upcoming-surveys report for a CSV export
    Report(SurveyReportArgs),
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
        Command::Surveys {
            command: SurveysCommand::Report(args),
        } => run_survey_report(args),
    }
}
