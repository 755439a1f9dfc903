mod cli;
mod infra;
mod report;
mod routes;
mod server;

use survey_window::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
