mod cli;
mod commands;
mod infra;
mod routes;
mod server;

use research_registry::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
