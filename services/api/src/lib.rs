mod cli;
mod infra;
mod quiz;
mod routes;
mod server;

use mbti_insight::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
