use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = connect().await?;
    DatabaseManager::migrate(&pool).await?;
    pool.close().await;
    output_success(&output_format, "Migrations applied", None)
}
