use anyhow::Context;
use faith_community_api::{
    config::config,
    database::DatabaseManager,
    email::mailer_from_config,
    router, AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, SMTP_*
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("faith_community_api=info,tower_http=info")),
        )
        .init();

    let config = config();
    tracing::info!("Starting FAITH CommUNITY API in {:?} mode", config.environment);
    config.validate().map_err(anyhow::Error::msg)?;

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;

    if config.database.run_migrations {
        DatabaseManager::migrate(&pool).await.context("failed to run migrations")?;
    }

    if faith_community_api::is_production!() && !config.email_enabled() {
        tracing::warn!("Running in production without SMTP; confirmation and reset emails will not be delivered");
    }

    let mailer = mailer_from_config(&config.email).context("failed to build mailer")?;
    let app = router(AppState::new(pool, mailer));

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("FAITH CommUNITY API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
