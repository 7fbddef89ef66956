use live_programme::config::AppConfig;
use live_programme::programme::Week;
use live_programme::services::ServiceContainer;
use live_programme::{database, logging};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    let (logging_config, _log_guard) = logging::init_logging(&config.log_dir)?;
    if let Some(directive) = &config.log_filter {
        logging_config.set_filter(directive)?;
    }

    let pool = database::init_pool(&config.database_url).await?;
    database::run_migrations(&pool).await?;

    let container = ServiceContainer::new(pool.clone(), &config);
    container.start()?;
    let retention = logging_config.start_retention_cleanup(container.cancellation_token().child_token());

    info!(
        interval_secs = config.tracker.interval.as_secs(),
        timezone = %config.heatmap.timezone,
        week = %Week::current(config.heatmap.timezone),
        log_filter = %logging_config.get_filter(),
        "live-programme started"
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }

    info!("Shutdown signal received");
    container.shutdown().await;
    let _ = retention.await;
    pool.close().await;

    Ok(())
}
