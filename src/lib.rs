pub mod actions;
pub mod admin_gate;
pub mod api;
pub mod appointment_modal;
pub mod backend;
pub mod config;
pub mod forms;
pub mod models;

use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("Backend setup failed: {0}")]
    Backend(#[from] backend::ServiceError),
    #[error(transparent)]
    Server(#[from] api::ServerError),
}

/// Start the web application and serve until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::AppConfig::from_env()?;
    tracing::debug!(?config, "Configuration loaded");

    let backend = backend::Backend::from_config(&config)?;
    let bind_addr = config.bind_addr;
    let ctx = api::AppContext::new(config, backend);

    let mut server = api::start_server(ctx, bind_addr).await?;
    tracing::info!(addr = %server.addr, "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
    server.shutdown();
    server.wait().await;
    Ok(())
}
