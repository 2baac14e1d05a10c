mod bootstrap;
mod chat;
mod health;
mod responses;
mod submit_form;

use anyhow::Result;
use formsite_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use formsite_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config)?;

    let address =
        format!("{}:{}", app.state.config.server.bind_address, app.state.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!(
        event_name = "site.server.started",
        bind_address = %address,
        site_dir = %app.state.config.server.site_dir.display(),
        "formsite server listening"
    );

    axum::serve(listener, app.router).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!(event_name = "site.server.stopped", "formsite server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
