//! Calendai service entry point

use anyhow::Context;
use calendai_api::{logging, routes, state};
use calendai_infra::{config, ReminderScheduler};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let config = config::load().context("failed to load configuration")?;
    let (app_state, reminder_service) =
        state::build_state(&config).context("failed to build services")?;

    let scheduler = if config.reminders.enabled {
        Some(
            ReminderScheduler::start(&config.reminders, reminder_service)
                .await
                .context("failed to start reminder scheduler")?,
        )
    } else {
        None
    };

    let listen_addr =
        std::env::var("CALENDAI_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into());
    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("failed to bind {listen_addr}"))?;
    info!(addr = %listen_addr, "calendai listening");

    axum::serve(listener, routes::router(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(scheduler) = scheduler {
        scheduler.shutdown().await.ok();
    }
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
    info!("shutdown signal received");
}
