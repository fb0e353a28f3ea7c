use anyhow::Context;
use dotenvy::dotenv;
use log::{error, info};
use std::sync::Arc;

use ticketscope::core::config::AppConfig;
use ticketscope::core::shared::state::AppState;
use ticketscope::core::shared::utils::{create_conn_or_lazy, run_migrations};
use ticketscope::main_module::run_axum_server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .write_style(env_logger::WriteStyle::Always)
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let pool = create_conn_or_lazy(&config.database);

    if config.database.run_migrations {
        info!("Running database migrations");
        if let Err(e) = run_migrations(&pool) {
            error!("Failed to run migrations: {e}");
            return Err(anyhow::anyhow!("migrations failed: {e}"));
        }
    }

    let state = Arc::new(AppState::new(pool, config));
    run_axum_server(state)
        .await
        .context("HTTP server terminated with an error")?;

    info!("Server stopped");
    Ok(())
}
