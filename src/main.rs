use dotenvy::dotenv;
use log::{error, info};
use std::sync::Arc;

use leadserver::core::config::AppConfig;
use leadserver::core::shared::state::AppState;
use leadserver::main_module::run_axum_server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting leadserver {}", env!("CARGO_PKG_VERSION"));
    let config = AppConfig::from_env()?;
    let state = match AppState::from_config(config).await {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            return Err(e);
        }
    };

    run_axum_server(state).await?;
    info!("Server stopped");
    Ok(())
}
