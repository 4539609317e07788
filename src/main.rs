use anyhow::{Context, Result};
use log::*;
use std::sync::Arc;
use tokio::net::TcpListener;
use trivia_quiz::{
    config::AppConfig,
    provider::TriviaClient,
    server::{AppState, health_router, start_ws_server},
};

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    env_logger::init();
    if let Err(e) = dotenv {
        // A missing .env is normal outside local development
        debug!("No .env loaded: {e}");
    }
    info!("Starting trivia quiz server");

    let config = AppConfig::from_env()?;
    let trivia = TriviaClient::new(config.trivia_base_url.clone(), config.trivia_timeout)
        .context("Failed to build trivia provider client")?;
    let app_state = Arc::new(AppState::new(trivia));

    let ws_listener = TcpListener::bind(config.ws_addr)
        .await
        .with_context(|| format!("Can't listen on {}", config.ws_addr))?;
    let health_listener = TcpListener::bind(config.health_addr)
        .await
        .with_context(|| format!("Can't listen on {}", config.health_addr))?;

    tokio::select! {
        _ = start_ws_server(ws_listener, app_state) => {},
        result = axum::serve(health_listener, health_router()) => {
            result.context("Health endpoint failed")?;
        },
    }

    Ok(())
}
