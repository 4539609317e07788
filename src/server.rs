use crate::handler::player::handle_player;
use crate::provider::TriviaClient;
use axum::{Router, routing::get};
use log::*;
use std::{net::SocketAddr, sync::Arc};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::mpsc,
};
use tokio_tungstenite::{
    accept_async,
    tungstenite::{Error, Message, Result},
};
use tower_http::cors::CorsLayer;

pub type Tx = mpsc::UnboundedSender<Message>;

/// Shared across all player connections. Sessions themselves are owned by
/// their connection and never live here.
pub struct AppState {
    pub trivia: TriviaClient,
}

impl AppState {
    pub fn new(trivia: TriviaClient) -> Self {
        Self { trivia }
    }
}

async fn accept_connection(peer: SocketAddr, stream: TcpStream, app_state: Arc<AppState>) {
    if let Err(e) = handle_connection(peer, stream, app_state).await {
        match e {
            Error::ConnectionClosed | Error::AlreadyClosed | Error::Protocol(_) => (),
            err => error!("Error processing connection: {err}"),
        }
    }
}

async fn handle_connection(
    peer: SocketAddr,
    stream: TcpStream,
    app_state: Arc<AppState>,
) -> Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection: {peer}");
    handle_player(ws_stream, app_state, peer).await;
    Ok(())
}

pub async fn start_ws_server(listener: TcpListener, app_state: Arc<AppState>) {
    match listener.local_addr() {
        Ok(addr) => info!("Listening on: {addr}"),
        Err(e) => warn!("Listening on an unknown address: {e}"),
    }

    while let Ok((stream, peer)) = listener.accept().await {
        info!("Peer address: {peer}");
        tokio::spawn(accept_connection(peer, stream, app_state.clone()));
    }
}

async fn health_check() -> &'static str {
    "OK"
}

pub fn health_router() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive())
}
