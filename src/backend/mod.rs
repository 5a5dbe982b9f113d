pub mod auth;
mod error;
pub mod flash;
pub mod handlers;
mod routes;

use std::sync::Arc;

use axum::{routing::get, Router};
use serde::Serialize;
use sqlx::{Pool, Sqlite};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::actions::FlashMessage;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Sqlite>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Pool<Sqlite>, config: AppConfig) -> Self {
        Self { db, config: Arc::new(config) }
    }
}

/// JSON body of every page: pending flash messages next to the read-model.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub messages: Vec<FlashMessage>,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Page<T> {
    pub fn new(messages: Vec<FlashMessage>, body: T) -> Self {
        Self { messages, body }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "Backend is running" }))
        .merge(routes::auth_routes())
        .merge(routes::page_routes())
        .merge(routes::action_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(pool: Pool<Sqlite>, config: AppConfig) -> anyhow::Result<()> {
    let addr = config.bind_addr;
    let app = app(AppState::new(pool, config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
