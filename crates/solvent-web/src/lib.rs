//! # solvent-web
//!
//! JSON HTTP API for syncing [`solvent`] notebooks between replicas.
//!
//! Clients `PUT` their local replica and receive the merged notebook back,
//! which they adopt as their new local state.
//!
//! | Method | Path | Result |
//! |--------|------|--------|
//! | `GET` | `/api/health` | `{"status": "ok"}` |
//! | `POST` | `/api/notebook` | a new, empty notebook |
//! | `GET` | `/api/notebook/{id}` | the stored notebook |
//! | `PUT` | `/api/notebook` | the stored notebook merged with the body |
//! | `DELETE` | `/api/notebook/{id}` | `204 No Content` |
//!
//! Every request is logged at `info` with its method, path, status and
//! latency.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use solvent_store::{MemoryRepository, NotebookService};
//! use solvent_web::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = Arc::new(NotebookService::new(MemoryRepository::new()));
//!     solvent_web::serve(ServerConfig::default(), service).await.unwrap();
//! }
//! ```

mod api;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use solvent_store::{NotebookRepository, NotebookService};

/// Shared application state for Axum handlers.
pub(crate) struct AppState<R> {
    pub service: Arc<NotebookService<R>>,
}

/// Where the server listens.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind. Defaults to `127.0.0.1`.
    pub host: String,
    /// TCP port. Defaults to 8080.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// `host:port`, ready for binding.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Build the API router around a notebook service.
pub fn router<R>(service: Arc<NotebookService<R>>) -> Router
where
    R: NotebookRepository + 'static,
{
    let state = Arc::new(AppState { service });

    Router::new()
        .route("/api/health", get(api::health))
        .route(
            "/api/notebook",
            post(api::create_notebook::<R>).put(api::update_notebook::<R>),
        )
        .route(
            "/api/notebook/{id}",
            get(api::fetch_notebook::<R>).delete(api::remove_notebook::<R>),
        )
        .with_state(state)
        .layer(middleware::from_fn(access_log))
}

async fn access_log(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_us = started.elapsed().as_micros() as u64,
        "request"
    );
    response
}

/// Start the API server.
///
/// Blocks until the server is shut down (Ctrl-C).
pub async fn serve<R>(
    config: ServerConfig,
    service: Arc<NotebookService<R>>,
) -> Result<(), Box<dyn std::error::Error>>
where
    R: NotebookRepository + 'static,
{
    let app = router(service);
    let listener = tokio::net::TcpListener::bind(config.address()).await?;
    tracing::info!(address = %listener.local_addr()?, "serving notebook API");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
