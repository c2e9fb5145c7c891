//! REST API for the todo list.
//!
//! # Overview
//! `app` wires the handlers to their routes and applies the cross-cutting
//! layers; `serve` is the process entry point that connects the store,
//! binds, and runs until a shutdown signal. `run` serves an already
//! prepared store on a bound listener, which is what integration tests use.

pub mod body;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod openapi;
pub mod store;

use axum::routing::{get, put};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use config::{Config, LogLevel, RunMode};
pub use error::ServerError;
pub use handlers::AppState;
pub use store::{MemoryStore, MongoStore, SharedStore, StoreError, TodoStore};

pub fn app(store: SharedStore, mode: RunMode) -> Router {
    let router = Router::new()
        .route("/health", get(handlers::health))
        .route("/api-docs", get(handlers::api_docs))
        .route(
            "/todos",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route(
            "/todos/{id}",
            put(handlers::update_todo).delete(handlers::delete_todo),
        )
        .layer(CorsLayer::permissive())
        .with_state(AppState { store });

    if mode.logs_requests() {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

pub async fn run(
    listener: TcpListener,
    store: SharedStore,
    mode: RunMode,
) -> Result<(), std::io::Error> {
    axum::serve(listener, app(store, mode)).await
}

/// Connect, bind and serve until Ctrl-C or SIGTERM.
pub async fn serve(config: Config) -> Result<(), ServerError> {
    let store = store::connect(&config.mongo_uri)
        .await
        .map_err(ServerError::Connect)?;

    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(%addr, mode = ?config.node_env, "server is running");

    axum::serve(listener, app(store, config.node_env))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown signal received");
}
