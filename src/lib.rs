//! Courier - two-party messaging backend
//!
//! In-memory message and chat storage behind a small HTTP API, with a
//! fixed-window rate limiter gating every route.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod ratelimit;
pub mod services;
pub mod store;

use std::net::SocketAddr;

use axum::{
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use config::{AppState, ServerConfig};
use handlers::{
    get_chat_messages, get_chat_metadata, get_user_messages, list_chats, send_message,
    update_message_status,
};
use ratelimit::rate_limit_middleware;

/// Build the application router. Rate limiting wraps every route,
/// including the 404 fallback, so denied requests never reach a
/// handler.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Messages
        .route("/messages", post(send_message))
        .route("/messages/user/{user_id}", get(get_user_messages))
        .route("/messages/chat/{chat_id}", get(get_chat_messages))
        .route("/messages/{message_id}/status", patch(update_message_status))
        // Chats
        .route("/chats/user/{user_id}", get(list_chats))
        .route("/chats/{chat_id}", get(get_chat_metadata))
        // Health check
        .route("/health", get(health_check))
        .fallback(route_not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Already set, ignore
    }

    let config = ServerConfig::from_env();
    info!(
        "Rate limit: {} requests per {}ms",
        config.rate_limit_max_requests,
        config.rate_limit_window.as_millis()
    );
    info!("Seeded users: {}", config.seed_users.join(", "));

    let state = AppState::new(&config);
    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server is running on port {}", config.port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shut down.");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received, shutting down..."),
        _ = terminate => info!("SIGTERM received, shutting down..."),
    }
}

async fn health_check() -> &'static str {
    "OK"
}

async fn route_not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found" })),
    )
}
