//! Web server setup and routing

use anyhow::Result;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;

use crate::api;
use crate::feed;
use crate::state::AppState;
use crate::ws;

/// Run the web server
pub async fn run(state: Arc<AppState>, bind: &str) -> Result<()> {
    // Build router
    let app = Router::new()
        // API routes
        .route("/api/rooms", get(api::list_rooms))
        .route("/api/rooms/{id}/status", put(api::set_room_status))
        .route("/api/telemetry", get(api::get_telemetry))
        .route("/api/telemetry/rpm", post(api::push_rpm))
        .route("/api/telemetry/power", post(api::push_power))
        .route("/api/telemetry/temperature", post(api::push_temperature))
        .route("/api/motor/setpoint", post(api::set_setpoint))
        .route("/api/motor/control", get(api::get_control))
        .route("/api/motor/control", post(api::set_control))
        .route("/api/config", get(api::get_config))
        // WebSocket for real-time updates
        .route("/ws", get(ws::websocket_handler))
        // Serve 3D scene files
        .nest_service("/assets", ServeDir::new(&state.config.assets.path))
        // Static files (WASM viewer) - must be fallback for root
        .fallback_service(ServeDir::new("web"))
        // CORS
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // State
        .with_state(state.clone());

    // Start the telemetry feed in background
    let feed_state = state.clone();
    tokio::spawn(async move {
        feed::run(feed_state).await;
    });

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(address = %bind, "Starting web server");
    axum::serve(listener, app).await?;
    Ok(())
}
