//! REST API handlers

use atrium_core::{ControlState, FeedEvent, PowerReading, RoomStatus, TemperatureReading};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::state::AppState;

/// API error response
#[derive(serde::Serialize)]
struct ApiError {
    error: String,
}

impl ApiError {
    fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

/// List all rooms with their last published status
pub async fn list_rooms(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let rooms = state.rooms().await;
    Json(rooms)
}

/// Status update request body
#[derive(Deserialize)]
pub struct SetStatusRequest {
    /// One of "normal", "warning", "alarm", "offline"
    status: String,
}

/// Set a room's status; the id does not need to exist in any loaded scene
pub async fn set_room_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> impl IntoResponse {
    let status: RoomStatus = match req.status.parse() {
        Ok(status) => status,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(ApiError::new(e.to_string())))
                .into_response()
        }
    };

    info!(room = %id, status = %status, "Room status update");
    state
        .publish(FeedEvent::RoomStatus { room: id, status })
        .await;
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"}))).into_response()
}

/// Get the latest telemetry snapshot
pub async fn get_telemetry(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let telemetry = state.telemetry().await;
    Json(telemetry)
}

/// Rpm ingest request body
#[derive(Deserialize)]
pub struct RpmRequest {
    rpm: f64,
}

/// Push a measured motor speed
pub async fn push_rpm(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RpmRequest>,
) -> impl IntoResponse {
    state.publish(FeedEvent::MotorRpm { rpm: req.rpm }).await;
    StatusCode::OK
}

/// Push an electrical reading block
pub async fn push_power(
    State(state): State<Arc<AppState>>,
    Json(reading): Json<PowerReading>,
) -> impl IntoResponse {
    state.publish(FeedEvent::Power(reading)).await;
    StatusCode::OK
}

/// Push a temperature block
pub async fn push_temperature(
    State(state): State<Arc<AppState>>,
    Json(reading): Json<TemperatureReading>,
) -> impl IntoResponse {
    state.publish(FeedEvent::Temperature(reading)).await;
    StatusCode::OK
}

/// Setpoint request body
#[derive(Deserialize)]
pub struct SetpointRequest {
    percent: f64,
}

/// Command a motor speed setpoint; rejected while control is off
pub async fn set_setpoint(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetpointRequest>,
) -> impl IntoResponse {
    if state.telemetry().await.control == ControlState::Off {
        return (
            StatusCode::CONFLICT,
            Json(ApiError::new("Motor control is disabled")),
        )
            .into_response();
    }

    let percent = req.percent.clamp(0.0, 100.0);
    info!(percent, "Motor setpoint command");
    state
        .publish(FeedEvent::MotorSetpoint { percent })
        .await;
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"}))).into_response()
}

/// Control state request body
#[derive(Deserialize)]
pub struct ControlRequest {
    state: ControlState,
}

/// Enable or disable motor control
pub async fn set_control(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ControlRequest>,
) -> impl IntoResponse {
    info!(state = ?req.state, "Motor control state change");
    state
        .publish(FeedEvent::ControlState { state: req.state })
        .await;
    StatusCode::OK
}

/// Get the current control state
pub async fn get_control(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let telemetry = state.telemetry().await;
    Json(serde_json::json!({ "state": telemetry.control }))
}

/// Get current configuration
pub async fn get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.config.clone())
}
