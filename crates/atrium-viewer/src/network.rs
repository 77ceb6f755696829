//! Network client for daemon communication
//!
//! On wasm32 a WebSocket feeds events into a shared queue that a Bevy
//! system drains each frame; the daemon replays current state on connect
//! so no separate snapshot fetch is needed. Native builds run the scene
//! without a feed.

use atrium_core::FeedEvent;
use bevy::prelude::*;
use std::sync::{Arc, Mutex};

use crate::app::{Rooms, TelemetryState};

pub struct NetworkPlugin;

/// Resource storing the daemon connection configuration
#[derive(Resource, Clone, Default)]
pub struct DaemonConfig {
    /// HTTP(S) base URL for REST API (e.g., "http://192.168.1.100:8080")
    pub http_url: String,
    /// WebSocket URL (e.g., "ws://192.168.1.100:8080/ws")
    pub ws_url: String,
}

impl DaemonConfig {
    /// Same-origin daemon addresses derived from the browser location
    #[cfg(target_arch = "wasm32")]
    pub fn from_browser() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::default();
        };
        let location = window.location();

        let host = location
            .host()
            .unwrap_or_else(|_| "localhost:8080".to_string());
        let is_https = location.protocol().unwrap_or_default() == "https:";

        Self {
            http_url: format!("{}://{}", if is_https { "https" } else { "http" }, host),
            ws_url: format!("{}://{}/ws", if is_https { "wss" } else { "ws" }, host),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_browser() -> Self {
        Self::default()
    }
}

/// Shared message queue between WebSocket callback and Bevy
#[derive(Resource, Default, Clone)]
pub struct PendingEvents(pub Arc<Mutex<Vec<FeedEvent>>>);

/// WebSocket connection state
#[derive(Resource, Default)]
pub struct WebSocketConnection {
    pub connected: bool,
}

impl Plugin for NetworkPlugin {
    fn build(&self, app: &mut App) {
        let daemon_config = DaemonConfig::from_browser();

        app.insert_resource(daemon_config)
            .init_resource::<PendingEvents>()
            .init_resource::<WebSocketConnection>()
            .add_systems(Startup, connect_websocket)
            .add_systems(Update, process_events);
    }
}

fn connect_websocket(
    mut connection: ResMut<WebSocketConnection>,
    pending: Res<PendingEvents>,
    daemon_config: Res<DaemonConfig>,
) {
    // In WASM, we use web_sys WebSocket
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::prelude::*;
        use web_sys::{MessageEvent, WebSocket};

        let ws_url = daemon_config.ws_url.clone();
        tracing::info!("Connecting to WebSocket: {}", ws_url);

        match WebSocket::new(&ws_url) {
            Ok(ws) => {
                ws.set_binary_type(web_sys::BinaryType::Arraybuffer);

                let onopen = Closure::wrap(Box::new(move |_| {
                    tracing::info!("WebSocket connected");
                }) as Box<dyn FnMut(JsValue)>);
                ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
                onopen.forget();

                // Clone pending for the callback
                let pending_clone = pending.0.clone();
                let onmessage = Closure::wrap(Box::new(move |e: MessageEvent| {
                    if let Ok(text) = e.data().dyn_into::<js_sys::JsString>() {
                        let text: String = text.into();
                        if let Ok(event) = serde_json::from_str::<FeedEvent>(&text) {
                            if let Ok(mut queue) = pending_clone.lock() {
                                queue.push(event);
                            }
                        }
                    }
                }) as Box<dyn FnMut(MessageEvent)>);
                ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
                onmessage.forget();

                connection.connected = true;
            }
            Err(e) => {
                tracing::error!("Failed to create WebSocket: {:?}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = (&mut connection, &pending, &daemon_config);
        tracing::info!("WebSocket not available in native mode");
    }
}

fn process_events(
    connection: Res<WebSocketConnection>,
    pending: Res<PendingEvents>,
    mut rooms: ResMut<Rooms>,
    mut telemetry: ResMut<TelemetryState>,
) {
    // Process queued events from the shared queue
    let events = {
        if let Ok(mut queue) = pending.0.lock() {
            std::mem::take(&mut *queue)
        } else {
            Vec::new()
        }
    };

    for event in events {
        apply_event(&mut rooms.0, &mut telemetry, event);
    }

    telemetry.connected = connection.connected;
}

/// Fold one feed event into the viewer state
fn apply_event(
    registry: &mut atrium_core::RoomRegistry,
    telemetry: &mut TelemetryState,
    event: FeedEvent,
) {
    match event {
        FeedEvent::RoomStatus { room, status } => {
            registry.set_status(&room, status);
        }
        FeedEvent::MotorRpm { rpm } => {
            telemetry.rpm_range.observe(rpm);
            telemetry.snapshot.rpm = Some(rpm);
        }
        FeedEvent::MotorSetpoint { percent } => {
            telemetry.snapshot.setpoint_pct = Some(percent);
            telemetry.setpoint_history.push(percent);
            telemetry.setpoint_drag = percent;
        }
        FeedEvent::Power(reading) => {
            telemetry.snapshot.power = Some(reading);
        }
        FeedEvent::Temperature(reading) => {
            telemetry.snapshot.temperature = Some(reading);
        }
        FeedEvent::ControlState { state } => {
            telemetry.snapshot.control = state;
        }
        FeedEvent::Pong => {}
    }
}

/// Setpoint request body (used by send_setpoint)
#[derive(serde::Serialize)]
#[allow(dead_code)]
struct SetpointRequest {
    percent: f64,
}

/// Command a motor speed setpoint (called from UI)
pub fn send_setpoint(percent: f64, base_url: &str) {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen_futures::spawn_local;

        let base_url = base_url.to_string();

        spawn_local(async move {
            let url = format!("{}/api/motor/setpoint", base_url);
            let body = serde_json::to_string(&SetpointRequest { percent }).unwrap_or_default();

            match gloo_net::http::Request::post(&url)
                .header("Content-Type", "application/json")
                .body(body)
            {
                Ok(request) => match request.send().await {
                    Ok(response) => {
                        if !response.ok() {
                            tracing::error!("Setpoint rejected: {}", response.status());
                        }
                    }
                    Err(e) => {
                        tracing::error!("Failed to send setpoint: {:?}", e);
                    }
                },
                Err(e) => {
                    tracing::error!("Failed to build setpoint request: {:?}", e);
                }
            }
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = (percent, base_url);
        tracing::warn!("Setpoint command not available in native mode");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_core::{ControlState, RoomRegistry, RoomStatus};

    #[test]
    fn test_apply_room_event() {
        let mut registry = RoomRegistry::new();
        registry.insert("Object_2");
        let mut telemetry = TelemetryState::default();

        apply_event(
            &mut registry,
            &mut telemetry,
            FeedEvent::RoomStatus {
                room: "Object_2".to_string(),
                status: RoomStatus::Warning,
            },
        );
        assert_eq!(registry.status("Object_2"), Some(RoomStatus::Warning));
    }

    #[test]
    fn test_apply_telemetry_events() {
        let mut registry = RoomRegistry::new();
        let mut telemetry = TelemetryState::default();

        apply_event(
            &mut registry,
            &mut telemetry,
            FeedEvent::MotorRpm { rpm: 3600.0 },
        );
        // Reading above the default ceiling raises the gauge range
        assert_eq!(telemetry.rpm_range.max(), 3600.0);
        assert_eq!(telemetry.snapshot.rpm, Some(3600.0));

        apply_event(
            &mut registry,
            &mut telemetry,
            FeedEvent::MotorSetpoint { percent: 60.0 },
        );
        assert_eq!(telemetry.setpoint_drag, 60.0);
        assert_eq!(telemetry.setpoint_history.latest(), Some(60.0));

        apply_event(
            &mut registry,
            &mut telemetry,
            FeedEvent::ControlState {
                state: ControlState::On,
            },
        );
        assert_eq!(telemetry.snapshot.control, ControlState::On);
    }

    #[test]
    fn test_unknown_room_event_is_dropped() {
        let mut registry = RoomRegistry::new();
        let mut telemetry = TelemetryState::default();

        apply_event(
            &mut registry,
            &mut telemetry,
            FeedEvent::RoomStatus {
                room: "Object_9".to_string(),
                status: RoomStatus::Alarm,
            },
        );
        assert!(registry.is_empty());
    }
}
