//! Application state management

use atrium_core::{FeedEvent, RoomStatus, TelemetrySnapshot};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::config::Config;

/// Shared application state
pub struct AppState {
    /// Configuration
    pub config: Config,
    /// Latest telemetry values, folded from published events
    telemetry: RwLock<TelemetrySnapshot>,
    /// Last published status per room id
    rooms: RwLock<HashMap<String, RoomStatus>>,
    /// Event broadcast for WebSocket clients
    events: broadcast::Sender<FeedEvent>,
}

impl AppState {
    pub fn new(config: Config) -> Arc<Self> {
        let (events, _) = broadcast::channel(100);
        Arc::new(Self {
            config,
            telemetry: RwLock::new(TelemetrySnapshot::default()),
            rooms: RwLock::new(HashMap::new()),
            events,
        })
    }

    /// Fold an event into the state and fan it out to connected clients.
    /// Send errors only mean nobody is listening and are ignored.
    pub async fn publish(&self, event: FeedEvent) {
        match &event {
            FeedEvent::RoomStatus { room, status } => {
                self.rooms.write().await.insert(room.clone(), *status);
            }
            FeedEvent::Pong => {}
            _ => {
                self.telemetry.write().await.apply(&event, Utc::now());
            }
        }

        debug!(?event, "Publishing event");
        let _ = self.events.send(event);
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.events.subscribe()
    }

    /// Current telemetry values
    pub async fn telemetry(&self) -> TelemetrySnapshot {
        self.telemetry.read().await.clone()
    }

    /// Current room statuses
    pub async fn rooms(&self) -> HashMap<String, RoomStatus> {
        self.rooms.read().await.clone()
    }

    /// The current value of every binding as a burst of events, sent to a
    /// freshly connected client before live events start.
    pub async fn snapshot_events(&self) -> Vec<FeedEvent> {
        let mut events = Vec::new();

        let rooms = self.rooms.read().await;
        let mut room_ids: Vec<&String> = rooms.keys().collect();
        room_ids.sort();
        for id in room_ids {
            events.push(FeedEvent::RoomStatus {
                room: id.clone(),
                status: rooms[id],
            });
        }
        drop(rooms);

        let telemetry = self.telemetry.read().await;
        events.push(FeedEvent::ControlState {
            state: telemetry.control,
        });
        if let Some(percent) = telemetry.setpoint_pct {
            events.push(FeedEvent::MotorSetpoint { percent });
        }
        if let Some(rpm) = telemetry.rpm {
            events.push(FeedEvent::MotorRpm { rpm });
        }
        if let Some(power) = telemetry.power {
            events.push(FeedEvent::Power(power));
        }
        if let Some(temperature) = telemetry.temperature {
            events.push(FeedEvent::Temperature(temperature));
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_core::ControlState;

    #[tokio::test]
    async fn test_publish_updates_rooms() {
        let state = AppState::new(Config::default());
        state
            .publish(FeedEvent::RoomStatus {
                room: "Object_2".to_string(),
                status: RoomStatus::Alarm,
            })
            .await;

        let rooms = state.rooms().await;
        assert_eq!(rooms.get("Object_2"), Some(&RoomStatus::Alarm));
        assert!(state.telemetry().await.updated_at.is_none());
    }

    #[tokio::test]
    async fn test_publish_updates_telemetry() {
        let state = AppState::new(Config::default());
        state.publish(FeedEvent::MotorRpm { rpm: 900.0 }).await;
        state
            .publish(FeedEvent::ControlState {
                state: ControlState::On,
            })
            .await;

        let telemetry = state.telemetry().await;
        assert_eq!(telemetry.rpm, Some(900.0));
        assert_eq!(telemetry.control, ControlState::On);
    }

    #[tokio::test]
    async fn test_snapshot_events_replay_state() {
        let state = AppState::new(Config::default());
        state
            .publish(FeedEvent::RoomStatus {
                room: "B".to_string(),
                status: RoomStatus::Normal,
            })
            .await;
        state
            .publish(FeedEvent::RoomStatus {
                room: "A".to_string(),
                status: RoomStatus::Warning,
            })
            .await;
        state.publish(FeedEvent::MotorRpm { rpm: 1200.0 }).await;

        let events = state.snapshot_events().await;
        // Rooms first, sorted by id, then telemetry
        match &events[0] {
            FeedEvent::RoomStatus { room, status } => {
                assert_eq!(room, "A");
                assert_eq!(*status, RoomStatus::Warning);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(events
            .iter()
            .any(|e| matches!(e, FeedEvent::MotorRpm { rpm } if *rpm == 1200.0)));
    }

    #[tokio::test]
    async fn test_subscribers_receive_published_events() {
        let state = AppState::new(Config::default());
        let mut rx = state.subscribe();
        state.publish(FeedEvent::MotorRpm { rpm: 42.0 }).await;

        match rx.recv().await {
            Ok(FeedEvent::MotorRpm { rpm }) => assert_eq!(rpm, 42.0),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
