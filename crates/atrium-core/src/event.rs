//! WebSocket event set shared by daemon and viewer

use serde::{Deserialize, Serialize};

use crate::status::RoomStatus;
use crate::telemetry::{ControlState, PowerReading, TemperatureReading};

/// Messages fanned out to connected viewers.
///
/// Each variant maps to one dashboard binding or one room update; a
/// freshly connected client receives the current value of every binding
/// as a burst of these before live events start.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum FeedEvent {
    #[serde(rename = "room_status")]
    RoomStatus { room: String, status: RoomStatus },
    #[serde(rename = "motor_rpm")]
    MotorRpm { rpm: f64 },
    #[serde(rename = "motor_setpoint")]
    MotorSetpoint { percent: f64 },
    #[serde(rename = "power")]
    Power(PowerReading),
    #[serde(rename = "temperature")]
    Temperature(TemperatureReading),
    #[serde(rename = "control_state")]
    ControlState { state: ControlState },
    #[serde(rename = "pong")]
    Pong,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_format() {
        let json = serde_json::to_string(&FeedEvent::RoomStatus {
            room: "Object_2".to_string(),
            status: RoomStatus::Alarm,
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"type":"room_status","data":{"room":"Object_2","status":"alarm"}}"#
        );
    }

    #[test]
    fn test_event_round_trip() {
        let event = FeedEvent::Power(PowerReading {
            voltage: 231.2,
            current: 4.1,
            frequency: 50.0,
            power_factor: 0.92,
            power: 870.0,
            energy: 12.4,
        });
        let json = serde_json::to_string(&event).unwrap();
        let parsed: FeedEvent = serde_json::from_str(&json).unwrap();
        match parsed {
            FeedEvent::Power(p) => assert_eq!(p.voltage, 231.2),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
