//! Telemetry feed: simulated source and scripted room statuses
//!
//! The simulated feed stands in for the plant's realtime data source so a
//! viewer always has something to render. External sources disable it in
//! the config and push readings through the REST API instead.

use atrium_core::{ControlState, FeedEvent, PowerReading, TemperatureReading};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::RoomStep;
use crate::state::AppState;

/// Rpm commanded at 100% setpoint
const FULL_SCALE_RPM: f64 = 2400.0;

/// Run the feed tasks until shutdown
pub async fn run(state: Arc<AppState>) {
    let script = state.config.room_script.clone();
    if !script.is_empty() {
        tokio::spawn(play_room_script(state.clone(), script));
    }

    if !state.config.feed.simulate {
        info!("Simulated telemetry disabled, expecting external feed");
        return;
    }

    let interval = state.config.feed.interval_secs.max(0.1);
    info!(interval_secs = interval, "Starting simulated telemetry feed");

    state
        .publish(FeedEvent::ControlState {
            state: ControlState::On,
        })
        .await;
    state
        .publish(FeedEvent::MotorSetpoint { percent: 35.0 })
        .await;

    let mut ticker = tokio::time::interval(Duration::from_secs_f64(interval));
    let mut t = 0.0;
    loop {
        ticker.tick().await;
        t += interval;

        let setpoint = state.telemetry().await.setpoint_pct.unwrap_or(0.0);
        let (rpm, power, temperature) = simulated_readings(t, setpoint);

        state.publish(FeedEvent::MotorRpm { rpm }).await;
        state.publish(FeedEvent::Power(power)).await;
        state.publish(FeedEvent::Temperature(temperature)).await;
    }
}

/// Replay the configured room-status schedule
async fn play_room_script(state: Arc<AppState>, mut script: Vec<RoomStep>) {
    script.sort_by(|a, b| a.after_secs.total_cmp(&b.after_secs));

    let mut elapsed = 0.0;
    for step in script {
        let wait = (step.after_secs - elapsed).max(0.0);
        tokio::time::sleep(Duration::from_secs_f64(wait)).await;
        elapsed = step.after_secs;

        info!(room = %step.room, status = %step.status, "Scripted room status");
        state
            .publish(FeedEvent::RoomStatus {
                room: step.room,
                status: step.status,
            })
            .await;
    }
}

/// Deterministic plant model: rpm tracks the setpoint with a slow ripple,
/// electrical load follows rpm, temperature creeps with load.
fn simulated_readings(t: f64, setpoint_pct: f64) -> (f64, PowerReading, TemperatureReading) {
    let target = setpoint_pct / 100.0 * FULL_SCALE_RPM;
    let ripple = (t / 7.0).sin() * 40.0;
    let rpm = (target + ripple).max(0.0);

    let load = rpm / FULL_SCALE_RPM;
    let power_factor = 0.85 + 0.1 * load;
    let voltage = 230.0 + (t / 11.0).sin() * 2.5;
    let current = 0.4 + load * 6.0;
    let power = voltage * current * power_factor;

    let temp = 28.0 + load * 35.0 + (t / 13.0).sin() * 1.5;
    let temperature = TemperatureReading {
        current: temp,
        max: 28.0 + 35.0 + 1.5,
        avg: 28.0 + load * 30.0,
    };

    (
        rpm,
        PowerReading {
            voltage,
            current,
            frequency: 50.0,
            power_factor,
            power,
            energy: power * t / 3_600_000.0,
        },
        temperature,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readings_track_setpoint() {
        let (rpm, _, _) = simulated_readings(0.0, 50.0);
        assert!((rpm - FULL_SCALE_RPM * 0.5).abs() < 50.0);

        let (rpm_zero, power, _) = simulated_readings(0.0, 0.0);
        assert_eq!(rpm_zero, 0.0);
        assert!(power.current < 1.0);
    }

    #[test]
    fn test_readings_stay_physical() {
        for t in 0..120 {
            let (rpm, power, temperature) = simulated_readings(t as f64, 80.0);
            assert!(rpm >= 0.0);
            assert!(power.power_factor <= 1.0);
            assert!(temperature.current <= temperature.max);
        }
    }
}
