//! Telemetry reading types and dashboard bookkeeping

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::event::FeedEvent;

/// Initial gauge ceiling before any reading has exceeded it
pub const DEFAULT_MAX_RPM: f64 = 3000.0;

/// Number of setpoint samples retained for the history chart
pub const HISTORY_CAP: usize = 200;

/// Electrical readings published as one block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerReading {
    pub voltage: f64,
    pub current: f64,
    pub frequency: f64,
    pub power_factor: f64,
    pub power: f64,
    pub energy: f64,
}

/// Motor temperature block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    pub current: f64,
    pub max: f64,
    pub avg: f64,
}

/// Whether the motor accepts speed-setpoint commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlState {
    On,
    Off,
}

impl Default for ControlState {
    fn default() -> Self {
        Self::Off
    }
}

/// Observed rpm ceiling used to scale the speed gauge.
///
/// Seeded with [`DEFAULT_MAX_RPM`] and raised whenever a reading exceeds
/// it, so the gauge never pins past 100%.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RpmRange {
    max: f64,
}

impl Default for RpmRange {
    fn default() -> Self {
        Self {
            max: DEFAULT_MAX_RPM,
        }
    }
}

impl RpmRange {
    pub fn observe(&mut self, rpm: f64) {
        if rpm > self.max {
            self.max = rpm;
        }
    }

    /// Gauge position for a reading, clamped to [0, 100]
    pub fn percent(&self, rpm: f64) -> f64 {
        if self.max <= 0.0 {
            return 0.0;
        }
        (rpm / self.max * 100.0).clamp(0.0, 100.0)
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

/// Bounded newest-first sample history for the setpoint chart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleHistory {
    samples: VecDeque<f64>,
    cap: usize,
}

impl Default for SampleHistory {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAP)
    }
}

impl SampleHistory {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(cap),
            cap,
        }
    }

    /// Prepend a sample, discarding the oldest once the cap is reached
    pub fn push(&mut self, sample: f64) {
        self.samples.push_front(sample);
        self.samples.truncate(self.cap);
    }

    /// Newest-first iteration
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    pub fn latest(&self) -> Option<f64> {
        self.samples.front().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Latest value of every dashboard binding
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Measured motor speed in rpm
    pub rpm: Option<f64>,
    /// Commanded speed setpoint in percent
    pub setpoint_pct: Option<f64>,
    pub power: Option<PowerReading>,
    pub temperature: Option<TemperatureReading>,
    #[serde(default)]
    pub control: ControlState,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TelemetrySnapshot {
    /// Fold a feed event into the snapshot. Room status events are not
    /// telemetry and leave the snapshot untouched.
    pub fn apply(&mut self, event: &FeedEvent, at: DateTime<Utc>) {
        match event {
            FeedEvent::MotorRpm { rpm } => self.rpm = Some(*rpm),
            FeedEvent::MotorSetpoint { percent } => self.setpoint_pct = Some(*percent),
            FeedEvent::Power(reading) => self.power = Some(*reading),
            FeedEvent::Temperature(reading) => self.temperature = Some(*reading),
            FeedEvent::ControlState { state } => self.control = *state,
            FeedEvent::RoomStatus { .. } | FeedEvent::Pong => return,
        }
        self.updated_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpm_range_raises_max() {
        let mut range = RpmRange::default();
        assert_eq!(range.max(), DEFAULT_MAX_RPM);

        range.observe(1500.0);
        assert_eq!(range.max(), DEFAULT_MAX_RPM);

        range.observe(4500.0);
        assert_eq!(range.max(), 4500.0);
        assert!((range.percent(2250.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_rpm_percent_clamps() {
        let range = RpmRange::default();
        assert_eq!(range.percent(-10.0), 0.0);
        assert_eq!(range.percent(DEFAULT_MAX_RPM * 2.0), 100.0);
    }

    #[test]
    fn test_history_newest_first_and_capped() {
        let mut history = SampleHistory::with_capacity(3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            history.push(v);
        }
        assert_eq!(history.len(), 3);
        let samples: Vec<f64> = history.iter().collect();
        assert_eq!(samples, vec![4.0, 3.0, 2.0]);
        assert_eq!(history.latest(), Some(4.0));
    }

    #[test]
    fn test_default_history_cap() {
        let mut history = SampleHistory::default();
        for v in 0..300 {
            history.push(v as f64);
        }
        assert_eq!(history.len(), HISTORY_CAP);
    }

    #[test]
    fn test_snapshot_apply() {
        let mut snapshot = TelemetrySnapshot::default();
        let now = Utc::now();

        snapshot.apply(&FeedEvent::MotorRpm { rpm: 1200.0 }, now);
        snapshot.apply(
            &FeedEvent::ControlState {
                state: ControlState::On,
            },
            now,
        );
        assert_eq!(snapshot.rpm, Some(1200.0));
        assert_eq!(snapshot.control, ControlState::On);
        assert_eq!(snapshot.updated_at, Some(now));
    }

    #[test]
    fn test_snapshot_ignores_room_events() {
        let mut snapshot = TelemetrySnapshot::default();
        snapshot.apply(
            &FeedEvent::RoomStatus {
                room: "Object_2".to_string(),
                status: crate::status::RoomStatus::Alarm,
            },
            Utc::now(),
        );
        assert!(snapshot.updated_at.is_none());
    }
}
