//! Room status taxonomy and display palette

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Fixed color for rooms in normal condition
pub const NORMAL_COLOR: u32 = 0x4caf50;
/// Fixed color for rooms in warning condition
pub const WARNING_COLOR: u32 = 0xffc107;
/// Fixed color for rooms that are offline
pub const OFFLINE_COLOR: u32 = 0x9e9e9e;
/// Bright phase of the alarm blink
pub const ALARM_BRIGHT: u32 = 0xff0000;
/// Dark phase of the alarm blink
pub const ALARM_DARK: u32 = 0x550000;

/// Monitored condition of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    /// Room is monitored and healthy
    Normal,
    /// Room has a non-critical anomaly
    Warning,
    /// Room is in alarm; rendered as a two-color oscillation
    Alarm,
    /// Room has no live data
    Offline,
}

impl Default for RoomStatus {
    fn default() -> Self {
        Self::Offline
    }
}

impl RoomStatus {
    /// Fixed display color, or `None` for Alarm which oscillates between
    /// [`ALARM_BRIGHT`] and [`ALARM_DARK`] instead.
    pub fn steady_color(self) -> Option<u32> {
        match self {
            RoomStatus::Normal => Some(NORMAL_COLOR),
            RoomStatus::Warning => Some(WARNING_COLOR),
            RoomStatus::Offline => Some(OFFLINE_COLOR),
            RoomStatus::Alarm => None,
        }
    }

    /// Lowercase wire name, matching the serde representation
    pub fn as_str(self) -> &'static str {
        match self {
            RoomStatus::Normal => "normal",
            RoomStatus::Warning => "warning",
            RoomStatus::Alarm => "alarm",
            RoomStatus::Offline => "offline",
        }
    }
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a status string is not one of the four known names
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown room status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for RoomStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(RoomStatus::Normal),
            "warning" => Ok(RoomStatus::Warning),
            "alarm" => Ok(RoomStatus::Alarm),
            "offline" => Ok(RoomStatus::Offline),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// Split a packed 0xRRGGBB color into [0, 1] channels
pub fn channels(color: u32) -> [f32; 3] {
    [
        ((color >> 16) & 0xff) as f32 / 255.0,
        ((color >> 8) & 0xff) as f32 / 255.0,
        (color & 0xff) as f32 / 255.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steady_colors() {
        assert_eq!(RoomStatus::Normal.steady_color(), Some(NORMAL_COLOR));
        assert_eq!(RoomStatus::Warning.steady_color(), Some(WARNING_COLOR));
        assert_eq!(RoomStatus::Offline.steady_color(), Some(OFFLINE_COLOR));
        assert_eq!(RoomStatus::Alarm.steady_color(), None);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            RoomStatus::Normal,
            RoomStatus::Warning,
            RoomStatus::Alarm,
            RoomStatus::Offline,
        ] {
            assert_eq!(status.as_str().parse::<RoomStatus>(), Ok(status));
        }
        assert!("online".parse::<RoomStatus>().is_err());
    }

    #[test]
    fn test_channels() {
        assert_eq!(channels(0xff0000), [1.0, 0.0, 0.0]);
        let [r, g, b] = channels(0x550000);
        assert!((r - 0x55 as f32 / 255.0).abs() < f32::EPSILON);
        assert_eq!(g, 0.0);
        assert_eq!(b, 0.0);
    }
}
