//! Atrium Core - Shared types for the building monitoring suite
//!
//! This crate provides the foundational types for the Atrium system:
//! - Room status taxonomy and the display palette
//! - Room registry with per-room alarm blink state
//! - Telemetry reading types and dashboard bookkeeping
//! - The WebSocket event set shared by daemon and viewer

pub mod event;
pub mod registry;
pub mod status;
pub mod telemetry;

pub use event::FeedEvent;
pub use registry::{Room, RoomRegistry, BLINK_PERIOD};
pub use status::{ParseStatusError, RoomStatus};
pub use telemetry::{
    ControlState, PowerReading, RpmRange, SampleHistory, TelemetrySnapshot, TemperatureReading,
};
