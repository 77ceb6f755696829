//! Configuration loading and validation

use anyhow::Result;
use atrium_core::RoomStatus;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    /// Scripted room-status changes replayed after startup
    #[serde(default = "default_room_script", rename = "room_step")]
    pub room_script: Vec<RoomStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Bind address for web server
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Path to 3D scene files served to the viewer
    #[serde(default = "default_assets_path")]
    pub path: String,
    /// Building scene file, relative to the assets path
    #[serde(default = "default_building")]
    pub building: String,
    /// Animated character scene file, relative to the assets path
    #[serde(default = "default_character")]
    pub character: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            path: default_assets_path(),
            building: default_building(),
            character: default_character(),
        }
    }
}

fn default_assets_path() -> String {
    "./assets".to_string()
}

fn default_building() -> String {
    "building.glb".to_string()
}

fn default_character() -> String {
    "character.glb".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Generate simulated telemetry; disable when an external source
    /// pushes readings through the REST API instead
    #[serde(default = "default_true")]
    pub simulate: bool,
    /// Seconds between simulated telemetry publishes
    #[serde(default = "default_feed_interval")]
    pub interval_secs: f64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            simulate: true,
            interval_secs: default_feed_interval(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_feed_interval() -> f64 {
    1.0
}

/// One scripted room-status change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomStep {
    /// Seconds after startup
    pub after_secs: f64,
    pub room: String,
    pub status: RoomStatus,
}

fn default_room_script() -> Vec<RoomStep> {
    vec![
        RoomStep {
            after_secs: 0.5,
            room: "Object_2".to_string(),
            status: RoomStatus::Alarm,
        },
        RoomStep {
            after_secs: 4.0,
            room: "Object_3".to_string(),
            status: RoomStatus::Warning,
        },
        RoomStep {
            after_secs: 6.0,
            room: "Object_4".to_string(),
            status: RoomStatus::Offline,
        },
        RoomStep {
            after_secs: 8.0,
            room: "Object_5".to_string(),
            status: RoomStatus::Normal,
        },
    ]
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config {
            room_script: default_room_script(),
            ..Config::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.daemon.bind, "0.0.0.0:8080");
        assert!(config.feed.simulate);
        assert_eq!(config.feed.interval_secs, 1.0);
        assert_eq!(config.room_script.len(), 4);
        assert_eq!(config.room_script[0].room, "Object_2");
        assert_eq!(config.room_script[0].status, RoomStatus::Alarm);
    }

    #[test]
    fn test_parse_room_script() {
        let config: Config = toml::from_str(
            r#"
            [daemon]
            bind = "127.0.0.1:9000"

            [feed]
            simulate = false

            [[room_step]]
            after_secs = 1.5
            room = "Lobby"
            status = "warning"
            "#,
        )
        .unwrap();

        assert_eq!(config.daemon.bind, "127.0.0.1:9000");
        assert!(!config.feed.simulate);
        assert_eq!(config.room_script.len(), 1);
        assert_eq!(config.room_script[0].status, RoomStatus::Warning);
    }
}
