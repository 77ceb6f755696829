//! Bevy application setup

use atrium_core::{RoomRegistry, RpmRange, SampleHistory, TelemetrySnapshot};
use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::{prelude::MeshPickingPlugin, DefaultPickingPlugins};

use crate::camera::CameraPlugin;
use crate::inspector::InspectorPlugin;
use crate::network::NetworkPlugin;
use crate::rooms::RoomsPlugin;
use crate::scene::ScenePlugin;
use crate::ui::UiPlugin;

/// Room registry shared between the feed, the blink systems, and the UI
#[derive(Resource, Default)]
pub struct Rooms(pub RoomRegistry);

/// Scene files loaded at startup, served by the daemon under /assets
#[derive(Debug, Clone, Resource)]
pub struct AssetPaths {
    pub building: String,
    pub character: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            building: "assets/building.glb".to_string(),
            character: "assets/character.glb".to_string(),
        }
    }
}

/// Camera controller settings
#[derive(Debug, Clone, Resource)]
pub struct CameraSettings {
    pub distance: f32,
    pub target_distance: f32, // For smooth zoom
    pub azimuth: f32,
    pub elevation: f32,
    pub target: Vec3,
    pub target_focus: Vec3, // For smooth re-centering
    pub sensitivity: f32,
    pub zoom_speed: f32,
    pub smooth_factor: f32,
    /// Zoom clamp, widened once the model is framed
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            distance: 8.0,
            target_distance: 8.0,
            azimuth: 0.8,   // Start rotated ~45 degrees
            elevation: 0.5, // Slightly elevated view
            target: Vec3::ZERO,
            target_focus: Vec3::ZERO,
            sensitivity: 0.005,
            zoom_speed: 0.1,
            smooth_factor: 0.15,
            min_distance: 0.1,
            max_distance: 10000.0,
        }
    }
}

/// Latest telemetry values and the dashboard bookkeeping around them
#[derive(Debug, Clone, Resource, Default)]
pub struct TelemetryState {
    pub snapshot: TelemetrySnapshot,
    pub rpm_range: RpmRange,
    pub setpoint_history: SampleHistory,
    /// Slider position; follows the feed until the operator drags it
    pub setpoint_drag: f64,
    pub connected: bool,
}

/// Run the Bevy application
pub fn run() {
    App::new()
        .insert_resource(ClearColor(Color::srgb(0.1, 0.1, 0.15))) // Dark blue-gray background
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Atrium - Building Monitoring".to_string(),
                        canvas: Some("#atrium-canvas".to_string()),
                        fit_canvas_to_parent: true,
                        prevent_default_event_handling: false,
                        ..default()
                    }),
                    ..default()
                })
                .set(AssetPlugin {
                    // Load assets from root (daemon serves /assets directly)
                    file_path: "".to_string(),
                    // Don't look for .meta files - server doesn't have them
                    meta_check: bevy::asset::AssetMetaCheck::Never,
                    ..default()
                }),
        )
        // DefaultPickingPlugins provides core picking; MeshPickingPlugin must be
        // added separately for 3D mesh raycasting. Both must be added BEFORE
        // EguiPlugin so it can detect PickingPlugin.
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(MeshPickingPlugin)
        .add_plugins(EguiPlugin::default())
        .init_resource::<Rooms>()
        .init_resource::<AssetPaths>()
        .init_resource::<CameraSettings>()
        .init_resource::<TelemetryState>()
        .add_plugins(NetworkPlugin)
        .add_plugins(ScenePlugin)
        .add_plugins(RoomsPlugin)
        .add_plugins(CameraPlugin)
        .add_plugins(InspectorPlugin)
        .add_plugins(UiPlugin)
        .run();
}
