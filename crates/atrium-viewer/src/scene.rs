//! Scene setup - lights, asset loading, and character animation

use bevy::gltf::Gltf;
use bevy::prelude::*;

use crate::app::AssetPaths;

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_scene)
            .add_systems(Update, (spawn_loaded_scenes, start_character_animation));
    }
}

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Marker for the building scene root; named meshes below it become rooms
#[derive(Component)]
pub struct BuildingRoot;

/// Marker for the animated character scene root
#[derive(Component)]
pub struct CharacterRoot;

/// Tracks the two scene files while they load
#[derive(Resource)]
pub struct SceneAssets {
    pub building: Handle<Gltf>,
    pub character: Handle<Gltf>,
    pub building_spawned: bool,
    pub character_spawned: bool,
}

fn setup_scene(mut commands: Commands, asset_server: Res<AssetServer>, paths: Res<AssetPaths>) {
    // Camera with a provisional pose; auto-framing repositions it once the
    // building is loaded
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            near: 0.01,
            far: 10000.0,
            ..default()
        }),
        Transform::from_xyz(5.0, 5.0, 12.0).looking_at(Vec3::ZERO, Vec3::Y),
        MainCamera,
    ));

    // Flat ambient fill plus one sun-like directional light
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 800.0,
        ..default()
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 5000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(10.0, 20.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Kick off both scene loads; spawn_loaded_scenes picks them up
    commands.insert_resource(SceneAssets {
        building: asset_server.load(&paths.building),
        character: asset_server.load(&paths.character),
        building_spawned: false,
        character_spawned: false,
    });
}

/// Spawn scene roots once their GLTFs finish loading. Load failures are
/// logged and leave the scene empty; the viewer keeps running.
fn spawn_loaded_scenes(
    mut commands: Commands,
    mut scenes: ResMut<SceneAssets>,
    asset_server: Res<AssetServer>,
    gltf_assets: Res<Assets<Gltf>>,
) {
    use bevy::asset::LoadState;

    if !scenes.building_spawned {
        match asset_server.get_load_state(scenes.building.id()) {
            Some(LoadState::Loaded) => {
                if let Some(scene) = default_scene(gltf_assets.get(&scenes.building)) {
                    tracing::info!("Building scene loaded");
                    commands.spawn((SceneRoot(scene), Transform::default(), BuildingRoot));
                }
                scenes.building_spawned = true;
            }
            Some(LoadState::Failed(_)) => {
                tracing::error!("Failed to load building scene");
                scenes.building_spawned = true;
            }
            _ => {}
        }
    }

    if !scenes.character_spawned {
        match asset_server.get_load_state(scenes.character.id()) {
            Some(LoadState::Loaded) => {
                if let Some(scene) = default_scene(gltf_assets.get(&scenes.character)) {
                    tracing::info!("Character scene loaded");
                    commands.spawn((SceneRoot(scene), Transform::default(), CharacterRoot));
                }
                scenes.character_spawned = true;
            }
            Some(LoadState::Failed(_)) => {
                tracing::error!("Failed to load character scene");
                scenes.character_spawned = true;
            }
            _ => {}
        }
    }
}

fn default_scene(gltf: Option<&Gltf>) -> Option<Handle<Scene>> {
    let gltf = gltf?;
    gltf.default_scene
        .clone()
        .or_else(|| gltf.scenes.first().cloned())
}

/// Play the character's first animation clip on loop as soon as its
/// animation player spawns
fn start_character_animation(
    mut commands: Commands,
    scenes: Res<SceneAssets>,
    gltf_assets: Res<Assets<Gltf>>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
    mut players: Query<(Entity, &mut AnimationPlayer), Added<AnimationPlayer>>,
) {
    let Some(gltf) = gltf_assets.get(&scenes.character) else {
        return;
    };
    let Some(clip) = gltf.animations.first() else {
        return;
    };

    for (entity, mut player) in players.iter_mut() {
        let (graph, index) = AnimationGraph::from_clip(clip.clone());
        commands
            .entity(entity)
            .insert(AnimationGraphHandle(graphs.add(graph)));
        player.play(index).repeat();
        tracing::info!("Character animation started");
    }
}
