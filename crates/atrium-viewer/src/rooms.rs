//! Room discovery and status presentation
//!
//! Named meshes under the building scene root become rooms: each one gets
//! its own material instance so it can be tinted independently, and an
//! entry in the registry that the feed drives.

use atrium_core::status;
use bevy::prelude::*;

use crate::app::Rooms;
use crate::scene::BuildingRoot;

pub struct RoomsPlugin;

impl Plugin for RoomsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (tag_rooms, update_room_colors.after(tag_rooms)));
    }
}

/// Marker component for room mesh entities
#[derive(Component)]
pub struct RoomEntity {
    pub room_id: String,
}

/// Tag named meshes under the building root as rooms.
///
/// Each room's material is cloned into a unique instance so status tints
/// never bleed between rooms sharing a GLTF material.
fn tag_rooms(
    mut commands: Commands,
    mut rooms: ResMut<Rooms>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    candidates: Query<
        (Entity, &Name, &MeshMaterial3d<StandardMaterial>),
        (With<Mesh3d>, Without<RoomEntity>),
    >,
    parents: Query<&ChildOf>,
    building: Query<Entity, With<BuildingRoot>>,
) {
    let Ok(root) = building.single() else {
        return;
    };

    for (entity, name, material) in candidates.iter() {
        if !is_descendant(entity, root, &parents) {
            continue;
        }

        let unique = materials.get(&material.0).cloned().unwrap_or_default();
        commands.entity(entity).insert((
            RoomEntity {
                room_id: name.as_str().to_string(),
            },
            MeshMaterial3d(materials.add(unique)),
        ));
        rooms.0.insert(name.as_str());
        tracing::info!(room = %name.as_str(), "Room discovered");
    }
}

fn is_descendant(mut entity: Entity, root: Entity, parents: &Query<&ChildOf>) -> bool {
    while let Ok(child_of) = parents.get(entity) {
        let parent = child_of.parent();
        if parent == root {
            return true;
        }
        entity = parent;
    }
    false
}

/// Advance blink phases and write each room's current color into its
/// material. Runs every frame; the registry decides what color that is.
fn update_room_colors(
    time: Res<Time>,
    mut rooms: ResMut<Rooms>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    query: Query<(&RoomEntity, &MeshMaterial3d<StandardMaterial>)>,
) {
    rooms.0.tick(time.delta());

    for (room, material_handle) in query.iter() {
        let Some(color) = rooms.0.display_color(&room.room_id) else {
            continue;
        };
        if let Some(material) = materials.get_mut(&material_handle.0) {
            let [r, g, b] = status::channels(color);
            material.base_color = Color::srgb(r, g, b);
        }
    }
}
