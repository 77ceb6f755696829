//! Pointer inspector: raycast rooms under the cursor to drive the tooltip
//!
//! Runs once per pointer-move event rather than per frame. The nearest
//! intersected room wins; Offline rooms and empty space hide the tooltip.

use atrium_core::RoomStatus;
use bevy::prelude::*;
use bevy::camera::primitives::Aabb;
use bevy::window::CursorMoved;

use crate::app::Rooms;
use crate::rooms::RoomEntity;
use crate::scene::MainCamera;

/// Gap between the pointer and the tooltip corner, in logical pixels
pub const TOOLTIP_OFFSET: f32 = 16.0;

pub struct InspectorPlugin;

impl Plugin for InspectorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HoveredRoom>()
            .add_systems(Update, pointer_inspect);
    }
}

/// Room currently under the pointer, if it warrants a tooltip
#[derive(Debug, Clone, Resource, Default)]
pub struct HoveredRoom(pub Option<HoverInfo>);

#[derive(Debug, Clone)]
pub struct HoverInfo {
    pub room: String,
    pub status: RoomStatus,
    /// Pointer position in window coordinates
    pub pointer: Vec2,
}

fn pointer_inspect(
    mut cursor_moved: EventReader<CursorMoved>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    room_query: Query<(&RoomEntity, &GlobalTransform, &Aabb)>,
    rooms: Res<Rooms>,
    mut hovered: ResMut<HoveredRoom>,
) {
    // One sample per input event; intermediate positions are superseded
    let Some(moved) = cursor_moved.read().last() else {
        return;
    };

    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(camera_transform, moved.position) else {
        hovered.0 = None;
        return;
    };

    let mut closest: Option<(f32, &RoomEntity)> = None;
    for (room, transform, aabb) in room_query.iter() {
        let (min, max) = world_aabb(aabb, transform);
        if let Some(t) = ray_aabb(ray.origin, *ray.direction, min, max) {
            if closest.map_or(true, |(best, _)| t < best) {
                closest = Some((t, room));
            }
        }
    }

    hovered.0 = closest.and_then(|(_, room)| {
        let status = rooms.0.status(&room.room_id)?;
        if status == RoomStatus::Offline {
            return None;
        }
        Some(HoverInfo {
            room: room.room_id.clone(),
            status,
            pointer: moved.position,
        })
    });
}

/// World-space bounding box of a transformed local AABB
fn world_aabb(aabb: &Aabb, transform: &GlobalTransform) -> (Vec3, Vec3) {
    let center = Vec3::from(aabb.center);
    let half = Vec3::from(aabb.half_extents);

    let mut min = Vec3::splat(f32::MAX);
    let mut max = Vec3::splat(f32::MIN);
    for sx in [-1.0f32, 1.0] {
        for sy in [-1.0f32, 1.0] {
            for sz in [-1.0f32, 1.0] {
                let corner = center + half * Vec3::new(sx, sy, sz);
                let world = transform.transform_point(corner);
                min = min.min(world);
                max = max.max(world);
            }
        }
    }
    (min, max)
}

/// Slab-test a ray against an AABB, returning the entry distance along the
/// ray. A ray starting inside the box reports distance zero.
fn ray_aabb(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        if d.abs() < 1e-9 {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let t1 = (min[axis] - o) / d;
        let t2 = (max[axis] - o) / d;
        let (near, far) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
        t_min = t_min.max(near);
        t_max = t_max.min(far);
        if t_min > t_max {
            return None;
        }
    }

    if t_max < 0.0 {
        return None;
    }
    Some(t_min.max(0.0))
}

/// Anchor the tooltip near the pointer, flipping to the opposite side of
/// the pointer on any axis where it would overflow the viewport.
pub fn tooltip_anchor(pointer: Vec2, size: Vec2, viewport: Vec2) -> Vec2 {
    let mut x = pointer.x + TOOLTIP_OFFSET;
    if x + size.x > viewport.x {
        x = pointer.x - TOOLTIP_OFFSET - size.x;
    }
    let mut y = pointer.y + TOOLTIP_OFFSET;
    if y + size.y > viewport.y {
        y = pointer.y - TOOLTIP_OFFSET - size.y;
    }
    Vec2::new(x.max(0.0), y.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_hits_box() {
        let t = ray_aabb(
            Vec3::new(0.0, 0.0, -10.0),
            Vec3::Z,
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        );
        assert_eq!(t, Some(9.0));
    }

    #[test]
    fn test_ray_misses_box() {
        let t = ray_aabb(
            Vec3::new(5.0, 0.0, -10.0),
            Vec3::Z,
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        );
        assert!(t.is_none());
    }

    #[test]
    fn test_ray_behind_box() {
        let t = ray_aabb(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::Z,
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        );
        assert!(t.is_none());
    }

    #[test]
    fn test_ray_inside_box_reports_zero() {
        let t = ray_aabb(
            Vec3::ZERO,
            Vec3::Z,
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        );
        assert_eq!(t, Some(0.0));
    }

    #[test]
    fn test_nearest_of_two_overlapping_boxes_wins() {
        let origin = Vec3::new(0.0, 0.0, -10.0);
        // Two boxes stacked along the ray; the near one must report the
        // smaller distance
        let near = ray_aabb(origin, Vec3::Z, Vec3::new(-1.0, -1.0, -2.0), Vec3::new(1.0, 1.0, 2.0))
            .unwrap();
        let far = ray_aabb(origin, Vec3::Z, Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 4.0))
            .unwrap();
        assert!(near < far);
    }

    #[test]
    fn test_tooltip_anchor_flips_at_edges() {
        let size = Vec2::new(180.0, 64.0);
        let viewport = Vec2::new(800.0, 600.0);

        // Plenty of space: below-right of the pointer
        let anchor = tooltip_anchor(Vec2::new(100.0, 100.0), size, viewport);
        assert_eq!(anchor, Vec2::new(116.0, 116.0));

        // Near right edge: flips left of the pointer
        let anchor = tooltip_anchor(Vec2::new(790.0, 100.0), size, viewport);
        assert_eq!(anchor.x, 790.0 - TOOLTIP_OFFSET - size.x);

        // Near bottom edge: flips above the pointer
        let anchor = tooltip_anchor(Vec2::new(100.0, 590.0), size, viewport);
        assert_eq!(anchor.y, 590.0 - TOOLTIP_OFFSET - size.y);

        // Near bottom-right corner: flips on both axes
        let anchor = tooltip_anchor(Vec2::new(795.0, 595.0), size, viewport);
        assert!(anchor.x + size.x <= viewport.x);
        assert!(anchor.y + size.y <= viewport.y);
    }

    #[test]
    fn test_tooltip_anchor_stays_in_viewport_at_all_edges() {
        let size = Vec2::new(180.0, 64.0);
        let viewport = Vec2::new(800.0, 600.0);

        for pointer in [
            Vec2::new(0.0, 300.0),   // left edge
            Vec2::new(800.0, 300.0), // right edge
            Vec2::new(400.0, 0.0),   // top edge
            Vec2::new(400.0, 600.0), // bottom edge
        ] {
            let anchor = tooltip_anchor(pointer, size, viewport);
            assert!(anchor.x >= 0.0 && anchor.x + size.x <= viewport.x);
            assert!(anchor.y >= 0.0 && anchor.y + size.y <= viewport.y);
        }
    }
}
