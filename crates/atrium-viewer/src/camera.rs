//! Camera controls: orbit navigation, auto-framing, and view reset

use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use bevy::camera::primitives::Aabb;
use std::time::Duration;

use crate::app::CameraSettings;
use crate::rooms::RoomEntity;
use crate::scene::{BuildingRoot, MainCamera};

/// Fixed duration of the reset-view interpolation
pub const RESET_DURATION: Duration = Duration::from_millis(600);

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DefaultView>()
            .init_resource::<ViewResetState>()
            .init_resource::<FramingState>()
            .add_message::<ResetView>()
            .add_systems(
                Update,
                (
                    frame_loaded_building,
                    update_camera.after(frame_loaded_building),
                    handle_reset_requests.after(update_camera),
                    advance_view_reset.after(handle_reset_requests),
                ),
            );
    }
}

/// Request to glide the camera back to the default view
#[derive(Message)]
pub struct ResetView;

/// Camera pose snapshotted after initial framing, used as the reset target
#[derive(Debug, Clone, Copy)]
pub struct ViewSnapshot {
    pub position: Vec3,
    pub target: Vec3,
}

/// Holds the default view once the model has been framed
#[derive(Debug, Clone, Resource, Default)]
pub struct DefaultView(pub Option<ViewSnapshot>);

/// The single reset interpolation in flight, if any
#[derive(Resource, Default)]
pub struct ViewResetState(pub Option<ViewInterpolation>);

/// Time-boxed linear interpolation of the camera pose back to a snapshot.
///
/// Exactly one of these is active at a time: requesting a reset while one
/// is running replaces it, restarting from the then-current pose.
#[derive(Debug, Clone)]
pub struct ViewInterpolation {
    from_position: Vec3,
    from_target: Vec3,
    to_position: Vec3,
    to_target: Vec3,
    elapsed: f32,
}

impl ViewInterpolation {
    pub fn new(from_position: Vec3, from_target: Vec3, to: ViewSnapshot) -> Self {
        Self {
            from_position,
            from_target,
            to_position: to.position,
            to_target: to.target,
            elapsed: 0.0,
        }
    }

    /// Advance by a frame's elapsed time and return the interpolated pose
    pub fn advance(&mut self, dt: f32) -> (Vec3, Vec3) {
        self.elapsed += dt;
        let p = (self.elapsed / RESET_DURATION.as_secs_f32()).min(1.0);
        (
            self.from_position.lerp(self.to_position, p),
            self.from_target.lerp(self.to_target, p),
        )
    }

    pub fn finished(&self) -> bool {
        self.elapsed >= RESET_DURATION.as_secs_f32()
    }
}

/// Recover orbit parameters (distance, azimuth, elevation) from a pose,
/// Y-up convention
pub fn orbit_from_pose(position: Vec3, target: Vec3) -> (f32, f32, f32) {
    let offset = position - target;
    let distance = offset.length().max(1e-6);
    let elevation = (offset.y / distance).clamp(-1.0, 1.0).asin();
    let azimuth = offset.z.atan2(offset.x);
    (distance, azimuth, elevation)
}

/// Orbit parameters back to a camera position, Y-up convention
pub fn pose_from_orbit(distance: f32, azimuth: f32, elevation: f32, target: Vec3) -> Vec3 {
    let x = distance * azimuth.cos() * elevation.cos();
    let y = distance * elevation.sin();
    let z = distance * azimuth.sin() * elevation.cos();
    target + Vec3::new(x, y, z)
}

/// Tracks whether the loaded building has been framed yet
#[derive(Resource, Default)]
struct FramingState {
    framed: bool,
    last_room_count: usize,
}

/// Once the building's rooms have all spawned, center the model, derive
/// the camera clip planes from its scale, move the camera to the fit
/// position, and snapshot the default view.
fn frame_loaded_building(
    mut framing: ResMut<FramingState>,
    mut settings: ResMut<CameraSettings>,
    mut default_view: ResMut<DefaultView>,
    mut building: Query<&mut Transform, With<BuildingRoot>>,
    mut camera: Query<
        (&mut Transform, &mut Projection),
        (With<MainCamera>, Without<BuildingRoot>),
    >,
    room_meshes: Query<(&GlobalTransform, &Aabb), With<RoomEntity>>,
) {
    if framing.framed {
        return;
    }

    // Rooms spawn over a couple of frames; wait for the count to settle
    let count = room_meshes.iter().count();
    if count == 0 || count != framing.last_room_count {
        framing.last_room_count = count;
        return;
    }

    let mut min = Vec3::splat(f32::MAX);
    let mut max = Vec3::splat(f32::MIN);
    for (transform, aabb) in room_meshes.iter() {
        let center = Vec3::from(aabb.center);
        let half = Vec3::from(aabb.half_extents);
        for corner in aabb_corners(center, half) {
            let world = transform.transform_point(corner);
            min = min.min(world);
            max = max.max(world);
        }
    }

    let size = max - min;
    let center = (min + max) / 2.0;
    let max_dim = size.max_element().max(1e-3);

    // Center the model at the origin
    if let Ok(mut transform) = building.single_mut() {
        transform.translation -= center;
    }

    let position = Vec3::new(max_dim * 0.3, max_dim * 0.3, max_dim * 0.8);
    let target = Vec3::ZERO;

    if let Ok((mut transform, mut projection)) = camera.single_mut() {
        transform.translation = position;
        transform.look_at(target, Vec3::Y);
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.near = max_dim / 100.0;
            perspective.far = max_dim * 100.0;
        }
    }

    let (distance, azimuth, elevation) = orbit_from_pose(position, target);
    settings.distance = distance;
    settings.target_distance = distance;
    settings.azimuth = azimuth;
    settings.elevation = elevation;
    settings.target = target;
    settings.target_focus = target;
    settings.min_distance = max_dim * 0.05;
    settings.max_distance = max_dim * 5.0;

    default_view.0 = Some(ViewSnapshot { position, target });
    framing.framed = true;
    tracing::info!(rooms = count, max_dim, "Framed building and saved default view");
}

fn aabb_corners(center: Vec3, half: Vec3) -> [Vec3; 8] {
    let mut corners = [Vec3::ZERO; 8];
    let mut i = 0;
    for sx in [-1.0f32, 1.0] {
        for sy in [-1.0f32, 1.0] {
            for sz in [-1.0f32, 1.0] {
                corners[i] = center + half * Vec3::new(sx, sy, sz);
                i += 1;
            }
        }
    }
    corners
}

fn update_camera(
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
    mut settings: ResMut<CameraSettings>,
    reset: Res<ViewResetState>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut mouse_wheel: EventReader<MouseWheel>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    time: Res<Time>,
    mut contexts: bevy_egui::EguiContexts,
) {
    // A running reset owns the camera; drain input so it doesn't replay
    if reset.0.is_some() {
        mouse_motion.clear();
        mouse_wheel.clear();
        return;
    }

    // Check if egui wants the mouse - if so, don't process camera controls
    let egui_wants_pointer = match contexts.ctx_mut() {
        Ok(ctx) => ctx.wants_pointer_input(),
        Err(_) => false,
    };

    let mut total_motion = Vec2::ZERO;
    for motion in mouse_motion.read() {
        total_motion += motion.delta;
    }

    // Orbit with left mouse drag (only when UI doesn't want pointer)
    if mouse_button.pressed(MouseButton::Left) && !egui_wants_pointer {
        settings.azimuth += total_motion.x * settings.sensitivity;
        settings.elevation =
            (settings.elevation + total_motion.y * settings.sensitivity).clamp(-1.5, 1.5);
    }

    // Pan with right mouse drag (screen-right and world-up)
    if mouse_button.pressed(MouseButton::Right) && !egui_wants_pointer {
        let right = Vec3::new(settings.azimuth.sin(), 0.0, -settings.azimuth.cos());
        let pan_speed = settings.distance * 0.002;
        settings.target_focus += right * total_motion.x * pan_speed;
        settings.target_focus += Vec3::Y * total_motion.y * pan_speed;
    }

    // Zoom with scroll - smooth zoom using target_distance
    if !egui_wants_pointer {
        for scroll in mouse_wheel.read() {
            let zoom_factor = 1.0 - scroll.y * settings.zoom_speed * 0.3;
            settings.target_distance = (settings.target_distance * zoom_factor)
                .clamp(settings.min_distance, settings.max_distance);
        }
    } else {
        // Drain the scroll events even if we're not using them
        for _ in mouse_wheel.read() {}
    }

    // Smooth interpolation for zoom and target
    let dt = time.delta_secs();
    let lerp_factor = 1.0 - (-settings.smooth_factor * 60.0 * dt).exp();
    settings.distance =
        settings.distance + (settings.target_distance - settings.distance) * lerp_factor;
    settings.target = settings.target + (settings.target_focus - settings.target) * lerp_factor;

    if let Ok(mut transform) = camera_query.single_mut() {
        transform.translation = pose_from_orbit(
            settings.distance,
            settings.azimuth,
            settings.elevation,
            settings.target,
        );
        transform.look_at(settings.target, Vec3::Y);
    }
}

/// Start (or restart) the reset interpolation from the current pose
fn handle_reset_requests(
    mut requests: MessageReader<ResetView>,
    mut reset: ResMut<ViewResetState>,
    default_view: Res<DefaultView>,
    settings: Res<CameraSettings>,
    camera_query: Query<&Transform, With<MainCamera>>,
) {
    for _ in requests.read() {
        let Some(snapshot) = default_view.0 else {
            continue;
        };
        let Ok(transform) = camera_query.single() else {
            continue;
        };
        reset.0 = Some(ViewInterpolation::new(
            transform.translation,
            settings.target,
            snapshot,
        ));
    }
}

/// Advance the active reset once per frame, handing control back to the
/// orbit controller when it completes
fn advance_view_reset(
    time: Res<Time>,
    mut reset: ResMut<ViewResetState>,
    mut settings: ResMut<CameraSettings>,
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
) {
    let Some(anim) = reset.0.as_mut() else {
        return;
    };

    let (position, target) = anim.advance(time.delta_secs());
    let (distance, azimuth, elevation) = orbit_from_pose(position, target);
    settings.distance = distance;
    settings.target_distance = distance;
    settings.azimuth = azimuth;
    settings.elevation = elevation;
    settings.target = target;
    settings.target_focus = target;

    if let Ok(mut transform) = camera_query.single_mut() {
        transform.translation = position;
        transform.look_at(target, Vec3::Y);
    }

    if anim.finished() {
        reset.0 = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_reaches_snapshot() {
        let snapshot = ViewSnapshot {
            position: Vec3::new(3.0, 3.0, 8.0),
            target: Vec3::ZERO,
        };
        let mut anim =
            ViewInterpolation::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0), snapshot);

        // Sampled over more than the fixed duration
        let mut pose = (Vec3::ZERO, Vec3::ZERO);
        for _ in 0..45 {
            pose = anim.advance(1.0 / 60.0);
        }
        assert!(anim.finished());
        assert!(pose.0.distance(snapshot.position) < 1e-4);
        assert!(pose.1.distance(snapshot.target) < 1e-4);
    }

    #[test]
    fn test_reset_midpoint_is_linear() {
        let snapshot = ViewSnapshot {
            position: Vec3::new(10.0, 0.0, 0.0),
            target: Vec3::ZERO,
        };
        let mut anim = ViewInterpolation::new(Vec3::ZERO, Vec3::ZERO, snapshot);

        let (position, _) = anim.advance(0.3);
        assert!(position.distance(Vec3::new(5.0, 0.0, 0.0)) < 1e-4);
    }

    #[test]
    fn test_restart_replaces_interpolation() {
        let snapshot = ViewSnapshot {
            position: Vec3::new(10.0, 0.0, 0.0),
            target: Vec3::ZERO,
        };
        let mut first = ViewInterpolation::new(Vec3::ZERO, Vec3::ZERO, snapshot);
        let (current, _) = first.advance(0.3);

        // A second reset starts from the pose the first one reached
        let mut second = ViewInterpolation::new(current, Vec3::ZERO, snapshot);
        let (position, _) = second.advance(0.0);
        assert!(position.distance(current) < 1e-4);
        assert!(!second.finished());

        let (end, _) = second.advance(RESET_DURATION.as_secs_f32());
        assert!(second.finished());
        assert!(end.distance(snapshot.position) < 1e-4);
    }

    #[test]
    fn test_orbit_pose_round_trip() {
        let target = Vec3::new(1.0, 2.0, 3.0);
        let position = Vec3::new(4.0, 6.0, -2.0);
        let (distance, azimuth, elevation) = orbit_from_pose(position, target);
        let rebuilt = pose_from_orbit(distance, azimuth, elevation, target);
        assert!(rebuilt.distance(position) < 1e-4);
    }

    #[test]
    fn test_aabb_corners_span_box() {
        let corners = aabb_corners(Vec3::ZERO, Vec3::splat(1.0));
        let min = corners.iter().copied().reduce(Vec3::min).unwrap();
        let max = corners.iter().copied().reduce(Vec3::max).unwrap();
        assert_eq!(min, Vec3::splat(-1.0));
        assert_eq!(max, Vec3::splat(1.0));
    }
}
