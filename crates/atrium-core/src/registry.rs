//! Room registry with per-room alarm blink state
//!
//! The registry owns every room discovered in the loaded scene and is the
//! single place where status transitions happen. Blinking is plain owned
//! state advanced by [`RoomRegistry::tick`], so cancelling a blink is a
//! field write and dropping the registry cancels everything.

use std::collections::HashMap;
use std::time::Duration;

use crate::status::{self, RoomStatus};

/// Half-period of the alarm blink: the displayed color toggles between
/// bright and dark every time this much time elapses.
pub const BLINK_PERIOD: Duration = Duration::from_millis(500);

/// Periodic color toggle driving the alarm effect
#[derive(Debug, Clone)]
struct AlarmBlink {
    elapsed: Duration,
    lit: bool,
}

impl AlarmBlink {
    /// Starts lit so the first rendered alarm frame is the bright color
    fn new() -> Self {
        Self {
            elapsed: Duration::ZERO,
            lit: true,
        }
    }

    fn tick(&mut self, dt: Duration) {
        self.elapsed += dt;
        while self.elapsed >= BLINK_PERIOD {
            self.elapsed -= BLINK_PERIOD;
            self.lit = !self.lit;
        }
    }

    fn color(&self) -> u32 {
        if self.lit {
            status::ALARM_BRIGHT
        } else {
            status::ALARM_DARK
        }
    }
}

/// A monitored room discovered in the loaded scene
#[derive(Debug, Clone)]
pub struct Room {
    /// Mesh name from the building model, unique within the registry
    pub id: String,
    /// Current monitored condition
    pub status: RoomStatus,
    /// Active blink, present iff status is Alarm
    blink: Option<AlarmBlink>,
}

impl Room {
    /// The color this room should currently render with
    pub fn display_color(&self) -> u32 {
        match &self.blink {
            Some(blink) => blink.color(),
            None => self
                .status
                .steady_color()
                .unwrap_or(status::ALARM_BRIGHT),
        }
    }

    /// Whether an alarm blink is currently active
    pub fn is_blinking(&self) -> bool {
        self.blink.is_some()
    }
}

/// Mapping from room identifier to room state, owned by the viewer session
#[derive(Debug, Clone, Default)]
pub struct RoomRegistry {
    rooms: HashMap<String, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a room discovered in the scene. Rooms start Offline until
    /// the first status update arrives. Re-inserting an existing id resets
    /// it, discarding any blink.
    pub fn insert(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.rooms.insert(
            id.clone(),
            Room {
                id,
                status: RoomStatus::Offline,
                blink: None,
            },
        );
    }

    /// Apply a status to a room.
    ///
    /// Any existing blink is cancelled before the new status takes effect;
    /// entering Alarm starts a fresh blink. Unknown room identifiers are
    /// silently ignored - updates can arrive before the scene finishes
    /// loading, and the feed may script rooms the model does not have.
    pub fn set_status(&mut self, id: &str, status: RoomStatus) {
        let Some(room) = self.rooms.get_mut(id) else {
            tracing::debug!(room = id, status = %status, "Dropping status for unknown room");
            return;
        };

        room.blink = None;
        room.status = status;
        if status == RoomStatus::Alarm {
            room.blink = Some(AlarmBlink::new());
        }
    }

    /// Advance all active blinks by the elapsed frame time
    pub fn tick(&mut self, dt: Duration) {
        for room in self.rooms.values_mut() {
            if let Some(blink) = &mut room.blink {
                blink.tick(dt);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn status(&self, id: &str) -> Option<RoomStatus> {
        self.rooms.get(id).map(|r| r.status)
    }

    pub fn display_color(&self, id: &str) -> Option<u32> {
        self.rooms.get(id).map(|r| r.display_color())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Remove a single room, cancelling its blink
    pub fn remove(&mut self, id: &str) {
        self.rooms.remove(id);
    }

    /// Discard all rooms and blink state. Called when the scene is
    /// replaced; dropping the registry has the same effect.
    pub fn clear(&mut self) {
        self.rooms.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{ALARM_BRIGHT, ALARM_DARK, NORMAL_COLOR, OFFLINE_COLOR, WARNING_COLOR};

    fn registry_with(ids: &[&str]) -> RoomRegistry {
        let mut registry = RoomRegistry::new();
        for id in ids {
            registry.insert(*id);
        }
        registry
    }

    #[test]
    fn test_rooms_start_offline() {
        let registry = registry_with(&["Object_2"]);
        assert_eq!(registry.status("Object_2"), Some(RoomStatus::Offline));
        assert_eq!(registry.display_color("Object_2"), Some(OFFLINE_COLOR));
    }

    #[test]
    fn test_blink_active_iff_alarm() {
        let mut registry = registry_with(&["Object_2"]);

        // Exhaustive transition grid: after any sequence, blink <=> Alarm
        let all = [
            RoomStatus::Normal,
            RoomStatus::Warning,
            RoomStatus::Alarm,
            RoomStatus::Offline,
        ];
        for from in all {
            for to in all {
                registry.set_status("Object_2", from);
                registry.set_status("Object_2", to);
                let room = registry.get("Object_2").unwrap();
                assert_eq!(room.status, to);
                assert_eq!(room.is_blinking(), to == RoomStatus::Alarm);
            }
        }
    }

    #[test]
    fn test_alarm_then_normal_leaves_no_blink() {
        let mut registry = registry_with(&["Object_2"]);
        registry.set_status("Object_2", RoomStatus::Alarm);
        registry.set_status("Object_2", RoomStatus::Normal);

        let room = registry.get("Object_2").unwrap();
        assert!(!room.is_blinking());
        assert_eq!(room.display_color(), NORMAL_COLOR);

        // Ticking afterwards must not resurrect the alarm colors
        registry.tick(Duration::from_millis(1500));
        assert_eq!(registry.display_color("Object_2"), Some(NORMAL_COLOR));
    }

    #[test]
    fn test_alarm_alternates_every_period() {
        let mut registry = registry_with(&["Object_2"]);
        registry.set_status("Object_2", RoomStatus::Alarm);

        // Two samples ~500ms apart yield the two alarm colors
        registry.tick(Duration::from_millis(100));
        let first = registry.display_color("Object_2").unwrap();
        registry.tick(Duration::from_millis(500));
        let second = registry.display_color("Object_2").unwrap();
        assert_ne!(first, second);
        assert!([ALARM_BRIGHT, ALARM_DARK].contains(&first));
        assert!([ALARM_BRIGHT, ALARM_DARK].contains(&second));

        // Another period toggles back
        registry.tick(Duration::from_millis(500));
        assert_eq!(registry.display_color("Object_2"), Some(first));
    }

    #[test]
    fn test_alarm_starts_bright() {
        let mut registry = registry_with(&["Object_2"]);
        registry.set_status("Object_2", RoomStatus::Alarm);
        assert_eq!(registry.display_color("Object_2"), Some(ALARM_BRIGHT));
    }

    #[test]
    fn test_reentering_alarm_restarts_phase() {
        let mut registry = registry_with(&["Object_2"]);
        registry.set_status("Object_2", RoomStatus::Alarm);
        registry.tick(Duration::from_millis(500));
        assert_eq!(registry.display_color("Object_2"), Some(ALARM_DARK));

        registry.set_status("Object_2", RoomStatus::Alarm);
        assert_eq!(registry.display_color("Object_2"), Some(ALARM_BRIGHT));
    }

    #[test]
    fn test_unknown_room_is_noop() {
        let mut registry = registry_with(&["Object_2"]);
        registry.set_status("Object_9", RoomStatus::Alarm);

        assert!(registry.get("Object_9").is_none());
        assert_eq!(registry.len(), 1);
        assert!(!registry.iter().any(|r| r.is_blinking()));
    }

    #[test]
    fn test_warning_color() {
        let mut registry = registry_with(&["Object_3"]);
        registry.set_status("Object_3", RoomStatus::Warning);
        assert_eq!(registry.display_color("Object_3"), Some(WARNING_COLOR));
    }

    #[test]
    fn test_reinsert_resets_room() {
        let mut registry = registry_with(&["Object_2"]);
        registry.set_status("Object_2", RoomStatus::Alarm);
        registry.insert("Object_2");

        let room = registry.get("Object_2").unwrap();
        assert_eq!(room.status, RoomStatus::Offline);
        assert!(!room.is_blinking());
    }

    #[test]
    fn test_clear_discards_blinks() {
        let mut registry = registry_with(&["Object_2", "Object_3"]);
        registry.set_status("Object_2", RoomStatus::Alarm);
        registry.clear();
        assert!(registry.is_empty());
    }
}
