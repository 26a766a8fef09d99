use std::collections::BTreeMap;

use serde::Serialize;
use strum::IntoEnumIterator;

use crate::catalog::{DeviceKind, RoomId};

/// State of a single room.
///
/// Invariants, maintained by [`Panel`](super::Panel):
/// - `devices` contains exactly the room's catalog devices as keys.
/// - A locked room has `main_on == false` and every device off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomState {
    /// Whether the room's controls are currently accessible.
    pub unlocked: bool,

    /// The room-wide main switch.
    pub main_on: bool,

    /// Per-device on/off flags, keyed by the room's catalog devices.
    pub devices: BTreeMap<DeviceKind, bool>,
}

impl RoomState {
    /// Initial state for a room: locked, main off, every device off.
    pub(crate) fn locked(room: RoomId) -> Self {
        Self {
            unlocked: false,
            main_on: false,
            devices: room.devices().iter().map(|&d| (d, false)).collect(),
        }
    }

    /// Whether the named device is currently on. Devices outside the
    /// room's catalog report off.
    pub fn device_on(&self, device: DeviceKind) -> bool {
        self.devices.get(&device).copied().unwrap_or(false)
    }

    /// Whether any device in the room is currently on.
    pub fn any_device_on(&self) -> bool {
        self.devices.values().any(|&on| on)
    }

    /// Set every catalog device to the same value.
    pub(crate) fn set_all_devices(&mut self, on: bool) {
        for value in self.devices.values_mut() {
            *value = on;
        }
    }
}

/// Centralized snapshot of the entire panel: every room plus the
/// security light. Frontends receive clones of this (or of individual
/// [`RoomState`]s) and never mutate it directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct State {
    pub rooms: BTreeMap<RoomId, RoomState>,
    pub security_on: bool,
}

impl Default for State {
    /// Startup state: every catalog room locked and all-off, security
    /// light off.
    fn default() -> Self {
        Self {
            rooms: RoomId::iter().map(|r| (r, RoomState::locked(r))).collect(),
            security_on: false,
        }
    }
}

impl State {
    /// The state of one room.
    pub fn room(&self, room: RoomId) -> &RoomState {
        // The map is built from the full catalog at construction and
        // rooms are never removed.
        self.rooms
            .get(&room)
            .expect("state holds every catalog room")
    }

    pub(crate) fn room_mut(&mut self, room: RoomId) -> &mut RoomState {
        self.rooms
            .get_mut(&room)
            .expect("state holds every catalog room")
    }
}
