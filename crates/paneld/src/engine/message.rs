//! Inputs from frontends to the engine.

use crate::catalog::{DeviceKind, RoomId};

/// Commands FROM frontends TO the engine.
///
/// Each command is applied to completion (validate, mutate, recompute
/// energy, notify) before the next one is taken off the channel, so
/// transitions never interleave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Attempt to unlock a room with a credential.
    Unlock { room: RoomId, attempt: String },

    /// Lock a room, forcing its main switch and every device off.
    Lock { room: RoomId },

    /// Set the room-wide main switch.
    SetMain { room: RoomId, on: bool },

    /// Set a single device.
    SetDevice {
        room: RoomId,
        device: DeviceKind,
        on: bool,
    },

    /// Double-activation shortcut: flip the room's light.
    QuickToggleLight { room: RoomId },

    /// Set the global security light.
    SetSecurity { on: bool },
}
