//! Notifications from the engine to frontends.

use std::fmt;

use super::state::RoomState;
use crate::catalog::RoomId;

/// Why a mutating operation was rejected.
///
/// `Display` yields the user-facing notice text verbatim, for frontends
/// that show transient messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// Main switch used while the room is locked.
    MainSwitchLocked,
    /// Device toggled while the room is locked.
    DevicesLocked,
    /// Main switch turned on while an appliance is already on.
    MainInterlock,
    /// Device not part of the room's catalog.
    UnsupportedDevice,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BlockReason::MainSwitchLocked => "Room locked. Unlock to use main switch.",
            BlockReason::DevicesLocked => "Room locked. Unlock to change devices.",
            BlockReason::MainInterlock => "Cannot turn main ON: some appliance already ON.",
            BlockReason::UnsupportedDevice => "Device not available in this room.",
        };
        f.write_str(text)
    }
}

/// Notifications FROM the engine TO frontends (push model).
///
/// The engine emits these after every transition; frontends are pure
/// subscribers and re-render from the carried snapshots and readings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A room's state changed; carries a full snapshot to re-render
    /// from (device glow, control enablement based on `unlocked`).
    RoomChanged { room: RoomId, state: RoomState },

    /// A room's energy reading changed.
    RoomEnergyChanged {
        room: RoomId,
        watts: u32,
        percent: u8,
    },

    /// The system-wide energy reading changed.
    SystemEnergyChanged { watts: u32, percent: u8 },

    /// An unlock attempt failed; show a transient "incorrect password"
    /// notice.
    UnlockFailed { room: RoomId },

    /// A mutating operation was rejected; show a transient notice.
    OperationBlocked { room: RoomId, reason: BlockReason },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_reasons_render_the_notice_text() {
        assert_eq!(
            BlockReason::MainSwitchLocked.to_string(),
            "Room locked. Unlock to use main switch."
        );
        assert_eq!(
            BlockReason::DevicesLocked.to_string(),
            "Room locked. Unlock to change devices."
        );
        assert_eq!(
            BlockReason::MainInterlock.to_string(),
            "Cannot turn main ON: some appliance already ON."
        );
    }
}
