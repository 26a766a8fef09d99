use crate::catalog::{DeviceKind, RoomId};

/// Failures surfaced by panel operations.
///
/// Every variant is recoverable and leaves state exactly as it was
/// before the attempt: a rejected operation mutates nothing, including
/// the multi-device main-switch macro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PanelError {
    /// The credential matched neither the room's nor the master one.
    #[error("incorrect password for {room}")]
    IncorrectPassword { room: RoomId },

    /// A mutating operation was attempted on a locked room.
    #[error("{room} is locked")]
    RoomLocked { room: RoomId },

    /// The device is not part of the room's catalog. Defensive: a
    /// well-behaved frontend only offers catalog devices.
    #[error("{room} has no {device}")]
    UnsupportedDevice { room: RoomId, device: DeviceKind },

    /// The main switch cannot be turned on while a device is already
    /// on independently.
    #[error("cannot turn main on in {room} while an appliance is on")]
    MainInterlock { room: RoomId },
}
