//! Static catalog of rooms, devices, and power ratings.
//!
//! Everything in this module is fixed configuration: which rooms exist,
//! which devices each room supports, and how many watts each device
//! draws. Mutable state lives in the engine, never here.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Identifier for each room on the panel.
///
/// `Display`/`FromStr` use the lowercase short name (e.g. "sitting");
/// [`RoomId::title`] gives the human-readable form.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RoomId {
    Sitting,
    Dining,
    Study,
    Hallway,
    Kitchen,
    Veranda,
}

impl RoomId {
    /// Human-readable room title for display.
    pub fn title(self) -> &'static str {
        match self {
            RoomId::Sitting => "Sitting Room",
            RoomId::Dining => "Dining Room",
            RoomId::Study => "Study",
            RoomId::Hallway => "Hallway",
            RoomId::Kitchen => "Kitchen",
            RoomId::Veranda => "Veranda",
        }
    }

    /// Devices this room supports, in display order.
    ///
    /// The hallway, kitchen and veranda only have a light; the three
    /// main rooms also have a fan and an air conditioner.
    pub fn devices(self) -> &'static [DeviceKind] {
        match self {
            RoomId::Sitting | RoomId::Dining | RoomId::Study => {
                &[DeviceKind::Light, DeviceKind::Fan, DeviceKind::Ac]
            }
            RoomId::Hallway | RoomId::Kitchen | RoomId::Veranda => &[DeviceKind::Light],
        }
    }

    /// Whether this room's catalog includes the given device.
    pub fn supports(self, device: DeviceKind) -> bool {
        self.devices().contains(&device)
    }
}

/// A controllable load within a room.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeviceKind {
    Light,
    Fan,
    Ac,
}

impl DeviceKind {
    /// Rated power draw in watts.
    pub fn watts(self) -> u32 {
        match self {
            DeviceKind::Light => 20,
            DeviceKind::Fan => 60,
            DeviceKind::Ac => 1200,
        }
    }
}

/// Power draw of the global security light in watts.
pub const SECURITY_LIGHT_WATTS: u32 = 40;

/// Nominal system capacity in watts, used purely to scale energy
/// readings into a display percentage. It is never enforced: loads can
/// be switched on past it and the percentage simply clamps at 100.
pub const ENERGY_MAX_WATTS: u32 = 2000;
