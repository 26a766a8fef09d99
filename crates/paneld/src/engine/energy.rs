//! Energy accounting: pure functions over a state snapshot.
//!
//! Readings are recomputed from scratch on every call rather than kept
//! as incremental counters, so they can never drift from the state that
//! produced them regardless of the order toggles happened in.

use strum::IntoEnumIterator;

use super::state::State;
use crate::catalog::{RoomId, ENERGY_MAX_WATTS, SECURITY_LIGHT_WATTS};

/// Current draw of a single room in watts: the sum of the ratings of
/// the devices that are on.
pub fn room_watts(state: &State, room: RoomId) -> u32 {
    state
        .room(room)
        .devices
        .iter()
        .filter(|&(_, &on)| on)
        .map(|(&device, _)| device.watts())
        .sum()
}

/// Current draw of the whole system in watts: every room plus the
/// security light when it is on.
pub fn system_watts(state: &State) -> u32 {
    let security = if state.security_on {
        SECURITY_LIGHT_WATTS
    } else {
        0
    };
    security
        + RoomId::iter()
            .map(|room| room_watts(state, room))
            .sum::<u32>()
}

/// Scale a wattage against the nominal capacity for display.
///
/// Round-half-up, clamped at 100. The capacity is display scaling only:
/// readings past it report 100, nothing is ever refused because of it.
pub fn percent(watts: u32) -> u8 {
    let scaled = (u64::from(watts) * 100 + u64::from(ENERGY_MAX_WATTS) / 2)
        / u64::from(ENERGY_MAX_WATTS);
    scaled.min(100) as u8
}
