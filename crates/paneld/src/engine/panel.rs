//! The panel core: access control and the room state machine.
//!
//! [`Panel`] owns the entire mutable state of the system. Frontends
//! never reach into it; every change goes through the operations here,
//! which validate, mutate, recompute energy, and report what changed.

use std::collections::BTreeMap;

use strum::IntoEnumIterator;
use tracing::debug;

use super::energy;
use super::error::PanelError;
use super::event::{BlockReason, Notification};
use super::message::Command;
use super::state::{RoomState, State};
use crate::catalog::{DeviceKind, RoomId};

/// Unlock credentials. Plaintext by design: this is a simulated panel,
/// not a security boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Credential that unlocks every room at once.
    pub master: String,

    /// Per-room credentials.
    pub rooms: BTreeMap<RoomId, String>,
}

impl Default for Credentials {
    fn default() -> Self {
        let rooms = [
            (RoomId::Sitting, "sit2025"),
            (RoomId::Dining, "din2025"),
            (RoomId::Study, "std2025"),
            (RoomId::Hallway, "hal2025"),
            (RoomId::Kitchen, "kit2025"),
            (RoomId::Veranda, "ver2025"),
        ]
        .into_iter()
        .map(|(room, password)| (room, password.to_string()))
        .collect();

        Self {
            master: "smart".to_string(),
            rooms,
        }
    }
}

/// Which rooms an unlock attempt opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockScope {
    /// The master credential matched; every room is now unlocked.
    AllRooms,
    /// The room's own credential matched; only that room is unlocked.
    Room(RoomId),
}

/// The owned state store for the whole panel.
///
/// Constructed explicitly (no ambient globals) so independent instances
/// can exist side by side, e.g. one per test.
pub struct Panel {
    credentials: Credentials,
    state: State,
}

impl Panel {
    /// Create a panel with every room locked and all-off.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            state: State::default(),
        }
    }

    /// Read-only view of the full panel state.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Read-only view of one room.
    pub fn room(&self, room: RoomId) -> &RoomState {
        self.state.room(room)
    }

    /// Attempt to unlock a room.
    ///
    /// The master credential unlocks every room at once; a room's own
    /// credential unlocks just that room. A failed attempt changes
    /// nothing. Unlocking never touches main or device values (locking
    /// resets them, so in practice an unlocked room starts all-off),
    /// and unlocking an already-unlocked room is an idempotent no-op.
    pub fn unlock(&mut self, room: RoomId, attempt: &str) -> Result<UnlockScope, PanelError> {
        if attempt == self.credentials.master {
            for r in RoomId::iter() {
                self.state.room_mut(r).unlocked = true;
            }
            debug!("master credential accepted, all rooms unlocked");
            return Ok(UnlockScope::AllRooms);
        }

        if self
            .credentials
            .rooms
            .get(&room)
            .is_some_and(|password| password == attempt)
        {
            self.state.room_mut(room).unlocked = true;
            debug!(%room, "room unlocked");
            Ok(UnlockScope::Room(room))
        } else {
            Err(PanelError::IncorrectPassword { room })
        }
    }

    /// Lock a room.
    ///
    /// Unconditional, and forces the main switch and every device off
    /// regardless of their current values: a locked room never reports
    /// anything as on.
    pub fn lock(&mut self, room: RoomId) {
        let rs = self.state.room_mut(room);
        rs.unlocked = false;
        rs.main_on = false;
        rs.set_all_devices(false);
        debug!(%room, "room locked and reset");
    }

    /// Set the room-wide main switch.
    ///
    /// Turning it off always succeeds and forces every device off.
    /// Turning it on is an all-or-nothing macro: it is rejected while
    /// any device is already on independently (the interlock, which
    /// avoids an ambiguous merged state), and otherwise turns every
    /// catalog device on.
    pub fn set_main(&mut self, room: RoomId, on: bool) -> Result<(), PanelError> {
        let rs = self.state.room_mut(room);
        if !rs.unlocked {
            return Err(PanelError::RoomLocked { room });
        }
        if on && rs.any_device_on() {
            return Err(PanelError::MainInterlock { room });
        }

        rs.main_on = on;
        rs.set_all_devices(on);
        debug!(%room, on, "main switch set");
        Ok(())
    }

    /// Set a single device.
    ///
    /// Never touches `main_on`: the main switch is a deliberate
    /// one-shot macro, not a value derived from device state. Devices
    /// do not control main. The single exception to that asymmetry is
    /// [`Panel::quick_toggle_light`].
    pub fn set_device(
        &mut self,
        room: RoomId,
        device: DeviceKind,
        on: bool,
    ) -> Result<(), PanelError> {
        let rs = self.state.room_mut(room);
        if !rs.unlocked {
            return Err(PanelError::RoomLocked { room });
        }
        // The device map holds exactly the catalog devices, so a missing
        // key is a device this room does not have.
        let Some(slot) = rs.devices.get_mut(&device) else {
            return Err(PanelError::UnsupportedDevice { room, device });
        };

        *slot = on;
        debug!(%room, %device, on, "device set");
        Ok(())
    }

    /// Double-activation shortcut: flip the room's light.
    ///
    /// After the flip, `main_on` is recomputed as "any device on". This
    /// deliberately diverges from [`Panel::set_device`], which leaves
    /// main alone: the shortcut is the one place device state reflects
    /// back into the main switch. Preserved as documented policy, not
    /// an accidental inconsistency to be unified.
    ///
    /// Returns the light's new state.
    pub fn quick_toggle_light(&mut self, room: RoomId) -> Result<bool, PanelError> {
        let rs = self.state.room_mut(room);
        if !rs.unlocked {
            return Err(PanelError::RoomLocked { room });
        }
        let Some(slot) = rs.devices.get_mut(&DeviceKind::Light) else {
            return Err(PanelError::UnsupportedDevice {
                room,
                device: DeviceKind::Light,
            });
        };

        *slot = !*slot;
        let light_on = *slot;
        let any_on = rs.any_device_on();
        rs.main_on = any_on;
        debug!(%room, light_on, main_on = any_on, "light quick-toggled");
        Ok(light_on)
    }

    /// Set the global security light. Independent of room locks; feeds
    /// only into the system-wide energy reading.
    pub fn set_security(&mut self, on: bool) {
        self.state.security_on = on;
        debug!(on, "security light set");
    }

    /// Handle one frontend command, returning the notifications to
    /// push.
    ///
    /// A successful mutation produces a snapshot and an energy reading
    /// for each affected room, followed by the system-wide reading. A
    /// failure produces the matching transient notice and nothing else,
    /// since state did not change.
    pub fn apply(&mut self, command: Command) -> Vec<Notification> {
        let mut out = Vec::new();

        match command {
            Command::Unlock { room, attempt } => match self.unlock(room, &attempt) {
                Ok(UnlockScope::AllRooms) => {
                    for r in RoomId::iter() {
                        self.push_room(r, &mut out);
                    }
                    self.push_system(&mut out);
                }
                Ok(UnlockScope::Room(r)) => {
                    self.push_room(r, &mut out);
                    self.push_system(&mut out);
                }
                Err(error) => {
                    debug!(%room, %error, "unlock rejected");
                    out.push(Notification::UnlockFailed { room });
                }
            },
            Command::Lock { room } => {
                self.lock(room);
                self.push_room(room, &mut out);
                self.push_system(&mut out);
            }
            Command::SetMain { room, on } => match self.set_main(room, on) {
                Ok(()) => {
                    self.push_room(room, &mut out);
                    self.push_system(&mut out);
                }
                Err(error) => {
                    let reason = match error {
                        PanelError::MainInterlock { .. } => BlockReason::MainInterlock,
                        _ => BlockReason::MainSwitchLocked,
                    };
                    debug!(%room, %error, "main switch rejected");
                    out.push(Notification::OperationBlocked { room, reason });
                }
            },
            Command::SetDevice { room, device, on } => match self.set_device(room, device, on) {
                Ok(()) => {
                    self.push_room(room, &mut out);
                    self.push_system(&mut out);
                }
                Err(error) => {
                    let reason = match error {
                        PanelError::UnsupportedDevice { .. } => BlockReason::UnsupportedDevice,
                        _ => BlockReason::DevicesLocked,
                    };
                    debug!(%room, %device, %error, "device toggle rejected");
                    out.push(Notification::OperationBlocked { room, reason });
                }
            },
            Command::QuickToggleLight { room } => match self.quick_toggle_light(room) {
                Ok(_) => {
                    self.push_room(room, &mut out);
                    self.push_system(&mut out);
                }
                // The shortcut is silently ignored on locked rooms and
                // rooms without a light, matching the double-click
                // behavior it models.
                Err(error) => debug!(%room, %error, "quick toggle ignored"),
            },
            Command::SetSecurity { on } => {
                self.set_security(on);
                self.push_system(&mut out);
            }
        }

        out
    }

    /// Initial render: a snapshot and reading for every room, then the
    /// system total. Emitted once at engine start so frontends begin
    /// from a known state.
    pub fn bootstrap_notifications(&self) -> Vec<Notification> {
        let mut out = Vec::new();
        for room in RoomId::iter() {
            self.push_room(room, &mut out);
        }
        self.push_system(&mut out);
        out
    }

    fn push_room(&self, room: RoomId, out: &mut Vec<Notification>) {
        out.push(Notification::RoomChanged {
            room,
            state: self.state.room(room).clone(),
        });
        let watts = energy::room_watts(&self.state, room);
        out.push(Notification::RoomEnergyChanged {
            room,
            watts,
            percent: energy::percent(watts),
        });
    }

    fn push_system(&self, out: &mut Vec<Notification>) {
        let watts = energy::system_watts(&self.state);
        out.push(Notification::SystemEnergyChanged {
            watts,
            percent: energy::percent(watts),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> Panel {
        Panel::new(Credentials::default())
    }

    fn unlocked_panel(room: RoomId) -> Panel {
        let mut p = panel();
        let password = p.credentials.rooms[&room].clone();
        p.unlock(room, &password).unwrap();
        p
    }

    #[test]
    fn wrong_password_fails_and_changes_nothing() {
        let mut p = panel();
        let before = p.state().clone();

        let result = p.unlock(RoomId::Study, "nope");
        assert_eq!(
            result,
            Err(PanelError::IncorrectPassword { room: RoomId::Study })
        );
        assert_eq!(p.state(), &before);
    }

    #[test]
    fn room_password_unlocks_only_that_room() {
        let mut p = panel();
        assert_eq!(
            p.unlock(RoomId::Study, "std2025"),
            Ok(UnlockScope::Room(RoomId::Study))
        );

        assert!(p.room(RoomId::Study).unlocked);
        for room in RoomId::iter().filter(|&r| r != RoomId::Study) {
            assert!(!p.room(room).unlocked);
            // A room's password never opens a different room.
            assert_eq!(
                p.unlock(room, "std2025"),
                Err(PanelError::IncorrectPassword { room })
            );
        }
    }

    #[test]
    fn master_password_unlocks_every_room() {
        let mut p = panel();
        assert_eq!(
            p.unlock(RoomId::Veranda, "smart"),
            Ok(UnlockScope::AllRooms)
        );
        for room in RoomId::iter() {
            assert!(p.room(room).unlocked);
        }
    }

    #[test]
    fn unlock_is_idempotent_and_preserves_device_state() {
        let mut p = unlocked_panel(RoomId::Sitting);
        p.set_device(RoomId::Sitting, DeviceKind::Fan, true).unwrap();

        p.unlock(RoomId::Sitting, "sit2025").unwrap();
        assert!(p.room(RoomId::Sitting).unlocked);
        assert!(p.room(RoomId::Sitting).device_on(DeviceKind::Fan));
    }

    #[test]
    fn lock_forces_everything_off() {
        let mut p = unlocked_panel(RoomId::Dining);
        p.set_main(RoomId::Dining, true).unwrap();
        assert!(p.room(RoomId::Dining).main_on);
        assert!(p.room(RoomId::Dining).any_device_on());

        p.lock(RoomId::Dining);
        let rs = p.room(RoomId::Dining);
        assert!(!rs.unlocked);
        assert!(!rs.main_on);
        assert!(!rs.any_device_on());
    }

    #[test]
    fn locked_room_rejects_every_mutation_unchanged() {
        let mut p = panel();
        let before = p.state().clone();

        assert_eq!(
            p.set_main(RoomId::Kitchen, true),
            Err(PanelError::RoomLocked { room: RoomId::Kitchen })
        );
        assert_eq!(
            p.set_device(RoomId::Kitchen, DeviceKind::Light, true),
            Err(PanelError::RoomLocked { room: RoomId::Kitchen })
        );
        assert_eq!(
            p.quick_toggle_light(RoomId::Kitchen),
            Err(PanelError::RoomLocked { room: RoomId::Kitchen })
        );
        assert_eq!(p.state(), &before);
    }

    #[test]
    fn main_on_is_rejected_while_an_appliance_is_on() {
        let mut p = unlocked_panel(RoomId::Sitting);
        p.set_device(RoomId::Sitting, DeviceKind::Ac, true).unwrap();
        let before = p.state().clone();

        assert_eq!(
            p.set_main(RoomId::Sitting, true),
            Err(PanelError::MainInterlock { room: RoomId::Sitting })
        );
        assert_eq!(p.state(), &before);
    }

    #[test]
    fn main_on_sets_every_catalog_device() {
        let mut p = unlocked_panel(RoomId::Study);
        p.set_main(RoomId::Study, true).unwrap();

        let rs = p.room(RoomId::Study);
        assert!(rs.main_on);
        for device in RoomId::Study.devices() {
            assert!(rs.device_on(*device));
        }
    }

    #[test]
    fn main_off_always_succeeds_and_clears_devices() {
        let mut p = unlocked_panel(RoomId::Study);
        p.set_device(RoomId::Study, DeviceKind::Fan, true).unwrap();

        // Off is allowed even though a device is on.
        p.set_main(RoomId::Study, false).unwrap();
        let rs = p.room(RoomId::Study);
        assert!(!rs.main_on);
        assert!(!rs.any_device_on());
    }

    #[test]
    fn device_toggles_never_touch_main() {
        let mut p = unlocked_panel(RoomId::Sitting);
        p.set_device(RoomId::Sitting, DeviceKind::Light, true)
            .unwrap();
        assert!(!p.room(RoomId::Sitting).main_on);

        p.set_device(RoomId::Sitting, DeviceKind::Light, false)
            .unwrap();
        assert!(!p.room(RoomId::Sitting).main_on);
    }

    #[test]
    fn device_off_after_main_on_leaves_main_on() {
        let mut p = unlocked_panel(RoomId::Study);
        p.set_main(RoomId::Study, true).unwrap();

        p.set_device(RoomId::Study, DeviceKind::Light, false)
            .unwrap();
        assert!(p.room(RoomId::Study).main_on);
    }

    #[test]
    fn unsupported_device_is_rejected() {
        let mut p = unlocked_panel(RoomId::Hallway);
        assert_eq!(
            p.set_device(RoomId::Hallway, DeviceKind::Fan, true),
            Err(PanelError::UnsupportedDevice {
                room: RoomId::Hallway,
                device: DeviceKind::Fan,
            })
        );
    }

    #[test]
    fn quick_toggle_flips_the_light_and_derives_main() {
        let mut p = unlocked_panel(RoomId::Veranda);

        assert_eq!(p.quick_toggle_light(RoomId::Veranda), Ok(true));
        assert!(p.room(RoomId::Veranda).device_on(DeviceKind::Light));
        assert!(p.room(RoomId::Veranda).main_on);

        assert_eq!(p.quick_toggle_light(RoomId::Veranda), Ok(false));
        assert!(!p.room(RoomId::Veranda).device_on(DeviceKind::Light));
        assert!(!p.room(RoomId::Veranda).main_on);
    }

    #[test]
    fn quick_toggle_off_keeps_main_if_another_device_is_on() {
        let mut p = unlocked_panel(RoomId::Sitting);
        p.set_device(RoomId::Sitting, DeviceKind::Fan, true).unwrap();
        p.quick_toggle_light(RoomId::Sitting).unwrap();
        assert!(p.room(RoomId::Sitting).main_on);

        // Light off, fan still on: derived main stays on.
        assert_eq!(p.quick_toggle_light(RoomId::Sitting), Ok(false));
        assert!(p.room(RoomId::Sitting).main_on);
    }

    #[test]
    fn security_light_ignores_locks() {
        let mut p = panel();
        p.set_security(true);
        assert!(p.state().security_on);
        assert_eq!(energy::system_watts(p.state()), 40);
    }

    #[test]
    fn study_scenario_end_to_end() {
        let mut p = panel();

        // Wrong password: locked, nothing changes.
        assert!(p.unlock(RoomId::Study, "wrong").is_err());
        assert!(!p.room(RoomId::Study).unlocked);

        // Correct password: unlocked, everything still off.
        p.unlock(RoomId::Study, "std2025").unwrap();
        assert!(p.room(RoomId::Study).unlocked);
        assert!(!p.room(RoomId::Study).any_device_on());

        // Main on: light, fan and ac all come on.
        p.set_main(RoomId::Study, true).unwrap();
        assert!(p.room(RoomId::Study).main_on);
        assert_eq!(energy::room_watts(p.state(), RoomId::Study), 1280);

        // A single device off leaves main on.
        p.set_device(RoomId::Study, DeviceKind::Light, false)
            .unwrap();
        assert!(p.room(RoomId::Study).main_on);
        assert_eq!(energy::room_watts(p.state(), RoomId::Study), 1260);

        // Main off: everything off.
        p.set_main(RoomId::Study, false).unwrap();
        assert!(!p.room(RoomId::Study).main_on);
        assert!(!p.room(RoomId::Study).any_device_on());
        assert_eq!(energy::room_watts(p.state(), RoomId::Study), 0);
    }

    #[test]
    fn apply_unlock_failure_emits_only_the_notice() {
        let mut p = panel();
        let notifications = p.apply(Command::Unlock {
            room: RoomId::Dining,
            attempt: "wrong".to_string(),
        });
        assert_eq!(
            notifications,
            vec![Notification::UnlockFailed { room: RoomId::Dining }]
        );
    }

    #[test]
    fn apply_master_unlock_renders_every_room() {
        let mut p = panel();
        let notifications = p.apply(Command::Unlock {
            room: RoomId::Sitting,
            attempt: "smart".to_string(),
        });

        // Snapshot and reading per room, then the system total.
        assert_eq!(notifications.len(), 13);
        assert!(matches!(
            notifications.last(),
            Some(Notification::SystemEnergyChanged { watts: 0, percent: 0 })
        ));
    }

    #[test]
    fn apply_blocked_main_emits_the_interlock_notice() {
        let mut p = unlocked_panel(RoomId::Sitting);
        p.set_device(RoomId::Sitting, DeviceKind::Light, true)
            .unwrap();

        let notifications = p.apply(Command::SetMain {
            room: RoomId::Sitting,
            on: true,
        });
        assert_eq!(
            notifications,
            vec![Notification::OperationBlocked {
                room: RoomId::Sitting,
                reason: BlockReason::MainInterlock,
            }]
        );
    }

    #[test]
    fn apply_locked_device_emits_the_locked_notice() {
        let mut p = panel();
        let notifications = p.apply(Command::SetDevice {
            room: RoomId::Veranda,
            device: DeviceKind::Light,
            on: true,
        });
        assert_eq!(
            notifications,
            vec![Notification::OperationBlocked {
                room: RoomId::Veranda,
                reason: BlockReason::DevicesLocked,
            }]
        );
    }

    #[test]
    fn apply_quick_toggle_on_locked_room_is_silent() {
        let mut p = panel();
        let before = p.state().clone();
        let notifications = p.apply(Command::QuickToggleLight { room: RoomId::Kitchen });
        assert!(notifications.is_empty());
        assert_eq!(p.state(), &before);
    }

    #[test]
    fn apply_set_device_emits_room_and_system_readings() {
        let mut p = unlocked_panel(RoomId::Sitting);
        let notifications = p.apply(Command::SetDevice {
            room: RoomId::Sitting,
            device: DeviceKind::Fan,
            on: true,
        });

        assert_eq!(notifications.len(), 3);
        match &notifications[0] {
            Notification::RoomChanged { room, state } => {
                assert_eq!(*room, RoomId::Sitting);
                assert!(state.device_on(DeviceKind::Fan));
                assert!(!state.main_on);
            }
            other => panic!("expected RoomChanged, got {other:?}"),
        }
        assert_eq!(
            notifications[1],
            Notification::RoomEnergyChanged {
                room: RoomId::Sitting,
                watts: 60,
                percent: 3,
            }
        );
        assert_eq!(
            notifications[2],
            Notification::SystemEnergyChanged {
                watts: 60,
                percent: 3,
            }
        );
    }

    #[test]
    fn apply_set_security_emits_only_the_system_reading() {
        let mut p = panel();
        let notifications = p.apply(Command::SetSecurity { on: true });
        assert_eq!(
            notifications,
            vec![Notification::SystemEnergyChanged {
                watts: 40,
                percent: 2,
            }]
        );
    }

    #[test]
    fn bootstrap_covers_every_room_and_the_system_total() {
        let p = panel();
        let notifications = p.bootstrap_notifications();
        assert_eq!(notifications.len(), 13);

        let rooms: Vec<RoomId> = notifications
            .iter()
            .filter_map(|n| match n {
                Notification::RoomChanged { room, .. } => Some(*room),
                _ => None,
            })
            .collect();
        assert_eq!(rooms, RoomId::iter().collect::<Vec<_>>());
    }
}
