//! Line-oriented console frontend.
//!
//! Reads commands from stdin and forwards them to the engine; renders
//! notifications to the terminal. The console keeps a local mirror of
//! the panel built purely from the notifications it receives - it never
//! reaches into the core or recomputes readings - and renders `status`
//! and `dump` from that mirror.

use std::collections::BTreeMap;
use std::error::Error;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::warn;

use crate::catalog::DeviceKind;
use crate::catalog::RoomId;
use crate::engine::Command;
use crate::engine::CommandSender;
use crate::engine::Frontend;
use crate::engine::Notification;
use crate::engine::RoomState;

const HELP: &str = "\
commands:
  unlock <room> <password>      unlock a room (master unlocks all)
  lock <room>                   lock a room, switching everything off
  main <room> on|off            room-wide main switch
  device <room> <kind> on|off   toggle one device (light, fan, ac)
  toggle <room>                 quick-toggle the room light
  security on|off               global security light
  status                        show the panel
  dump                          dump the mirrored state as JSON
  help                          this text
rooms: sitting, dining, study, hallway, kitchen, veranda";

/// Last energy reading pushed by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
struct EnergyReading {
    watts: u32,
    percent: u8,
}

/// Mirror of one room, built from notifications.
#[derive(Debug, Clone, Serialize)]
struct RoomView {
    state: RoomState,
    energy: EnergyReading,
}

/// Everything the console knows about the panel.
///
/// Accumulated from notifications only, except `security_on`: the
/// engine pushes no dedicated security notification (only the system
/// reading moves), so the toggle's displayed position is owned by the
/// input side, like the checkbox it models.
#[derive(Debug, Clone, Default, Serialize)]
struct View {
    rooms: BTreeMap<RoomId, RoomView>,
    system: EnergyReading,
    security_on: bool,
}

impl View {
    fn apply(&mut self, notification: &Notification) {
        match notification {
            Notification::RoomChanged { room, state } => {
                // RoomChanged always precedes the room's first energy
                // reading, so inserting here is sufficient.
                self.rooms
                    .entry(*room)
                    .and_modify(|view| view.state = state.clone())
                    .or_insert_with(|| RoomView {
                        state: state.clone(),
                        energy: EnergyReading::default(),
                    });
            }
            Notification::RoomEnergyChanged {
                room,
                watts,
                percent,
            } => {
                if let Some(view) = self.rooms.get_mut(room) {
                    view.energy = EnergyReading {
                        watts: *watts,
                        percent: *percent,
                    };
                }
            }
            Notification::SystemEnergyChanged { watts, percent } => {
                self.system = EnergyReading {
                    watts: *watts,
                    percent: *percent,
                };
            }
            Notification::UnlockFailed { .. } | Notification::OperationBlocked { .. } => {}
        }
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

/// Render the mirrored panel as one line per room plus the system
/// total.
fn render_status(view: &View) -> String {
    let mut lines = Vec::new();
    for (room, room_view) in &view.rooms {
        let devices = room_view
            .state
            .devices
            .iter()
            .map(|(device, on)| format!("{}={}", device, on_off(*on)))
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(format!(
            "{:<12} {:<8} main={} {} {}W ({}%)",
            room.title(),
            if room_view.state.unlocked {
                "unlocked"
            } else {
                "locked"
            },
            on_off(room_view.state.main_on),
            devices,
            room_view.energy.watts,
            room_view.energy.percent,
        ));
    }
    lines.push(format!(
        "system: {}W ({}%), security {}",
        view.system.watts,
        view.system.percent,
        on_off(view.security_on),
    ));
    lines.join("\n")
}

/// A parsed console input line.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Command(Command),
    Status,
    Dump,
    Help,
}

fn parse_room(word: &str) -> Result<RoomId, String> {
    word.parse()
        .map_err(|_| format!("unknown room '{word}', try 'help'"))
}

fn parse_device(word: &str) -> Result<DeviceKind, String> {
    word.parse()
        .map_err(|_| format!("unknown device '{word}', expected light, fan or ac"))
}

fn parse_on_off(word: &str) -> Result<bool, String> {
    match word {
        "on" => Ok(true),
        "off" => Ok(false),
        other => Err(format!("expected 'on' or 'off', got '{other}'")),
    }
}

fn parse_line(line: &str) -> Result<Input, String> {
    let mut words = line.split_whitespace();
    let verb = words.next().ok_or_else(|| "empty command".to_string())?;
    let mut arg = |usage: &str| {
        words
            .next()
            .ok_or_else(|| format!("usage: {usage}"))
            .map(str::to_string)
    };

    let input = match verb {
        "unlock" => {
            let usage = "unlock <room> <password>";
            let room = parse_room(&arg(usage)?)?;
            let attempt = arg(usage)?;
            Input::Command(Command::Unlock { room, attempt })
        }
        "lock" => {
            let room = parse_room(&arg("lock <room>")?)?;
            Input::Command(Command::Lock { room })
        }
        "main" => {
            let usage = "main <room> on|off";
            let room = parse_room(&arg(usage)?)?;
            let on = parse_on_off(&arg(usage)?)?;
            Input::Command(Command::SetMain { room, on })
        }
        "device" => {
            let usage = "device <room> <kind> on|off";
            let room = parse_room(&arg(usage)?)?;
            let device = parse_device(&arg(usage)?)?;
            let on = parse_on_off(&arg(usage)?)?;
            Input::Command(Command::SetDevice { room, device, on })
        }
        "toggle" => {
            let room = parse_room(&arg("toggle <room>")?)?;
            Input::Command(Command::QuickToggleLight { room })
        }
        "security" => {
            let on = parse_on_off(&arg("security on|off")?)?;
            Input::Command(Command::SetSecurity { on })
        }
        "status" => Input::Status,
        "dump" => Input::Dump,
        "help" => Input::Help,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };

    if words.next().is_some() {
        return Err(format!("too many arguments for '{verb}'"));
    }
    Ok(input)
}

/// Console frontend: stdin in, terminal out.
pub struct ConsoleFrontend {
    view: Arc<Mutex<View>>,
    reader: Option<JoinHandle<()>>,
}

impl ConsoleFrontend {
    pub fn new() -> Self {
        Self {
            view: Arc::new(Mutex::new(View::default())),
            reader: None,
        }
    }
}

impl Default for ConsoleFrontend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Frontend for ConsoleFrontend {
    fn name(&self) -> &str {
        "console"
    }

    async fn setup(&mut self, tx: CommandSender) -> Result<(), Box<dyn Error + Send>> {
        println!("{HELP}");

        let view = Arc::clone(&self.view);
        let handle = tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        match parse_line(line) {
                            Ok(Input::Command(command)) => {
                                let security = match &command {
                                    Command::SetSecurity { on } => Some(*on),
                                    _ => None,
                                };
                                if tx.send(command).await.is_err() {
                                    debug!("engine command channel closed");
                                    break;
                                }
                                if let (Some(on), Ok(mut view)) = (security, view.lock()) {
                                    view.security_on = on;
                                }
                            }
                            Ok(Input::Status) => {
                                if let Ok(view) = view.lock() {
                                    println!("{}", render_status(&view));
                                }
                            }
                            Ok(Input::Dump) => {
                                let dump = view
                                    .lock()
                                    .ok()
                                    .map(|view| serde_json::to_string_pretty(&*view));
                                match dump {
                                    Some(Ok(json)) => println!("{json}"),
                                    Some(Err(e)) => warn!("failed to serialize view: {}", e),
                                    None => {}
                                }
                            }
                            Ok(Input::Help) => println!("{HELP}"),
                            Err(message) => println!("{message}"),
                        }
                    }
                    Ok(None) => {
                        debug!("stdin closed");
                        break;
                    }
                    Err(e) => {
                        warn!("failed to read stdin: {}", e);
                        break;
                    }
                }
            }
        });
        self.reader = Some(handle);

        Ok(())
    }

    async fn handle_notification(
        &mut self,
        notification: Notification,
    ) -> Result<(), Box<dyn Error + Send>> {
        match &notification {
            Notification::UnlockFailed { room } => {
                println!("{}: Incorrect password.", room.title());
            }
            Notification::OperationBlocked { room, reason } => {
                println!("{}: {}", room.title(), reason);
            }
            // Routine renders update the mirror silently; the user asks
            // for them with `status`.
            _ => {}
        }

        if let Ok(mut view) = self.view.lock() {
            view.apply(&notification);
        }
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), Box<dyn Error + Send>> {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        Ok(())
    }
}
