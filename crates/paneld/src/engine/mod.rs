mod engine;
pub mod energy;
mod error;
mod event;
mod frontend;
mod message;
mod panel;
pub mod state;

pub use engine::Engine;
pub use error::PanelError;
pub use event::BlockReason;
pub use event::Notification;
pub use frontend::CommandReceiver;
pub use frontend::CommandSender;
pub use frontend::Frontend;
pub use frontend::NotificationSender;
pub use message::Command;
pub use panel::Credentials;
pub use panel::Panel;
pub use panel::UnlockScope;
pub use state::RoomState;
pub use state::State;
