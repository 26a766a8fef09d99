pub mod catalog;
pub mod config;
pub mod engine;
pub mod frontends;

pub use catalog::DeviceKind;
pub use catalog::RoomId;
pub use config::Config;
pub use config::LogLevel;
pub use engine::BlockReason;
pub use engine::Command;
pub use engine::Credentials;
pub use engine::Engine;
pub use engine::Frontend;
pub use engine::Notification;
pub use engine::Panel;
pub use engine::PanelError;
pub use engine::RoomState;
pub use engine::State;
pub use engine::UnlockScope;
