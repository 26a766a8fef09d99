use std::error::Error;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::event::Notification;
use super::message::Command;

/// Channel types for commands FROM frontends TO the engine.
/// Bounded to provide backpressure on chatty frontends.
pub type CommandSender = mpsc::Sender<Command>;
pub type CommandReceiver = mpsc::Receiver<Command>;

/// Channel type for notifications FROM the engine TO frontends
/// (unbounded - the engine must not block mid-transition).
pub type NotificationSender = mpsc::UnboundedSender<Notification>;

/// Presentation adapter seam.
///
/// A frontend renders state and forwards user input. It never mutates
/// panel state directly: the panel is single-writer, and frontends only
/// ever see the snapshots and readings carried by notifications. The
/// engine pushes every notification to every registered frontend.
#[async_trait]
pub trait Frontend: Send + Sync {
    /// Name of this frontend for logging.
    fn name(&self) -> &str;

    /// Set up the frontend.
    ///
    /// The sender is for forwarding user commands to the engine
    /// (unlock attempts, toggles, etc.).
    async fn setup(&mut self, tx: CommandSender) -> Result<(), Box<dyn Error + Send>>;

    /// Render one state-change notification.
    async fn handle_notification(
        &mut self,
        notification: Notification,
    ) -> Result<(), Box<dyn Error + Send>>;

    /// Shut down the frontend gracefully.
    async fn shutdown(&mut self) -> Result<(), Box<dyn Error + Send>>;
}
