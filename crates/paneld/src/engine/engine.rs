use std::error::Error;

use tokio::sync::mpsc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::event::Notification;
use super::frontend::CommandReceiver;
use super::frontend::CommandSender;
use super::frontend::Frontend;
use super::frontend::NotificationSender;
use super::panel::Panel;
use super::state::State;

/// Capacity for the frontend→engine command channel.
/// Provides backpressure when frontends send faster than the engine can
/// apply transitions.
const COMMAND_CHANNEL_SIZE: usize = 1024;

/// paneld engine
///
/// Owns the panel core and the channel plumbing around it. Commands
/// from every frontend arrive on a single queue and are applied one at
/// a time; the resulting notifications fan out to every registered
/// frontend. Because the loop takes the next command only after the
/// previous one has been applied and its notifications queued,
/// transitions never interleave.
pub struct Engine {
    /// The single-writer state store.
    panel: std::sync::Mutex<Panel>,

    /// Receive commands from frontends
    command_rx: Mutex<CommandReceiver>,

    /// Sender handed to frontends (and tests) for injecting commands
    command_tx: CommandSender,

    /// Notification channels, one per registered frontend
    frontend_channels: Vec<NotificationSender>,

    /// Handles for frontend tasks
    frontend_handles: Vec<JoinHandle<()>>,
}

impl Engine {
    /// Create an engine around a panel.
    pub fn new(panel: Panel) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        Self {
            panel: std::sync::Mutex::new(panel),
            command_rx: Mutex::new(command_rx),
            command_tx,
            frontend_channels: Vec::new(),
            frontend_handles: Vec::new(),
        }
    }

    /// A sender for injecting commands, e.g. from tests or embedding
    /// code that is not a full [`Frontend`].
    pub fn command_sender(&self) -> CommandSender {
        self.command_tx.clone()
    }

    /// Register a frontend with the engine.
    ///
    /// This spawns the frontend in a background task, wires up its
    /// channels, and starts its setup process.
    pub fn register_frontend(&mut self, mut frontend: Box<dyn Frontend>) {
        let (notification_tx, mut notification_rx) = mpsc::unbounded_channel();
        let command_tx = self.command_tx.clone();
        self.frontend_channels.push(notification_tx);

        let handle = tokio::spawn(async move {
            let name = frontend.name().to_string();

            if let Err(e) = frontend.setup(command_tx).await {
                warn!("frontend '{}' setup failed: {}", name, e);
                return;
            }

            while let Some(notification) = notification_rx.recv().await {
                if let Err(e) = frontend.handle_notification(notification).await {
                    warn!("frontend '{}' failed to render notification: {}", name, e);
                }
            }

            if let Err(e) = frontend.shutdown().await {
                warn!("frontend '{}' shutdown failed: {}", name, e);
            }
        });

        self.frontend_handles.push(handle);
    }

    /// Run the engine's main event loop.
    ///
    /// Emits the initial render, then applies commands one at a time
    /// and pushes the resulting notifications to every frontend.
    pub async fn run(&self) -> Result<(), Box<dyn Error + Send>> {
        info!("engine starting");

        let bootstrap = self.with_panel(|panel| panel.bootstrap_notifications())?;
        self.broadcast(bootstrap);

        let mut rx = self.command_rx.lock().await;
        while let Some(command) = rx.recv().await {
            debug!(?command, "applying command");
            let notifications = self.with_panel(|panel| panel.apply(command))?;
            self.broadcast(notifications);
        }

        info!("engine shutting down");
        Ok(())
    }

    /// Get a snapshot of the current panel state.
    pub fn state_snapshot(&self) -> Result<State, Box<dyn Error + Send>> {
        self.with_panel(|panel| panel.state().clone())
    }

    fn with_panel<T>(&self, f: impl FnOnce(&mut Panel) -> T) -> Result<T, Box<dyn Error + Send>> {
        let mut panel = self.panel.lock().map_err(|e| -> Box<dyn Error + Send> {
            Box::new(std::io::Error::other(e.to_string()))
        })?;
        Ok(f(&mut panel))
    }

    fn broadcast(&self, notifications: Vec<Notification>) {
        for notification in notifications {
            for tx in &self.frontend_channels {
                // A closed channel means the frontend task exited early;
                // the remaining frontends still get the notification.
                let _ = tx.send(notification.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time::timeout;

    use super::*;
    use crate::catalog::RoomId;
    use crate::engine::Command;
    use crate::engine::Credentials;

    /// Frontend that forwards every notification to a test channel.
    struct RecordingFrontend {
        tx: mpsc::UnboundedSender<Notification>,
    }

    #[async_trait]
    impl Frontend for RecordingFrontend {
        fn name(&self) -> &str {
            "recording"
        }

        async fn setup(&mut self, _tx: CommandSender) -> Result<(), Box<dyn Error + Send>> {
            Ok(())
        }

        async fn handle_notification(
            &mut self,
            notification: Notification,
        ) -> Result<(), Box<dyn Error + Send>> {
            let _ = self.tx.send(notification);
            Ok(())
        }

        async fn shutdown(&mut self) -> Result<(), Box<dyn Error + Send>> {
            Ok(())
        }
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<Notification>) -> Notification {
        timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for notification")
            .expect("notification channel closed")
    }

    #[tokio::test]
    async fn commands_flow_through_to_frontends() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut engine = Engine::new(Panel::new(Credentials::default()));
        engine.register_frontend(Box::new(RecordingFrontend { tx }));

        let commands = engine.command_sender();
        let engine = Arc::new(engine);
        let runner = {
            let engine = engine.clone();
            tokio::spawn(async move {
                let _ = engine.run().await;
            })
        };

        // Bootstrap render: a snapshot and a reading per room, then the
        // system total.
        let mut bootstrap = Vec::new();
        for _ in 0..13 {
            bootstrap.push(next(&mut rx).await);
        }
        assert!(matches!(
            bootstrap.last(),
            Some(Notification::SystemEnergyChanged { watts: 0, .. })
        ));

        commands
            .send(Command::Unlock {
                room: RoomId::Study,
                attempt: "std2025".to_string(),
            })
            .await
            .unwrap();

        match next(&mut rx).await {
            Notification::RoomChanged { room, state } => {
                assert_eq!(room, RoomId::Study);
                assert!(state.unlocked);
            }
            other => panic!("expected RoomChanged, got {other:?}"),
        }
        assert!(matches!(
            next(&mut rx).await,
            Notification::RoomEnergyChanged { room: RoomId::Study, watts: 0, .. }
        ));
        assert!(matches!(
            next(&mut rx).await,
            Notification::SystemEnergyChanged { watts: 0, .. }
        ));

        let snapshot = engine.state_snapshot().unwrap();
        assert!(snapshot.room(RoomId::Study).unlocked);

        runner.abort();
    }

    #[tokio::test]
    async fn failed_unlock_reaches_frontends_as_a_notice() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut engine = Engine::new(Panel::new(Credentials::default()));
        engine.register_frontend(Box::new(RecordingFrontend { tx }));

        let commands = engine.command_sender();
        let engine = Arc::new(engine);
        let runner = {
            let engine = engine.clone();
            tokio::spawn(async move {
                let _ = engine.run().await;
            })
        };

        for _ in 0..13 {
            next(&mut rx).await;
        }

        commands
            .send(Command::Unlock {
                room: RoomId::Hallway,
                attempt: "wrong".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(
            next(&mut rx).await,
            Notification::UnlockFailed { room: RoomId::Hallway }
        );

        runner.abort();
    }
}
