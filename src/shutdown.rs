use tokio::sync::watch;
use tracing::info;

/// Broadcasts a single "stop" signal to the control loop.
///
/// Triggered by Ctrl-C / SIGTERM through `listen_for_signals`, or directly
/// through `trigger` (tests, embedding).
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
    sender: watch::Sender<bool>,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            receiver: self.sender.subscribe(),
        }
    }

    /// Spawn a task that triggers shutdown on SIGINT/SIGTERM
    pub fn listen_for_signals(&self) {
        let coordinator = self.clone();
        tokio::spawn(async move {
            wait_for_signal().await;
            info!("Shutdown signal received");
            coordinator.trigger();
        });
    }
}

/// Receiving half handed to the control loop
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn is_triggered(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once shutdown has been triggered
    pub async fn recv(&mut self) {
        // A closed channel means the coordinator is gone; treat it as shutdown
        let _ = self.receiver.wait_for(|stop| *stop).await;
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!("Failed to install SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_wakes_subscriber() {
        let coordinator = ShutdownCoordinator::new();
        let mut signal = coordinator.subscribe();
        assert!(!signal.is_triggered());

        coordinator.trigger();
        signal.recv().await;

        assert!(signal.is_triggered());
        assert!(coordinator.is_triggered());
    }
}
