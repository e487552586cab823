use std::sync::Arc;

use tokio::{signal, sync::watch};
use tracing::{info, warn};

/// Shared shutdown signal for the HTTP server and the scheduler.
///
/// Backed by a watch channel so a waiter that subscribes after `stop` was
/// called still returns immediately.
#[derive(Clone, Debug)]
pub struct StopFlag {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for StopFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl StopFlag {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        StopFlag {
            sender: Arc::new(sender),
        }
    }

    pub fn stop(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.sender.borrow()
    }

    pub async fn wait(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives in self, so the channel cannot close while we wait.
        let _ = receiver.wait_for(|stopped| *stopped).await;
    }
}

pub fn register_signal_handler(stop_flag: &StopFlag) {
    {
        let stop_flag = stop_flag.clone();
        tokio::spawn(async move {
            let _ = signal::ctrl_c().await;
            info!("Ctrl-C received, initiating graceful shutdown...");
            stop_flag.stop();
        });
    }
    #[cfg(unix)]
    {
        let stop_flag = stop_flag.clone();

        tokio::spawn(async move {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut terminate) => {
                    terminate.recv().await;
                    info!("Terminate signal received, initiating graceful shutdown...");
                    stop_flag.stop();
                }
                Err(e) => warn!("Failed to install terminate signal handler: {}", e),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_returns_after_stop() {
        let stop_flag = StopFlag::new();
        assert!(!stop_flag.is_stopped());

        let waiter = tokio::spawn({
            let stop_flag = stop_flag.clone();
            async move { stop_flag.wait().await }
        });

        stop_flag.stop();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(stop_flag.is_stopped());
    }

    #[tokio::test]
    async fn test_wait_after_stop_does_not_block() {
        let stop_flag = StopFlag::new();
        stop_flag.stop();
        tokio::time::timeout(Duration::from_secs(1), stop_flag.wait())
            .await
            .unwrap();
    }
}
