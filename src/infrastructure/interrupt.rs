//! # Abort Signal
//!
//! Operator interruption (Ctrl-C) shared between the signal listener, the conversation
//! loop and long-running tools. Backed by a `watch` channel so waiters wake immediately.

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct AbortSignal {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for AbortSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl AbortSignal {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn reset(&self) {
        self.tx.send_replace(false);
    }

    pub fn is_aborted(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the signal is set. Returns immediately if it already is.
    pub async fn aborted(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|set| *set).await.is_err() {
            // Sender gone: nobody can abort any more.
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_wakes_waiter() {
        let signal = AbortSignal::new();
        let waiter = signal.clone();
        let handle = tokio::spawn(async move { waiter.aborted().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        signal.trigger();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(signal.is_aborted());
    }

    #[tokio::test]
    async fn test_reset_clears_the_flag() {
        let signal = AbortSignal::new();
        signal.trigger();
        signal.aborted().await;
        signal.reset();
        assert!(!signal.is_aborted());

        let pending = tokio::time::timeout(Duration::from_millis(20), signal.aborted()).await;
        assert!(pending.is_err());
    }
}
