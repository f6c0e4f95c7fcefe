//! Process-wide Ctrl-C listener.
//!
//! The first `tokio::signal::ctrl_c()` call replaces the default SIGINT
//! action for the rest of the process, so the listener is installed once at
//! startup and every later wait goes through [`Interrupts`].

use tokio::sync::watch;

/// Counts Ctrl-C presses. Cloned handles each see every press that happens
/// after they last returned from [`Interrupts::recv`].
#[derive(Clone)]
pub struct Interrupts {
    rx: watch::Receiver<u64>,
}

impl Interrupts {
    /// Spawn the listener task. Must be called from inside a Tokio runtime.
    pub fn listen() -> Self {
        let (tx, rx) = watch::channel(0u64);
        tokio::spawn(async move {
            loop {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    log::error!("[Interrupts] cannot listen for Ctrl-C: {}", e);
                    break;
                }
                log::debug!("[Interrupts] Ctrl-C");
                tx.send_modify(|n| *n += 1);
            }
        });
        Self { rx }
    }

    /// Interrupts fed from `rx` instead of the OS signal.
    pub fn from_watch(rx: watch::Receiver<u64>) -> Self {
        Self { rx }
    }

    /// Resolves on the next press. Never resolves once the listener is gone.
    pub async fn recv(&mut self) {
        if self.rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn each_press_is_seen_once() {
        let (tx, rx) = watch::channel(0u64);
        let mut interrupts = Interrupts::from_watch(rx);

        tx.send_modify(|n| *n += 1);
        timeout(Duration::from_millis(100), interrupts.recv())
            .await
            .expect("press is delivered");
        assert!(timeout(Duration::from_millis(50), interrupts.recv())
            .await
            .is_err());

        tx.send_modify(|n| *n += 1);
        timeout(Duration::from_millis(100), interrupts.recv())
            .await
            .expect("second press is delivered");
    }

    #[tokio::test]
    async fn closed_listener_never_fires() {
        let (tx, rx) = watch::channel(0u64);
        let mut interrupts = Interrupts::from_watch(rx);
        drop(tx);
        assert!(timeout(Duration::from_millis(50), interrupts.recv())
            .await
            .is_err());
    }
}
