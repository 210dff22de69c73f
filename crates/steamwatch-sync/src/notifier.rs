//! Notifier contract and its one-shot readiness handle.

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::NotifyError;

/// Delivers text messages to a single destination.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), NotifyError>;

    /// Release the session. Later sends fail with [`NotifyError::Closed`].
    async fn close(&self);
}

/// Resolves once the notifier has finished its handshake.
pub struct Readiness {
    rx: oneshot::Receiver<Result<(), NotifyError>>,
}

/// Sending half of a [`Readiness`].
pub struct ReadySignal {
    tx: oneshot::Sender<Result<(), NotifyError>>,
}

impl Readiness {
    pub fn channel() -> (ReadySignal, Readiness) {
        let (tx, rx) = oneshot::channel();
        (ReadySignal { tx }, Readiness { rx })
    }

    /// A handle that is already resolved as ready.
    pub fn ready() -> Self {
        let (signal, readiness) = Self::channel();
        signal.resolve(Ok(()));
        readiness
    }

    /// Wait for the handshake outcome. A signal dropped without resolving
    /// counts as a failed handshake.
    pub async fn wait(self) -> Result<(), NotifyError> {
        self.rx
            .await
            .unwrap_or_else(|_| Err(NotifyError::Handshake("readiness signal dropped".into())))
    }
}

impl ReadySignal {
    pub fn resolve(self, result: Result<(), NotifyError>) {
        // The waiter may already be gone; nothing to report then.
        let _ = self.tx.send(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolved_handle_is_ready() {
        assert!(Readiness::ready().wait().await.is_ok());
    }

    #[tokio::test]
    async fn waits_for_later_resolution() {
        let (signal, readiness) = Readiness::channel();
        let waiter = tokio::spawn(readiness.wait());
        tokio::task::yield_now().await;
        signal.resolve(Ok(()));
        assert!(waiter.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn failure_is_forwarded() {
        let (signal, readiness) = Readiness::channel();
        signal.resolve(Err(NotifyError::Handshake("bad token".into())));
        let err = readiness.wait().await.unwrap_err();
        assert!(matches!(err, NotifyError::Handshake(msg) if msg == "bad token"));
    }

    #[tokio::test]
    async fn dropped_signal_is_failure() {
        let (signal, readiness) = Readiness::channel();
        drop(signal);
        assert!(matches!(readiness.wait().await, Err(NotifyError::Handshake(_))));
    }
}
