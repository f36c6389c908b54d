//! Shutdown handling
//!
//! SIGINT and SIGTERM trip a [`ShutdownSignal`]; the poll loop checks it before
//! every health check and races it against every sleep.

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use tokio::sync::broadcast;
use tracing::{info, warn};

/// Shutdown signal sender and receiver
#[derive(Clone)]
pub struct ShutdownSignal {
    sender: broadcast::Sender<()>,
    triggered: Arc<AtomicBool>,
}

impl ShutdownSignal {
    /// Create a new shutdown signal with a broadcast channel
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            sender,
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a receiver for shutdown notifications
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Trigger shutdown
    pub fn shutdown(&self) {
        self.triggered.store(true, Ordering::SeqCst);
        let _ = self.sender.send(());
    }

    /// Whether shutdown has been triggered, including before any subscriber
    /// existed
    pub fn is_shutdown(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Signal {
    Interrupt,
    Terminate,
}

/// Wait for whichever signal arrives first. If the SIGINT handler cannot be
/// installed, SIGTERM still ends the wait.
async fn wait_for_signal<C, T>(ctrl_c: C, terminate: T) -> Signal
where
    C: Future<Output = io::Result<()>>,
    T: Future,
{
    tokio::pin!(terminate);

    tokio::select! {
        result = ctrl_c => match result {
            Ok(()) => return Signal::Interrupt,
            Err(e) => warn!(error = %e, "Unable to listen for SIGINT, waiting for SIGTERM only"),
        },
        _ = &mut terminate => return Signal::Terminate,
    }

    terminate.await;
    Signal::Terminate
}

/// Install the SIGINT/SIGTERM handlers and return the signal they trigger
pub fn listen_for_shutdown_signal() -> io::Result<ShutdownSignal> {
    let shutdown = ShutdownSignal::new();
    let shutdown_clone = shutdown.clone();

    #[cfg(unix)]
    let mut terminate =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    tokio::spawn(async move {
        #[cfg(unix)]
        let terminate = terminate.recv();

        #[cfg(not(unix))]
        let terminate = std::future::pending::<Option<()>>();

        match wait_for_signal(tokio::signal::ctrl_c(), terminate).await {
            Signal::Interrupt => info!("Received SIGINT"),
            Signal::Terminate => info!("Received SIGTERM"),
        }

        shutdown_clone.shutdown();
    });

    Ok(shutdown)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_shutdown_signal() {
        let signal = ShutdownSignal::new();
        let mut rx = signal.subscribe();
        assert!(!signal.is_shutdown());

        signal.shutdown();

        assert!(rx.recv().await.is_ok());
        assert!(signal.is_shutdown());
    }

    #[tokio::test]
    async fn test_shutdown_before_subscribe_is_visible() {
        let signal = ShutdownSignal::new();
        signal.shutdown();

        let clone = signal.clone();
        assert!(clone.is_shutdown());
    }

    #[tokio::test]
    async fn test_interrupt() {
        let signal = wait_for_signal(async { Ok(()) }, std::future::pending::<()>()).await;
        assert_eq!(signal, Signal::Interrupt);
    }

    #[tokio::test]
    async fn test_failed_interrupt_handler_keeps_waiting_for_terminate() {
        let ctrl_c = async { Err(io::Error::other("signal handler unavailable")) };
        let waited = tokio::time::timeout(
            Duration::from_millis(50),
            wait_for_signal(ctrl_c, std::future::pending::<()>()),
        )
        .await;
        assert!(waited.is_err());

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let ctrl_c = async { Err(io::Error::other("signal handler unavailable")) };
        let waiter = tokio::spawn(wait_for_signal(ctrl_c, rx));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        tx.send(()).unwrap();
        assert_eq!(waiter.await.unwrap(), Signal::Terminate);
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let signal = ShutdownSignal::new();
        let mut rx1 = signal.subscribe();
        let mut rx2 = signal.subscribe();

        signal.shutdown();

        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
    }
}
