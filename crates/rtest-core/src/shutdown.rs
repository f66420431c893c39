//! Shutdown on SIGINT/SIGTERM.
//!
//! Aborting the tracked tasks drops everything they own: the OS watcher is
//! released and an in-flight test run is killed. Nothing waits for a run to
//! finish.

use std::time::Duration;

use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};

use crate::Result;

/// Tracks the long-running tasks that must stop on shutdown
pub struct ShutdownCoordinator {
    /// Tracking all spawned tasks that need cleanup
    tasks: Mutex<Vec<JoinHandle<()>>>,
    /// How long to wait for aborted tasks to unwind
    shutdown_timeout: Duration,
}

impl ShutdownCoordinator {
    pub fn new(shutdown_timeout: Duration) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            shutdown_timeout,
        }
    }

    /// Register a task for cleanup on shutdown
    pub async fn register_task(&self, task: JoinHandle<()>) {
        self.tasks.lock().await.push(task);
    }

    pub async fn task_count(&self) -> usize {
        self.tasks.lock().await.len()
    }

    /// Abort every registered task and wait for them to unwind.
    ///
    /// Returns how many tasks were still running when shutdown began.
    pub async fn shutdown(&self) -> usize {
        let tasks: Vec<_> = self.tasks.lock().await.drain(..).collect();
        let running = tasks.iter().filter(|task| !task.is_finished()).count();
        tasks.iter().for_each(JoinHandle::abort);

        let unwind = join_all(tasks);
        if tokio::time::timeout(self.shutdown_timeout, unwind).await.is_err() {
            tracing::warn!("Shutdown timeout exceeded, exiting anyway");
        }
        running
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

async fn join_all(tasks: Vec<JoinHandle<()>>) {
    for task in tasks {
        // Cancelled is the expected outcome
        let _ = task.await;
    }
}

/// Create signal channels for SIGINT and SIGTERM
///
/// Returns receivers that will receive a value when the signal is detected
pub async fn signal_channels() -> Result<(broadcast::Receiver<()>, broadcast::Receiver<()>)> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())
            .map_err(|e| crate::Error::io_error(format!("Failed to setup SIGINT: {e}")))?;
        let mut sigterm = signal(SignalKind::terminate())
            .map_err(|e| crate::Error::io_error(format!("Failed to setup SIGTERM: {e}")))?;

        let (sigint_tx, sigint_rx) = broadcast::channel(1);
        let (sigterm_tx, sigterm_rx) = broadcast::channel(1);

        // Spawn tasks to forward signals to the channels
        tokio::spawn(async move {
            let _ = sigint.recv().await;
            tracing::debug!("Received SIGINT");
            let _ = sigint_tx.send(());
        });

        tokio::spawn(async move {
            let _ = sigterm.recv().await;
            tracing::debug!("Received SIGTERM");
            let _ = sigterm_tx.send(());
        });

        Ok((sigint_rx, sigterm_rx))
    }

    #[cfg(not(unix))]
    {
        // On non-Unix platforms, use Ctrl-C
        let (sigint_tx, sigint_rx) = broadcast::channel(1);
        let (sigterm_tx, sigterm_rx) = broadcast::channel(1);

        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::debug!("Received Ctrl-C");
            let _ = sigint_tx.send(());
            // On non-Unix, treat both the same
            let _ = sigterm_tx.send(());
        });

        Ok((sigint_rx, sigterm_rx))
    }
}
