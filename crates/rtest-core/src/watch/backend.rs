//! Watch mechanism backends
//!
//! [`WatchBackend`] is the only capability the rest of the crate needs from
//! the OS watcher: add one directory. Events and errors flow the other way,
//! through the two channels in [`WatchStreams`].

use std::path::Path;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::{
    event::{self, RawEvent},
    Error, Result,
};

/// Capacity of the event channel between the OS watcher and the event loop.
///
/// When a long test run stalls the loop, notifications queue here; once it
/// is full the watcher thread blocks until the loop catches up.
pub const EVENT_BUFFER: usize = 1024;

/// Something that can start watching a directory
pub trait WatchBackend {
    /// Register `dir` non-recursively.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WatchRegistration`] if the mechanism rejects the path.
    fn add(&mut self, dir: &Path) -> Result<()>;
}

/// Receiving ends of a watcher: raw events and fatal watcher errors
#[derive(Debug)]
pub struct WatchStreams {
    pub events: mpsc::Receiver<RawEvent>,
    pub errors: mpsc::Receiver<String>,
}

/// Watch backend built on `notify`'s platform watcher.
///
/// Dropping it releases every OS watch it holds.
pub struct NotifyWatcher {
    inner: RecommendedWatcher,
}

impl NotifyWatcher {
    /// Create the OS watcher and the streams it feeds.
    ///
    /// # Errors
    ///
    /// Returns error if the platform watcher cannot be created (for example
    /// when the inotify instance limit is reached).
    pub fn new() -> Result<(Self, WatchStreams)> {
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        let (error_tx, error_rx) = mpsc::channel(1);

        let inner = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(ev) => {
                    // Receiver gone means the event loop ended; nothing to do
                    for raw in event::from_notify(ev) {
                        if event_tx.blocking_send(raw).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => {
                    let _ = error_tx.blocking_send(e.to_string());
                }
            },
        )
        .map_err(|e| Error::io_error(format!("failed to create watcher: {e}")))?;

        Ok((
            Self { inner },
            WatchStreams {
                events: event_rx,
                errors: error_rx,
            },
        ))
    }
}

impl WatchBackend for NotifyWatcher {
    fn add(&mut self, dir: &Path) -> Result<()> {
        self.inner
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| Error::watch_registration(dir, e))
    }
}

impl std::fmt::Debug for NotifyWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyWatcher").finish_non_exhaustive()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════
