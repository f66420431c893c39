//! Event dispatch
//!
//! The event loop takes one [`RawEvent`] at a time, throttles it, and maps
//! what survives to one unit of work:
//!
//! - `Create` of a directory: watch it before the next event is read, so
//!   nothing inside it can be missed.
//! - `Create` of a file, or `Write`: run the tests of its directory.
//! - anything named `vendor`: nothing.
//! - `Remove`, `Rename`, `Chmod`: nothing.
//!
//! A test run blocks the loop until it finishes. Every error ends the loop.

use std::path::{Path, PathBuf};

use tokio::time::Instant;

use crate::{
    event::{OpKind, RawEvent},
    runner::TestRunner,
    throttle::ThrottleTable,
    watch::{is_excluded, WatchBackend, WatchSet, WatchStreams},
    Error, Result,
};

// ═══════════════════════════════════════════════════════════════════════════
// TYPES
// ═══════════════════════════════════════════════════════════════════════════

/// What handling one event amounted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Same path and operation seen within the throttle window
    Suppressed,
    /// Operation or path that never leads to work
    Ignored,
    /// New directory added to the watch set
    Watched(PathBuf),
    /// Tests ran in this directory
    Tested(PathBuf),
    /// File edit that is not a source file
    NotSource(PathBuf),
}

/// Owns the watch set and throttle table for the life of the event loop
#[derive(Debug)]
pub struct Dispatcher<B, R> {
    watch_set: WatchSet<B>,
    throttle: ThrottleTable,
    runner: R,
}

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

impl<B, R> Dispatcher<B, R>
where
    B: WatchBackend,
    R: TestRunner,
{
    pub fn new(watch_set: WatchSet<B>, runner: R) -> Self {
        Self {
            watch_set,
            throttle: ThrottleTable::new(),
            runner,
        }
    }

    pub const fn watch_set(&self) -> &WatchSet<B> {
        &self.watch_set
    }

    /// Throttle and dispatch one event, running tests to completion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Stat`] if a created entry vanished before it could be
    /// inspected, [`Error::WatchRegistration`] if a new directory cannot be
    /// watched, and [`Error::ProcessLaunch`] if the test command cannot start.
    pub async fn handle(&mut self, event: RawEvent) -> Result<Dispatch> {
        tracing::debug!(
            path = %event.path.display(),
            op = %event.op,
            queued_ms = u64::try_from(event.received_at.elapsed().as_millis()).unwrap_or(u64::MAX),
            "watcher event"
        );

        if !self.throttle.admit(&event, Instant::now()) {
            tracing::debug!(path = %event.path.display(), "skipping event, less than 800ms");
            return Ok(Dispatch::Suppressed);
        }

        match event.op {
            OpKind::Create => self.on_create(&event.path).await,
            OpKind::Write => self.test_file(&event.path).await,
            // Watches on removed directories expire on their own
            OpKind::Remove | OpKind::Rename | OpKind::Chmod => Ok(Dispatch::Ignored),
        }
    }

    /// Consume both watcher streams until the event stream closes.
    ///
    /// Events are handled strictly one after another. The first error, from
    /// dispatch or from the watcher's error stream, is logged and returned.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`Dispatcher::handle`], or
    /// [`Error::WatchMechanism`] for an error reported by the watcher.
    pub async fn run(mut self, streams: WatchStreams) -> Result<()> {
        let WatchStreams {
            mut events,
            mut errors,
        } = streams;
        let mut errors_open = true;

        let result = loop {
            tokio::select! {
                biased;
                err = errors.recv(), if errors_open => match err {
                    Some(msg) => break Err(Error::WatchMechanism(msg)),
                    None => errors_open = false,
                },
                ev = events.recv() => match ev {
                    Some(ev) => {
                        if let Err(e) = self.handle(ev).await {
                            break Err(e);
                        }
                    }
                    None => break Ok(()),
                },
            }
        };

        if let Err(e) = &result {
            tracing::error!("{e}");
        }
        result
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// HELPER FUNCTIONS
// ═══════════════════════════════════════════════════════════════════════════

impl<B, R> Dispatcher<B, R>
where
    B: WatchBackend,
    R: TestRunner,
{
    async fn on_create(&mut self, path: &Path) -> Result<Dispatch> {
        // Checked before stat: a `vendor` file or directory is equally ignored
        if is_excluded(path) {
            return Ok(Dispatch::Ignored);
        }

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| Error::stat(path, e))?;

        if metadata.is_dir() {
            self.watch_set.add(path)?;
            Ok(Dispatch::Watched(path.to_path_buf()))
        } else {
            self.test_file(path).await
        }
    }

    async fn test_file(&self, path: &Path) -> Result<Dispatch> {
        Ok(self
            .runner
            .run_for_file(path)
            .await?
            .map_or_else(|| Dispatch::NotSource(path.to_path_buf()), Dispatch::Tested))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════
