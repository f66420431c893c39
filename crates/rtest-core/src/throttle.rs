//! Event throttling
//!
//! Editors and the OS emit several notifications for one logical save (temp
//! file rename, metadata touch, content write). The [`ThrottleTable`] drops a
//! notification when the same (path, operation) pair was accepted less than
//! [`THROTTLE_WINDOW`] ago.
//!
//! The key is scoped to the operation: a `Write` right after a `Create` on
//! the same path is a different key and is never suppressed by it.
//!
//! Entries that are older than the window can never suppress anything again,
//! so the table sweeps them out once it grows past a threshold. This keeps
//! memory bounded for long sessions without changing which events pass.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::Duration,
};

use tokio::time::Instant;

use crate::event::{OpKind, RawEvent};

/// Minimum gap between two accepted events with the same key
pub const THROTTLE_WINDOW: Duration = Duration::from_millis(800);

/// Table size that triggers the first sweep of stale keys
pub const DEFAULT_SWEEP_THRESHOLD: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ThrottleKey {
    path: PathBuf,
    op: OpKind,
}

/// Last-accepted timestamps per (path, operation)
#[derive(Debug)]
pub struct ThrottleTable {
    last_seen: HashMap<ThrottleKey, Instant>,
    sweep_threshold: usize,
}

impl ThrottleTable {
    #[must_use]
    pub fn new() -> Self {
        Self::with_sweep_threshold(DEFAULT_SWEEP_THRESHOLD)
    }

    /// Create a table that sweeps once it holds `threshold` keys
    #[must_use]
    pub fn with_sweep_threshold(threshold: usize) -> Self {
        Self {
            last_seen: HashMap::new(),
            sweep_threshold: threshold.max(1),
        }
    }

    /// Decide whether `event` passes, recording it when it does.
    ///
    /// `now` is the processing time, not the arrival time: a duplicate that
    /// sat in the channel while a test run was going still counts from the
    /// moment it is looked at.
    pub fn admit(&mut self, event: &RawEvent, now: Instant) -> bool {
        self.admit_key(&event.path, event.op, now)
    }

    fn admit_key(&mut self, path: &Path, op: OpKind, now: Instant) -> bool {
        let key = ThrottleKey {
            path: path.to_path_buf(),
            op,
        };

        let recent = self
            .last_seen
            .get(&key)
            .is_some_and(|last| now.saturating_duration_since(*last) < THROTTLE_WINDOW);
        if recent {
            return false;
        }

        self.last_seen.insert(key, now);
        if self.last_seen.len() >= self.sweep_threshold {
            self.sweep(now);
        }
        true
    }

    /// Drop every key whose window has passed. Returns how many were removed.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let before = self.last_seen.len();
        self.last_seen
            .retain(|_, last| now.saturating_duration_since(*last) < THROTTLE_WINDOW);
        let removed = before - self.last_seen.len();

        // Keep sweeps amortised when most keys are still live
        if self.last_seen.len() * 2 > self.sweep_threshold {
            self.sweep_threshold = self.sweep_threshold.saturating_mul(2);
        }
        tracing::debug!(removed, remaining = self.last_seen.len(), "swept throttle table");
        removed
    }

    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }
}

impl Default for ThrottleTable {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════
