//! Directory watching
//!
//! Every directory under the root is watched non-recursively; recursion is
//! done here by walking the tree once at startup and by adding each directory
//! created later. Directories named `vendor` are never watched, and neither
//! is anything below them.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use rtest_core::watch::{build_watch_set, NotifyWatcher};
//!
//! # fn example() -> rtest_core::Result<()> {
//! let (watcher, _streams) = NotifyWatcher::new()?;
//! let watch_set = build_watch_set(Path::new("/path/to/project"), watcher)?;
//! println!("watching {} directories", watch_set.len());
//! # Ok(())
//! # }
//! ```

// ═══════════════════════════════════════════════════════════════════════════
// MODULE DEFINITIONS
// ═══════════════════════════════════════════════════════════════════════════

pub mod backend;
pub mod tree;

// ═══════════════════════════════════════════════════════════════════════════
// RE-EXPORTS
// ═══════════════════════════════════════════════════════════════════════════

pub use backend::{NotifyWatcher, WatchBackend, WatchStreams, EVENT_BUFFER};
pub use tree::{build_watch_set, is_excluded, WatchSet, EXCLUDED_DIR_NAME};
