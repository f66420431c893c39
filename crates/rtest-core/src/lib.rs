//! # rtest core
//!
//! Watches a directory tree and re-runs the test command for the directory
//! of every saved source file.
//!
//! ## Pieces
//!
//! - [`watch`]: the watch set, the startup tree walk and the `notify` backend
//! - [`throttle`]: drops repeated (path, operation) notifications within 800ms
//! - [`dispatch`]: the event loop; maps surviving events to work
//! - [`runner`]: runs the external test command
//! - [`trigger`]: manual runs of the whole root, one per input line
//!
//! ## Error Handling
//!
//! All fallible operations return `Result<T, Error>`. Errors on the
//! filesystem event path end that loop; the manual trigger only logs them.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod dispatch;
mod error;
pub mod event;
pub mod runner;
pub mod shutdown;
pub mod throttle;
pub mod trigger;
pub mod watch;

#[cfg(test)]
mod testing;

pub use config::{load_config, CliOverrides, CommandConfig, Config};
pub use dispatch::{Dispatch, Dispatcher};
pub use error::{Error, Result};
pub use event::{OpKind, RawEvent};
pub use runner::{TestCommand, TestRunner};
pub use shutdown::{signal_channels, ShutdownCoordinator};
pub use throttle::{ThrottleTable, THROTTLE_WINDOW};
pub use trigger::run_manual_trigger;
pub use watch::{build_watch_set, NotifyWatcher, WatchBackend, WatchSet, WatchStreams};
