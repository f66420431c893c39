//! rtest - re-run tests for the directory you just saved
//!
//! The binary wires the core pieces together; everything stateful lives in
//! `rtest-core`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod cli;
pub mod logging;
