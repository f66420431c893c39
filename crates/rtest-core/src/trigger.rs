//! Manual trigger: every line on the input runs the tests of the root.
//!
//! Runs beside the event loop and shares nothing with it. Failures here are
//! only logged; the reader keeps going until its input ends.

use std::path::Path;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::runner::TestRunner;

/// Serve manual triggers from `input` until it ends.
///
/// Line contents are ignored. Returns how many triggers were served.
pub async fn run_manual_trigger<I, R>(input: I, runner: &R, root: &Path) -> usize
where
    I: AsyncBufRead + Unpin,
    R: TestRunner + ?Sized,
{
    let mut lines = input.lines();
    let mut served = 0_usize;

    loop {
        match lines.next_line().await {
            Ok(Some(_)) => {
                served += 1;
                if let Err(e) = runner.run_in(root).await {
                    tracing::error!("error running tests: {e}");
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::error!("failed to read manual trigger input: {e}");
                break;
            }
        }
    }

    tracing::debug!(served, "manual trigger input closed");
    served
}
