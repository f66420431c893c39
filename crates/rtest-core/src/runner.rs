//! Running the external test command
//!
//! A run is `<program> <args>... <extra args>...` with the working directory
//! set to the target directory. Its stdout and stderr are the host's own;
//! nothing is captured or summarised. The exit status only shows up in debug
//! logs: failing tests are the command's business, not the watcher's.

use std::{
    path::{Path, PathBuf},
    process::Stdio,
    sync::Arc,
};

use async_trait::async_trait;

use crate::{config::Config, Error, Result};

// ═══════════════════════════════════════════════════════════════════════════
// TRAIT
// ═══════════════════════════════════════════════════════════════════════════

/// Something that can run the tests of one directory
#[async_trait]
pub trait TestRunner: Send + Sync {
    /// Whether an edit to `path` should trigger a run
    fn is_source(&self, path: &Path) -> bool;

    /// Run the tests of `dir` and wait for them to finish.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProcessLaunch`] if the command cannot be started.
    async fn run_in(&self, dir: &Path) -> Result<()>;

    /// Run the tests of the directory containing `file`.
    ///
    /// Returns the directory that was tested, or `None` when `file` is not a
    /// source file and nothing ran.
    async fn run_for_file(&self, file: &Path) -> Result<Option<PathBuf>> {
        if !self.is_source(file) {
            return Ok(None);
        }
        let dir = containing_dir(file);
        self.run_in(&dir).await?;
        Ok(Some(dir))
    }
}

/// Directory holding `file`; `.` for a bare file name
pub fn containing_dir(file: &Path) -> PathBuf {
    file.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

// ═══════════════════════════════════════════════════════════════════════════
// TEST COMMAND
// ═══════════════════════════════════════════════════════════════════════════

/// The configured external test command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCommand {
    program: String,
    args: Vec<String>,
    extra_args: Arc<[String]>,
    source_extension: String,
}

impl TestCommand {
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        extra_args: Vec<String>,
        source_extension: impl Into<String>,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            extra_args: extra_args.into(),
            source_extension: source_extension.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.command.program.clone(),
            config.command.args.clone(),
            config.extra_args.clone(),
            config.command.source_extension.clone(),
        )
    }

    /// Full argument list: base args, then the user's extra args verbatim
    pub fn argv(&self) -> Vec<&str> {
        self.args
            .iter()
            .chain(self.extra_args.iter())
            .map(String::as_str)
            .collect()
    }
}

#[async_trait]
impl TestRunner for TestCommand {
    fn is_source(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext == self.source_extension.as_str())
    }

    async fn run_in(&self, dir: &Path) -> Result<()> {
        let argv = self.argv();
        tracing::debug!(dir = %dir.display(), "running: {} {}", self.program, argv.join(" "));

        // stdin stays with the manual trigger reader
        let status = tokio::process::Command::new(&self.program)
            .args(&argv)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| Error::process_launch(&self.program, dir, e))?;

        tracing::debug!(dir = %dir.display(), %status, "test command finished");
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════
