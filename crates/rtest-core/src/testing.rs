//! In-memory fakes shared by unit tests

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use crate::{runner::TestRunner, watch::WatchBackend, Error, Result};

/// Backend that records every directory it is asked to watch
#[derive(Debug, Default)]
pub struct MemoryBackend {
    added: Vec<PathBuf>,
    reject: Option<PathBuf>,
}

impl MemoryBackend {
    pub fn rejecting(path: impl Into<PathBuf>) -> Self {
        Self {
            added: Vec::new(),
            reject: Some(path.into()),
        }
    }

    pub fn added(&self) -> &[PathBuf] {
        &self.added
    }
}

impl WatchBackend for MemoryBackend {
    fn add(&mut self, dir: &Path) -> Result<()> {
        if self.reject.as_deref() == Some(dir) {
            return Err(Error::watch_registration(dir, "rejected by test backend"));
        }
        self.added.push(dir.to_path_buf());
        Ok(())
    }
}

/// Runner that records the directories it was asked to test
#[derive(Debug, Clone, Default)]
pub struct RecordingRunner {
    runs: Arc<Mutex<Vec<PathBuf>>>,
    fail: bool,
}

impl RecordingRunner {
    /// A runner whose every launch fails, like a missing `go` binary
    pub fn failing() -> Self {
        Self {
            runs: Arc::default(),
            fail: true,
        }
    }

    pub fn runs(&self) -> Vec<PathBuf> {
        self.runs
            .lock()
            .map(|runs| runs.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TestRunner for RecordingRunner {
    fn is_source(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "go")
    }

    async fn run_in(&self, dir: &Path) -> Result<()> {
        if let Ok(mut runs) = self.runs.lock() {
            runs.push(dir.to_path_buf());
        }
        if self.fail {
            return Err(Error::process_launch("go", dir, "No such file or directory"));
        }
        Ok(())
    }
}
