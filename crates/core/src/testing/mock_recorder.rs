//! Mock recorder process for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::recorder::{Recorder, RecorderError};

/// Mock implementation of the [`Recorder`] trait.
///
/// Tracks start/terminate calls and lets tests script the exit code the
/// process reports when it is torn down.
#[derive(Debug)]
pub struct MockRecorder {
    starts: Arc<RwLock<usize>>,
    terminations: Arc<RwLock<usize>>,
    exit_code: Arc<RwLock<Option<i32>>>,
    fail_start: Arc<RwLock<bool>>,
}

impl Default for MockRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRecorder {
    pub fn new() -> Self {
        Self {
            starts: Arc::new(RwLock::new(0)),
            terminations: Arc::new(RwLock::new(0)),
            exit_code: Arc::new(RwLock::new(None)),
            fail_start: Arc::new(RwLock::new(false)),
        }
    }

    /// Exit code reported on termination. `None` means the process was
    /// still running and had to be killed.
    pub async fn set_exit_code(&self, code: Option<i32>) {
        *self.exit_code.write().await = code;
    }

    /// Make `start` fail as if the binary were missing.
    pub async fn fail_next_start(&self) {
        *self.fail_start.write().await = true;
    }

    pub async fn start_count(&self) -> usize {
        *self.starts.read().await
    }

    pub async fn termination_count(&self) -> usize {
        *self.terminations.read().await
    }
}

#[async_trait]
impl Recorder for MockRecorder {
    async fn start(&self) -> Result<(), RecorderError> {
        if std::mem::take(&mut *self.fail_start.write().await) {
            return Err(RecorderError::BinaryNotFound {
                path: "librespot".into(),
            });
        }
        *self.starts.write().await += 1;
        Ok(())
    }

    async fn terminate(&self) -> Result<Option<i32>, RecorderError> {
        *self.terminations.write().await += 1;
        Ok(*self.exit_code.read().await)
    }
}
