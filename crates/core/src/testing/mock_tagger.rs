//! Mock tag writer for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::assembly::{TagError, TagWriter, TrackTags};

/// Mock implementation of the [`TagWriter`] trait. Records what would
/// have been written without touching the file.
#[derive(Debug)]
pub struct MockTagWriter {
    writes: Arc<RwLock<Vec<(PathBuf, TrackTags)>>>,
}

impl Default for MockTagWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTagWriter {
    pub fn new() -> Self {
        Self {
            writes: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Every (path, tags) pair written so far.
    pub async fn recorded_writes(&self) -> Vec<(PathBuf, TrackTags)> {
        self.writes.read().await.clone()
    }
}

#[async_trait]
impl TagWriter for MockTagWriter {
    async fn write(&self, path: &Path, tags: &TrackTags) -> Result<(), TagError> {
        self.writes
            .write()
            .await
            .push((path.to_path_buf(), tags.clone()));
        Ok(())
    }
}
