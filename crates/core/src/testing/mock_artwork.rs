//! Mock artwork fetcher for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::assembly::{ArtworkFetcher, AssemblyError};

/// JPEG SOI marker plus padding, enough to stand in for cover bytes.
const FAKE_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

/// Mock implementation of the [`ArtworkFetcher`] trait.
#[derive(Debug)]
pub struct MockArtworkFetcher {
    bytes: Arc<RwLock<Vec<u8>>>,
    requests: Arc<RwLock<Vec<String>>>,
    fail_next: Arc<RwLock<bool>>,
}

impl Default for MockArtworkFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockArtworkFetcher {
    pub fn new() -> Self {
        Self {
            bytes: Arc::new(RwLock::new(FAKE_JPEG.to_vec())),
            requests: Arc::new(RwLock::new(Vec::new())),
            fail_next: Arc::new(RwLock::new(false)),
        }
    }

    /// Bytes returned by every fetch.
    pub async fn set_bytes(&self, bytes: Vec<u8>) {
        *self.bytes.write().await = bytes;
    }

    /// Make the next fetch fail.
    pub async fn fail_next_fetch(&self) {
        *self.fail_next.write().await = true;
    }

    /// Every URL requested so far.
    pub async fn requested_urls(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl ArtworkFetcher for MockArtworkFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AssemblyError> {
        self.requests.write().await.push(url.to_string());
        if std::mem::take(&mut *self.fail_next.write().await) {
            return Err(AssemblyError::ArtworkFetchFailed {
                url: url.to_string(),
                reason: "simulated failure".to_string(),
            });
        }
        Ok(self.bytes.read().await.clone())
    }
}
