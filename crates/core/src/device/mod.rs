//! Playback device location.
//!
//! The capture process takes a nonzero, variable time to register itself
//! as a playback target after being spawned, so the locator retries with
//! a fixed backoff before giving up.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::catalog::{CatalogClient, CatalogError, Device};

/// Errors from device location.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The named device never became visible. Carries the last device
    /// listing seen, for diagnosability.
    #[error("device {name:?} not found; visible devices: {last_seen:?}")]
    NotFound {
        name: String,
        last_seen: Vec<Device>,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Configuration for the locator's bounded-retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatorConfig {
    /// Retries after the first attempt (default: 5, so 6 attempts total).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Fixed backoff between attempts in milliseconds (default: 30 s).
    #[serde(default = "default_backoff")]
    pub backoff_ms: u64,
}

fn default_max_retries() -> u32 {
    5
}

fn default_backoff() -> u64 {
    30_000
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_ms: default_backoff(),
        }
    }
}

/// Resolves a configured device name to a device id, once per run.
pub struct DeviceLocator {
    catalog: Arc<dyn CatalogClient>,
    config: LocatorConfig,
}

impl DeviceLocator {
    pub fn new(catalog: Arc<dyn CatalogClient>, config: LocatorConfig) -> Self {
        Self { catalog, config }
    }

    /// Scans the visible device listing for an exact name match; first
    /// match wins if duplicates exist.
    pub async fn locate(&self, name: &str) -> Result<Device, DeviceError> {
        let mut last_seen = Vec::new();

        for attempt in 0..=self.config.max_retries {
            let devices = self.catalog.list_devices().await?;
            debug!(attempt, count = devices.len(), "device listing fetched");

            if let Some(device) = devices.iter().find(|d| d.name == name) {
                info!(name, id = %device.id, "using device");
                return Ok(device.clone());
            }

            last_seen = devices;
            if attempt < self.config.max_retries {
                sleep(Duration::from_millis(self.config.backoff_ms)).await;
            }
        }

        Err(DeviceError::NotFound {
            name: name.to_string(),
            last_seen,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockCatalogClient;

    fn fast_config() -> LocatorConfig {
        LocatorConfig {
            max_retries: 5,
            backoff_ms: 1,
        }
    }

    #[tokio::test]
    async fn finds_device_by_exact_name() {
        let catalog = Arc::new(MockCatalogClient::new());
        catalog
            .set_devices(vec![
                Device {
                    id: "dev-a".to_string(),
                    name: "living room".to_string(),
                },
                Device {
                    id: "dev-b".to_string(),
                    name: "_comp_".to_string(),
                },
            ])
            .await;

        let locator = DeviceLocator::new(catalog, fast_config());
        let device = locator.locate("_comp_").await.unwrap();
        assert_eq!(device.id, "dev-b");
    }

    #[tokio::test]
    async fn first_match_wins_for_duplicate_names() {
        let catalog = Arc::new(MockCatalogClient::new());
        catalog
            .set_devices(vec![
                Device {
                    id: "dev-1".to_string(),
                    name: "_comp_".to_string(),
                },
                Device {
                    id: "dev-2".to_string(),
                    name: "_comp_".to_string(),
                },
            ])
            .await;

        let locator = DeviceLocator::new(catalog, fast_config());
        let device = locator.locate("_comp_").await.unwrap();
        assert_eq!(device.id, "dev-1");
    }

    #[tokio::test]
    async fn retries_then_succeeds_when_device_appears() {
        let catalog = Arc::new(MockCatalogClient::new());
        catalog
            .queue_device_listings(vec![
                vec![],
                vec![],
                vec![Device {
                    id: "dev-late".to_string(),
                    name: "_comp_".to_string(),
                }],
            ])
            .await;

        let locator = DeviceLocator::new(catalog.clone(), fast_config());
        let device = locator.locate("_comp_").await.unwrap();
        assert_eq!(device.id, "dev-late");
        assert_eq!(catalog.device_listing_calls().await, 3);
    }

    #[tokio::test]
    async fn exhausts_retries_and_reports_last_listing() {
        let catalog = Arc::new(MockCatalogClient::new());
        let other = Device {
            id: "dev-x".to_string(),
            name: "kitchen".to_string(),
        };
        catalog.set_devices(vec![other.clone()]).await;

        let locator = DeviceLocator::new(catalog.clone(), fast_config());
        let err = locator.locate("_comp_").await.unwrap_err();

        // 1 initial attempt + 5 retries.
        assert_eq!(catalog.device_listing_calls().await, 6);
        match err {
            DeviceError::NotFound { name, last_seen } => {
                assert_eq!(name, "_comp_");
                assert_eq!(last_seen, vec![other]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
