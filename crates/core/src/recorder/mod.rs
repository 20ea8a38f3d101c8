//! Capture process ownership.
//!
//! The recorder is a long-lived external process that logs into the same
//! account as the catalog client, registers itself as a playback target
//! and streams everything played on it into the staging file. It is
//! modelled as an owned handle with explicit start/terminate operations
//! and is held exclusively by the run orchestrator.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::catalog::Credentials;

/// Errors from capture process management.
#[derive(Debug, Error)]
pub enum RecorderError {
    /// The capture binary is not on the path given.
    #[error("capture binary not found at {path}")]
    BinaryNotFound { path: PathBuf },

    /// The process is already running.
    #[error("capture process already started")]
    AlreadyStarted,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration for the spawned capture process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Path to the capture binary (default: `librespot` on PATH).
    #[serde(default = "default_binary")]
    pub binary: PathBuf,
    /// Name the process registers under as a playback target. Must match
    /// the name the device locator searches for.
    #[serde(default = "default_device_name")]
    pub device_name: String,
    /// Stream bitrate requested from the service, in kb/s.
    #[serde(default = "default_bitrate")]
    pub bitrate_kbps: u32,
    /// Device type the process advertises.
    #[serde(default = "default_device_type")]
    pub device_type: String,
    /// Warm-up delay after spawning, in milliseconds (default: 3 s). The
    /// process needs a moment before it starts registering itself.
    #[serde(default = "default_warmup")]
    pub warmup_ms: u64,
}

fn default_binary() -> PathBuf {
    PathBuf::from("librespot")
}

fn default_device_name() -> String {
    "_comp_".to_string()
}

fn default_bitrate() -> u32 {
    320
}

fn default_device_type() -> String {
    "computer".to_string()
}

fn default_warmup() -> u64 {
    3_000
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            device_name: default_device_name(),
            bitrate_kbps: default_bitrate(),
            device_type: default_device_type(),
            warmup_ms: default_warmup(),
        }
    }
}

/// Handle to the capture process.
#[async_trait]
pub trait Recorder: Send + Sync {
    /// Spawns the process and waits out its warm-up delay.
    async fn start(&self) -> Result<(), RecorderError>;

    /// Stops the process and reaps it. Returns `Some(code)` when the
    /// process had already exited (or exits) with a code of its own;
    /// `None` when it was killed by us or was never started.
    async fn terminate(&self) -> Result<Option<i32>, RecorderError>;
}

/// Production recorder spawning the capture binary.
pub struct SpawnedRecorder {
    config: RecorderConfig,
    credentials: Credentials,
    staging_path: PathBuf,
    child: Mutex<Option<Child>>,
}

impl SpawnedRecorder {
    pub fn new(config: RecorderConfig, credentials: Credentials, staging_path: PathBuf) -> Self {
        Self {
            config,
            credentials,
            staging_path,
            child: Mutex::new(None),
        }
    }

    fn build_args(&self) -> Vec<String> {
        vec![
            "-u".to_string(),
            self.credentials.username.clone(),
            "-p".to_string(),
            self.credentials.password.clone(),
            "-n".to_string(),
            self.config.device_name.clone(),
            "-b".to_string(),
            self.config.bitrate_kbps.to_string(),
            "--device-type".to_string(),
            self.config.device_type.clone(),
            "--initial-volume".to_string(),
            "100".to_string(),
            "--disable-credential-cache".to_string(),
            "--disable-audio-cache".to_string(),
            "--disable-gapless".to_string(),
            "--backend".to_string(),
            "pipe".to_string(),
            "--passthrough".to_string(),
            "--device".to_string(),
            self.staging_path.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl Recorder for SpawnedRecorder {
    async fn start(&self) -> Result<(), RecorderError> {
        let mut guard = self.child.lock().await;
        if guard.is_some() {
            return Err(RecorderError::AlreadyStarted);
        }

        info!(
            binary = %self.config.binary.display(),
            device_name = %self.config.device_name,
            staging = %self.staging_path.display(),
            "starting capture process"
        );

        let child = Command::new(&self.config.binary)
            .args(self.build_args())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RecorderError::BinaryNotFound {
                        path: self.config.binary.clone(),
                    }
                } else {
                    RecorderError::Io(e)
                }
            })?;

        *guard = Some(child);
        drop(guard);

        // Let the process warm up before anything tries to find it as a
        // playback target.
        sleep(Duration::from_millis(self.config.warmup_ms)).await;
        Ok(())
    }

    async fn terminate(&self) -> Result<Option<i32>, RecorderError> {
        let mut guard = self.child.lock().await;
        let Some(mut child) = guard.take() else {
            return Ok(None);
        };

        // The process may have died on its own mid-run; that exit status
        // is meaningful and must be reported.
        if let Some(status) = child.try_wait()? {
            warn!(?status, "capture process exited before termination");
            return Ok(status.code());
        }

        debug!("killing capture process");
        child.kill().await?;
        let status = child.wait().await?;
        Ok(status.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_args_match_capture_binary_contract() {
        let recorder = SpawnedRecorder::new(
            RecorderConfig::default(),
            Credentials {
                username: "user".to_string(),
                password: "secret".to_string(),
            },
            PathBuf::from("/tmp/raw_capture.ogg"),
        );

        let args = recorder.build_args();
        let joined = args.join(" ");
        assert!(joined.contains("-u user"));
        assert!(joined.contains("-n _comp_"));
        assert!(joined.contains("-b 320"));
        assert!(joined.contains("--device-type computer"));
        assert!(joined.contains("--backend pipe"));
        assert!(joined.contains("--passthrough"));
        assert!(joined.contains("--device /tmp/raw_capture.ogg"));
    }

    #[tokio::test]
    async fn terminate_without_start_is_a_noop() {
        let recorder = SpawnedRecorder::new(
            RecorderConfig::default(),
            Credentials {
                username: "u".to_string(),
                password: "p".to_string(),
            },
            PathBuf::from("/tmp/raw_capture.ogg"),
        );

        assert!(recorder.terminate().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_binary_is_reported() {
        let config = RecorderConfig {
            binary: PathBuf::from("/nonexistent/capture-binary"),
            warmup_ms: 0,
            ..Default::default()
        };
        let recorder = SpawnedRecorder::new(
            config,
            Credentials {
                username: "u".to_string(),
                password: "p".to_string(),
            },
            PathBuf::from("/tmp/raw_capture.ogg"),
        );

        let err = recorder.start().await.unwrap_err();
        assert!(matches!(err, RecorderError::BinaryNotFound { .. }));
    }
}
