//! Orchestrator configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Scratch locations used while a track is in flight. Both files are
/// deleted before a run starts and after every finished track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Where the recorder writes the raw capture.
    #[serde(default = "default_raw_path")]
    pub raw_path: PathBuf,
    /// Where the transcoded file lands before tagging and placement.
    #[serde(default = "default_encoded_path")]
    pub encoded_path: PathBuf,
}

fn default_raw_path() -> PathBuf {
    PathBuf::from("/tmp/raw_capture.ogg")
}

fn default_encoded_path() -> PathBuf {
    PathBuf::from("/tmp/untagged_track.mp3")
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            raw_path: default_raw_path(),
            encoded_path: default_encoded_path(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    #[serde(default)]
    pub staging: StagingConfig,
}
