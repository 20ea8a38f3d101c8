//! Drives a full recording run from URI to validated output directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::assembly::{AssemblyError, AssemblyStage};
use crate::capture::{CaptureConfig, CaptureError, CaptureSession};
use crate::catalog::{CatalogClient, CatalogError, Device, Track};
use crate::collection::{CollectionEnumerator, CollectionError, CollectionSource};
use crate::device::{DeviceError, DeviceLocator, LocatorConfig};
use crate::recorder::{Recorder, RecorderError};

use super::config::OrchestratorConfig;
use super::types::{RunRequest, RunReport};

/// Playlist item removal happens in batches of at most this many URIs.
const PURGE_BATCH_SIZE: usize = 100;

/// Errors that can abort a recording run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Collection(#[from] CollectionError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error(transparent)]
    Recorder(#[from] RecorderError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The recorder process exited with a failure code.
    #[error("recorder exited with code {code}")]
    RecorderFailure { code: i32 },

    /// The output directory does not hold one file per recorded track.
    /// Carries both full lists for manual reconciliation.
    #[error("expected {} output files, found {}", expected.len(), found.len())]
    OutputCountMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Sequences enumeration, device lookup, capture, assembly, placement
/// and validation for one collection.
pub struct RunOrchestrator {
    catalog: Arc<dyn CatalogClient>,
    recorder: Arc<dyn Recorder>,
    assembly: AssemblyStage,
    enumerator: CollectionEnumerator,
    locator: DeviceLocator,
    device_name: String,
    capture_config: CaptureConfig,
    config: OrchestratorConfig,
}

impl RunOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        recorder: Arc<dyn Recorder>,
        assembly: AssemblyStage,
        device_name: String,
        capture_config: CaptureConfig,
        locator_config: LocatorConfig,
        config: OrchestratorConfig,
    ) -> Self {
        let enumerator = CollectionEnumerator::new(Arc::clone(&catalog));
        let locator = DeviceLocator::new(Arc::clone(&catalog), locator_config);
        Self {
            catalog,
            recorder,
            assembly,
            enumerator,
            locator,
            device_name,
            capture_config,
            config,
        }
    }

    /// Runs the whole pipeline for one request.
    pub async fn run(&self, request: &RunRequest) -> Result<RunReport, RunError> {
        self.remove_transients().await;
        tokio::fs::create_dir_all(&request.output_dir).await?;

        // The recorder must be up before the locator can find it: the
        // capture device only exists while the process is registered.
        self.recorder.start().await?;

        match self.run_pipeline(request).await {
            Ok(report) => Ok(report),
            Err(e) => {
                // Failed runs must not leave staging leftovers or a live
                // recorder behind.
                self.terminate_recorder_quietly().await;
                self.remove_transients().await;
                Err(e)
            }
        }
    }

    async fn run_pipeline(&self, request: &RunRequest) -> Result<RunReport, RunError> {
        let device = self.locator.locate(&self.device_name).await?;
        info!(device = %device.name, id = %device.id, "capture device located");

        let source = CollectionSource::parse(&request.uri)?;
        info!(%source, output_dir = %request.output_dir.display(), "starting run");

        let tracks = self.enumerator.fetch(&source).await?;

        if tracks.is_empty() {
            warn!("collection is empty, nothing to record");
            self.terminate_recorder_quietly().await;
            return Ok(RunReport {
                tracks_total: 0,
                tracks_recorded: 0,
                files_in_output: 0,
                purged: false,
            });
        }

        let recorded = self
            .record_all(&device, &tracks, &request.output_dir)
            .await?;

        if let Some(code) = self.recorder.terminate().await? {
            if code != 0 {
                return Err(RunError::RecorderFailure { code });
            }
        }

        let files = list_output_files(&request.output_dir).await?;
        let files_in_output = files.len();
        if files_in_output != recorded.len() {
            let found = files
                .iter()
                .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
                .collect();
            return Err(RunError::OutputCountMismatch {
                expected: recorded,
                found,
            });
        }
        info!(files = files_in_output, "run validated");

        let purged = if request.purge {
            self.purge(&source, &recorded).await?
        } else {
            false
        };

        Ok(RunReport {
            tracks_total: tracks.len(),
            tracks_recorded: recorded.len(),
            files_in_output,
            purged,
        })
    }

    /// Captures and assembles every track in order. Returns the URIs of
    /// tracks that made it into the output directory.
    async fn record_all(
        &self,
        device: &Device,
        tracks: &[Track],
        output_dir: &Path,
    ) -> Result<Vec<String>, RunError> {
        let staging = &self.config.staging;
        let mut recorded = Vec::with_capacity(tracks.len());

        for (index, track) in tracks.iter().enumerate() {
            info!(
                position = index + 1,
                total = tracks.len(),
                track = %track.name,
                "recording track"
            );

            let mut session = CaptureSession::new(Arc::clone(&self.catalog), self.capture_config.clone());
            session.run(device, track).await?;

            let assembled = self
                .assembly
                .assemble(track, &staging.raw_path, &staging.encoded_path)
                .await?;

            let destination = output_dir.join(&assembled.filename);
            move_file(&assembled.path, &destination).await?;
            debug!(path = %destination.display(), "track placed");

            self.remove_transients().await;
            recorded.push(track.uri.clone());
        }

        Ok(recorded)
    }

    /// Removes recorded tracks from the source playlist. Albums cannot be
    /// edited, so an album source is left untouched.
    async fn purge(&self, source: &CollectionSource, uris: &[String]) -> Result<bool, RunError> {
        match source {
            CollectionSource::Playlist(id) => {
                for chunk in uris.chunks(PURGE_BATCH_SIZE) {
                    self.catalog.remove_playlist_items(id, chunk).await?;
                }
                info!(count = uris.len(), "source playlist purged");
                Ok(true)
            }
            CollectionSource::Album(_) => {
                info!("album source, skipping purge");
                Ok(false)
            }
        }
    }

    /// Deletes staging leftovers. Failures here are not actionable.
    async fn remove_transients(&self) {
        for path in [&self.config.staging.raw_path, &self.config.staging.encoded_path] {
            if let Err(e) = tokio::fs::remove_file(path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %e, "failed to remove staging file");
                }
            }
        }
    }

    async fn terminate_recorder_quietly(&self) {
        if let Err(e) = self.recorder.terminate().await {
            warn!(error = %e, "failed to terminate recorder");
        }
    }
}

/// Lists regular files directly inside the output directory, sorted by
/// name. Subdirectories are not descended into.
pub async fn list_output_files(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Moves a file, falling back to copy-and-remove when the rename crosses
/// a filesystem boundary.
async fn move_file(from: &Path, to: &Path) -> Result<(), std::io::Error> {
    match tokio::fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(e) if crosses_devices(&e) => {
            tokio::fs::copy(from, to).await?;
            tokio::fs::remove_file(from).await
        }
        Err(e) => Err(e),
    }
}

fn crosses_devices(e: &std::io::Error) -> bool {
    // EXDEV; ErrorKind::CrossesDevices is not stable on all toolchains.
    e.raw_os_error() == Some(18)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn output_listing_skips_directories() {
        let dir = tempdir().unwrap();
        tokio::fs::write(dir.path().join("b.mp3"), b"x").await.unwrap();
        tokio::fs::write(dir.path().join("a.mp3"), b"x").await.unwrap();
        tokio::fs::create_dir(dir.path().join("nested")).await.unwrap();

        let files = list_output_files(dir.path()).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.mp3", "b.mp3"]);
    }

    #[tokio::test]
    async fn move_file_within_one_filesystem() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("from.mp3");
        let to = dir.path().join("to.mp3");
        tokio::fs::write(&from, b"audio").await.unwrap();

        move_file(&from, &to).await.unwrap();
        assert!(!from.exists());
        assert_eq!(tokio::fs::read(&to).await.unwrap(), b"audio");
    }
}
