//! Capture session: playback synchronization for a single track.
//!
//! The recorder streams continuously from the same audio device, so track
//! boundaries can only be inferred from the playback service's reported
//! status. The session starts playback, gates on status transitions and
//! adds a fixed settle margin at the end so the recorder's decoder can
//! flush buffered audio into the staging file.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, trace, warn};

use crate::catalog::{CatalogClient, CatalogError, Device, Track};

/// Errors from a capture session.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Lifecycle of a capture session. Terminal success is `Finished`; there
/// is no failure state, errors propagate to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    PlaybackRequested,
    Playing,
    Finished,
}

/// Timing configuration. These constants directly affect audio
/// completeness and are deliberately not hidden in the code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Interval between playback-status polls while a track is playing,
    /// in milliseconds (default: 2 s).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Settle delay after playback stops, in milliseconds (default: 2 s).
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,
}

fn default_poll_interval() -> u64 {
    2_000
}

fn default_settle_delay() -> u64 {
    2_000
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            settle_delay_ms: default_settle_delay(),
        }
    }
}

/// Ephemeral session driving one track from playback start to settled
/// staging file. Create a fresh session per track.
pub struct CaptureSession {
    catalog: Arc<dyn CatalogClient>,
    config: CaptureConfig,
    state: CaptureState,
}

impl CaptureSession {
    pub fn new(catalog: Arc<dyn CatalogClient>, config: CaptureConfig) -> Self {
        Self {
            catalog,
            config,
            state: CaptureState::Idle,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Plays the track on the device and blocks until it has finished and
    /// the settle delay has elapsed. The recorder writes the audio; this
    /// only gates on the service's view of playback progress.
    pub async fn run(&mut self, device: &Device, track: &Track) -> Result<(), CaptureError> {
        self.state = CaptureState::PlaybackRequested;
        info!(track = %track.name, uri = %track.uri, "starting playback");
        self.catalog
            .start_playback(&device.id, std::slice::from_ref(&track.uri))
            .await?;

        // Right after the start command the service can briefly report no
        // playback context at all; spin until a status shows up.
        loop {
            if self.catalog.playback_state().await?.is_some() {
                break;
            }
            trace!("waiting for playback status");
        }
        self.state = CaptureState::Playing;

        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);
        loop {
            match self.catalog.playback_state().await? {
                Some(status) if status.is_playing => {
                    debug!(track = %track.name, "track is playing");
                    sleep(poll_interval).await;
                }
                Some(_) => break,
                None => {
                    // The service dropped the playback context mid-track.
                    // Treated as end of playback, but worth flagging since
                    // the capture may be truncated.
                    warn!(track = %track.name, "playback status disappeared mid-track");
                    break;
                }
            }
        }

        // Give the recorder's decoder time to flush buffered audio into
        // the staging file before it gets handed to assembly.
        sleep(Duration::from_millis(self.config.settle_delay_ms)).await;
        self.state = CaptureState::Finished;
        info!(track = %track.name, "track finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PlaybackState;
    use crate::testing::{fixtures, MockCatalogClient};

    fn fast_config() -> CaptureConfig {
        CaptureConfig {
            poll_interval_ms: 1,
            settle_delay_ms: 1,
        }
    }

    #[tokio::test]
    async fn session_reaches_finished_after_playback_stops() {
        let catalog = Arc::new(MockCatalogClient::new());
        catalog
            .queue_playback_states(vec![
                None, // startup race: no status yet
                Some(PlaybackState { is_playing: true }),
                Some(PlaybackState { is_playing: true }),
                Some(PlaybackState { is_playing: false }),
            ])
            .await;
        catalog
            .set_devices(vec![fixtures::device("dev-1", "_comp_")])
            .await;

        let device = fixtures::device("dev-1", "_comp_");
        let track = fixtures::track("svc:track:1", "Song", "Band");

        let mut session = CaptureSession::new(catalog.clone(), fast_config());
        assert_eq!(session.state(), CaptureState::Idle);

        session.run(&device, &track).await.unwrap();
        assert_eq!(session.state(), CaptureState::Finished);

        let playback = catalog.recorded_playback().await;
        assert_eq!(playback.len(), 1);
        assert_eq!(playback[0].0, "dev-1");
        assert_eq!(playback[0].1, vec!["svc:track:1".to_string()]);
    }

    #[tokio::test]
    async fn vanished_status_mid_track_still_finishes() {
        let catalog = Arc::new(MockCatalogClient::new());
        // The playback context disappears while the track is playing.
        catalog
            .queue_playback_states(vec![
                Some(PlaybackState { is_playing: true }),
                Some(PlaybackState { is_playing: true }),
                None,
            ])
            .await;

        let device = fixtures::device("dev-1", "_comp_");
        let track = fixtures::track("svc:track:1", "Song", "Band");

        let mut session = CaptureSession::new(catalog, fast_config());
        session.run(&device, &track).await.unwrap();
        assert_eq!(session.state(), CaptureState::Finished);
    }

    #[tokio::test]
    async fn catalog_errors_propagate() {
        let catalog = Arc::new(MockCatalogClient::new());
        catalog
            .set_next_error(CatalogError::ApiError {
                status: 500,
                message: "boom".to_string(),
            })
            .await;

        let device = fixtures::device("dev-1", "_comp_");
        let track = fixtures::track("svc:track:1", "Song", "Band");

        let mut session = CaptureSession::new(catalog, fast_config());
        let err = session.run(&device, &track).await.unwrap_err();
        assert!(matches!(err, CaptureError::Catalog(_)));
        assert_eq!(session.state(), CaptureState::PlaybackRequested);
    }
}
