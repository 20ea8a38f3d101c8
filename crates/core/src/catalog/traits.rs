//! Trait definition for the catalog/playback client.

use async_trait::async_trait;

use super::error::CatalogError;
use super::types::{Device, Page, PlaybackState, PlaylistItem, Track};

/// Client for the remote catalog/playback service.
///
/// All pipeline components talk to the service through this seam; the
/// production implementation is [`WebCatalogClient`](super::WebCatalogClient)
/// and tests use `testing::MockCatalogClient`.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Lists the playback targets currently visible to the account.
    async fn list_devices(&self) -> Result<Vec<Device>, CatalogError>;

    /// Starts playback of an explicit track list on the given device.
    async fn start_playback(
        &self,
        device_id: &str,
        track_uris: &[String],
    ) -> Result<(), CatalogError>;

    /// Reads the current playback status. Returns `None` when the service
    /// reports no playback context at all, which happens briefly right
    /// after a playback-start command.
    async fn playback_state(&self) -> Result<Option<PlaybackState>, CatalogError>;

    /// Fetches one page of playlist entries.
    async fn playlist_items(
        &self,
        playlist_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Page<PlaylistItem>, CatalogError>;

    /// Fetches one page of album tracks, with the album metadata embedded
    /// in every returned track.
    async fn album_tracks(
        &self,
        album_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Page<Track>, CatalogError>;

    /// Removes every occurrence of the given track URIs from a playlist.
    async fn remove_playlist_items(
        &self,
        playlist_id: &str,
        track_uris: &[String],
    ) -> Result<(), CatalogError>;
}
