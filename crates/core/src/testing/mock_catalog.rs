//! Mock catalog client for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::{
    CatalogClient, CatalogError, Device, Page, PlaybackState, PlaylistItem, Track,
};

/// Mock implementation of the [`CatalogClient`] trait.
///
/// Provides controllable behavior for testing:
/// - Seed playlists, albums and device listings
/// - Script the playback-status sequence a capture session will observe
/// - Record playback commands, page requests and removals for assertions
/// - Inject a one-shot error into the next call
#[derive(Debug)]
pub struct MockCatalogClient {
    devices: Arc<RwLock<Vec<Device>>>,
    /// Per-call device listings; once drained, `devices` is served.
    device_queue: Arc<RwLock<VecDeque<Vec<Device>>>>,
    device_calls: Arc<RwLock<usize>>,
    /// Scripted playback states. When drained, playback reads as stopped
    /// so polling loops always terminate.
    playback_queue: Arc<RwLock<VecDeque<Option<PlaybackState>>>>,
    playlists: Arc<RwLock<HashMap<String, (Vec<PlaylistItem>, u32)>>>,
    albums: Arc<RwLock<HashMap<String, (Vec<Track>, u32)>>>,
    playlist_requests: Arc<RwLock<Vec<u32>>>,
    album_requests: Arc<RwLock<Vec<u32>>>,
    playback_commands: Arc<RwLock<Vec<(String, Vec<String>)>>>,
    removals: Arc<RwLock<Vec<(String, Vec<String>)>>>,
    /// If set, the next call will fail with this error.
    next_error: Arc<RwLock<Option<CatalogError>>>,
}

impl Default for MockCatalogClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalogClient {
    /// Create a new mock catalog client.
    pub fn new() -> Self {
        Self {
            devices: Arc::new(RwLock::new(Vec::new())),
            device_queue: Arc::new(RwLock::new(VecDeque::new())),
            device_calls: Arc::new(RwLock::new(0)),
            playback_queue: Arc::new(RwLock::new(VecDeque::new())),
            playlists: Arc::new(RwLock::new(HashMap::new())),
            albums: Arc::new(RwLock::new(HashMap::new())),
            playlist_requests: Arc::new(RwLock::new(Vec::new())),
            album_requests: Arc::new(RwLock::new(Vec::new())),
            playback_commands: Arc::new(RwLock::new(Vec::new())),
            removals: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the devices returned by every listing call.
    pub async fn set_devices(&self, devices: Vec<Device>) {
        *self.devices.write().await = devices;
    }

    /// Queue one listing per upcoming `list_devices` call.
    pub async fn queue_device_listings(&self, listings: Vec<Vec<Device>>) {
        self.device_queue.write().await.extend(listings);
    }

    /// Number of `list_devices` calls made so far.
    pub async fn device_listing_calls(&self) -> usize {
        *self.device_calls.read().await
    }

    /// Script the sequence of playback states to report.
    pub async fn queue_playback_states(&self, states: Vec<Option<PlaybackState>>) {
        self.playback_queue.write().await.extend(states);
    }

    /// Seed a playlist with its items and the total the service claims.
    pub async fn set_playlist(&self, id: &str, items: Vec<PlaylistItem>, total: u32) {
        self.playlists
            .write()
            .await
            .insert(id.to_string(), (items, total));
    }

    /// Seed an album with its tracks and the total the service claims.
    pub async fn set_album(&self, id: &str, tracks: Vec<Track>, total: u32) {
        self.albums
            .write()
            .await
            .insert(id.to_string(), (tracks, total));
    }

    /// Offsets of every playlist page request, in order.
    pub async fn playlist_requests(&self) -> Vec<u32> {
        self.playlist_requests.read().await.clone()
    }

    /// Offsets of every album page request, in order.
    pub async fn album_requests(&self) -> Vec<u32> {
        self.album_requests.read().await.clone()
    }

    /// Every playback command issued, as (device id, track uris).
    pub async fn recorded_playback(&self) -> Vec<(String, Vec<String>)> {
        self.playback_commands.read().await.clone()
    }

    /// Every removal request issued, as (playlist id, track uris).
    pub async fn recorded_removals(&self) -> Vec<(String, Vec<String>)> {
        self.removals.read().await.clone()
    }

    /// Make the next call fail with the given error.
    pub async fn set_next_error(&self, error: CatalogError) {
        *self.next_error.write().await = Some(error);
    }

    async fn check_next_error(&self) -> Result<(), CatalogError> {
        match self.next_error.write().await.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn page_of<T: Clone>(items: &[T], limit: u32, offset: u32, total: u32) -> Page<T> {
    let start = (offset as usize).min(items.len());
    let end = (start + limit as usize).min(items.len());
    Page {
        items: items[start..end].to_vec(),
        total,
    }
}

#[async_trait]
impl CatalogClient for MockCatalogClient {
    async fn list_devices(&self) -> Result<Vec<Device>, CatalogError> {
        self.check_next_error().await?;
        *self.device_calls.write().await += 1;
        if let Some(listing) = self.device_queue.write().await.pop_front() {
            return Ok(listing);
        }
        Ok(self.devices.read().await.clone())
    }

    async fn start_playback(
        &self,
        device_id: &str,
        track_uris: &[String],
    ) -> Result<(), CatalogError> {
        self.check_next_error().await?;
        self.playback_commands
            .write()
            .await
            .push((device_id.to_string(), track_uris.to_vec()));
        Ok(())
    }

    async fn playback_state(&self) -> Result<Option<PlaybackState>, CatalogError> {
        self.check_next_error().await?;
        match self.playback_queue.write().await.pop_front() {
            Some(state) => Ok(state),
            None => Ok(Some(PlaybackState { is_playing: false })),
        }
    }

    async fn playlist_items(
        &self,
        playlist_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Page<PlaylistItem>, CatalogError> {
        self.check_next_error().await?;
        self.playlist_requests.write().await.push(offset);
        let playlists = self.playlists.read().await;
        let (items, total) = playlists
            .get(playlist_id)
            .ok_or_else(|| CatalogError::NotFound(format!("playlist {playlist_id}")))?;
        Ok(page_of(items, limit, offset, *total))
    }

    async fn album_tracks(
        &self,
        album_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Page<Track>, CatalogError> {
        self.check_next_error().await?;
        self.album_requests.write().await.push(offset);
        let albums = self.albums.read().await;
        let (tracks, total) = albums
            .get(album_id)
            .ok_or_else(|| CatalogError::NotFound(format!("album {album_id}")))?;
        Ok(page_of(tracks, limit, offset, *total))
    }

    async fn remove_playlist_items(
        &self,
        playlist_id: &str,
        track_uris: &[String],
    ) -> Result<(), CatalogError> {
        self.check_next_error().await?;
        self.removals
            .write()
            .await
            .push((playlist_id.to_string(), track_uris.to_vec()));
        Ok(())
    }
}
