//! Domain types for the remote catalog/playback service.

use serde::{Deserialize, Serialize};

/// A contributing artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
}

/// An artwork variant attached to an album.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Pixel height of the variant. The service may omit it for some sizes.
    pub height: Option<u32>,
    pub url: String,
}

/// Album metadata embedded in every track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub name: String,
    /// Ordered album artist credits; the first entry is the primary artist.
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub images: Vec<Image>,
}

/// A single track. Immutable once fetched; passed by reference through
/// the pipeline and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Opaque URI identifying the track on the service.
    pub uri: String,
    pub name: String,
    /// Ordinal position within the album.
    #[serde(default)]
    pub track_number: u32,
    #[serde(default)]
    pub artists: Vec<Artist>,
    pub album: Album,
}

impl Track {
    /// The first credited artist name, if any.
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.first().map(|a| a.name.as_str())
    }
}

/// Envelope the service wraps playlist entries in. The inner track is
/// absent for entries that have been removed upstream or are not
/// playable tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<Track>,
}

/// One page of a paginated listing, together with the total the service
/// reports for the whole collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u32,
}

/// A playback target currently visible to the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
}

/// The service's view of current playback. `None` from
/// [`CatalogClient::playback_state`](super::CatalogClient::playback_state)
/// means the service reports no playback at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub is_playing: bool,
}
