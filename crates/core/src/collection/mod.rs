//! Collection enumeration.
//!
//! Paginates a remote playlist or album into a complete, ordered track
//! list and validates that the fetched count matches the total the
//! service reports.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::{CatalogClient, CatalogError, Track};

/// Page size for playlist listings (the service's maximum).
pub const PLAYLIST_PAGE_SIZE: u32 = 100;
/// Page size for album listings (the service's maximum).
pub const ALBUM_PAGE_SIZE: u32 = 50;

/// Errors from collection enumeration.
#[derive(Debug, Error)]
pub enum CollectionError {
    /// The URI is not a recognizable playlist or album reference.
    #[error("unsupported collection uri: {0}")]
    UnsupportedUri(String),

    /// Cumulative fetched count never reached the reported total. The
    /// collection is assumed unstable or misreported; not retried.
    #[error("collection reports {expected} tracks but only {fetched} were fetched")]
    IncompleteCollection { expected: u32, fetched: usize },

    /// A playlist entry had no inner track or an empty URI.
    #[error("malformed playlist item at position {position}")]
    MalformedItem { position: usize },

    /// Underlying API failure.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// The kind of collection a source URI points at. Selects both the
/// pagination protocol and whether a purge is possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionSource {
    Playlist(String),
    Album(String),
}

impl CollectionSource {
    /// Parses a source URI of the form `<scheme>:playlist:<id>` or
    /// `<scheme>:album:<id>`.
    pub fn parse(uri: &str) -> Result<Self, CollectionError> {
        let mut parts = uri.splitn(3, ':');
        let (_scheme, kind, id) = match (parts.next(), parts.next(), parts.next()) {
            (Some(scheme), Some(kind), Some(id))
                if !scheme.is_empty() && !id.is_empty() =>
            {
                (scheme, kind, id)
            }
            _ => return Err(CollectionError::UnsupportedUri(uri.to_string())),
        };

        match kind {
            "playlist" => Ok(Self::Playlist(id.to_string())),
            "album" => Ok(Self::Album(id.to_string())),
            _ => Err(CollectionError::UnsupportedUri(uri.to_string())),
        }
    }

    /// The collection id on the service.
    pub fn id(&self) -> &str {
        match self {
            Self::Playlist(id) | Self::Album(id) => id,
        }
    }
}

impl fmt::Display for CollectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Playlist(id) => write!(f, "playlist {}", id),
            Self::Album(id) => write!(f, "album {}", id),
        }
    }
}

/// Paginates a collection into its full ordered track list.
pub struct CollectionEnumerator {
    catalog: Arc<dyn CatalogClient>,
}

impl CollectionEnumerator {
    pub fn new(catalog: Arc<dyn CatalogClient>) -> Self {
        Self { catalog }
    }

    /// Fetches every track of the collection, in service order.
    pub async fn fetch(&self, source: &CollectionSource) -> Result<Vec<Track>, CollectionError> {
        let tracks = match source {
            CollectionSource::Playlist(id) => self.fetch_playlist(id).await?,
            CollectionSource::Album(id) => self.fetch_album(id).await?,
        };
        info!(%source, count = tracks.len(), "collection enumerated");
        Ok(tracks)
    }

    async fn fetch_playlist(&self, id: &str) -> Result<Vec<Track>, CollectionError> {
        let mut tracks = Vec::new();
        let mut offset = 0u32;

        let first = self
            .catalog
            .playlist_items(id, PLAYLIST_PAGE_SIZE, offset)
            .await?;
        let total = first.total;
        debug!(playlist = id, total, "playlist size reported");

        let mut pages = vec![first.items];
        offset += PLAYLIST_PAGE_SIZE;

        while offset < total {
            let page = self
                .catalog
                .playlist_items(id, PLAYLIST_PAGE_SIZE, offset)
                .await?;
            pages.push(page.items);
            offset += PLAYLIST_PAGE_SIZE;
        }

        // Unwrap the playlist envelopes; entry order defines track order.
        for (position, item) in pages.into_iter().flatten().enumerate() {
            let track = match item.track {
                Some(track) if !track.uri.is_empty() => track,
                _ => return Err(CollectionError::MalformedItem { position }),
            };
            tracks.push(track);
        }

        if tracks.len() != total as usize {
            return Err(CollectionError::IncompleteCollection {
                expected: total,
                fetched: tracks.len(),
            });
        }

        Ok(tracks)
    }

    async fn fetch_album(&self, id: &str) -> Result<Vec<Track>, CollectionError> {
        let mut tracks = Vec::new();
        let mut offset = 0u32;

        let first = self.catalog.album_tracks(id, ALBUM_PAGE_SIZE, offset).await?;
        let total = first.total;
        debug!(album = id, total, "album size reported");

        tracks.extend(first.items);
        offset += ALBUM_PAGE_SIZE;

        while offset < total {
            let page = self.catalog.album_tracks(id, ALBUM_PAGE_SIZE, offset).await?;
            tracks.extend(page.items);
            offset += ALBUM_PAGE_SIZE;
        }

        if tracks.len() != total as usize {
            return Err(CollectionError::IncompleteCollection {
                expected: total,
                fetched: tracks.len(),
            });
        }

        Ok(tracks)
    }
}
