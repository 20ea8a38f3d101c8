//! Testing utilities: mock collaborators and fixture builders.
//!
//! Every external seam in the pipeline has a mock here, so unit tests
//! and the lifecycle tests in `tests/` can script the catalog service,
//! the recorder process and the transcoder without touching the network
//! or spawning anything.
//!
//! ```rust,ignore
//! use tapedeck_core::testing::{MockCatalogClient, fixtures};
//!
//! let catalog = MockCatalogClient::new();
//! catalog.set_devices(vec![fixtures::device("dev-1", "_comp_")]).await;
//! ```

mod mock_artwork;
mod mock_catalog;
mod mock_converter;
mod mock_recorder;
mod mock_tagger;

pub use mock_artwork::MockArtworkFetcher;
pub use mock_catalog::MockCatalogClient;
pub use mock_converter::MockConverter;
pub use mock_recorder::MockRecorder;
pub use mock_tagger::MockTagWriter;

/// Builders for commonly needed domain values.
pub mod fixtures {
    use crate::catalog::{Album, Artist, Device, Image, PlaylistItem, Track};

    /// A playback device with the given id and name.
    pub fn device(id: &str, name: &str) -> Device {
        Device {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    /// A track credited to a single artist, on an album by the same
    /// artist, with full-size cover art.
    pub fn track(uri: &str, name: &str, artist: &str) -> Track {
        Track {
            uri: uri.to_string(),
            name: name.to_string(),
            track_number: 1,
            artists: vec![Artist {
                name: artist.to_string(),
            }],
            album: Album {
                name: "Test Album".to_string(),
                artists: vec![Artist {
                    name: artist.to_string(),
                }],
                images: vec![Image {
                    height: Some(640),
                    url: format!("http://covers.test/{name}/640"),
                }],
            },
        }
    }

    /// A playlist envelope wrapping [`track`], credited to "Band".
    pub fn playlist_item(uri: &str, name: &str) -> PlaylistItem {
        PlaylistItem {
            track: Some(track(uri, name, "Band")),
        }
    }
}
