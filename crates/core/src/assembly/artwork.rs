//! Album artwork selection and retrieval.

use async_trait::async_trait;
use tracing::debug;

use crate::catalog::{Album, Image};

use super::error::AssemblyError;

/// Preferred artwork heights, in order. The catalog serves covers at a
/// few fixed resolutions; 640px is the full-size variant.
const PREFERRED_HEIGHTS: [u32; 2] = [640, 300];

/// Picks the cover image to embed for an album.
pub fn select_artwork(album: &Album) -> Result<&Image, AssemblyError> {
    for height in PREFERRED_HEIGHTS {
        if let Some(image) = album
            .images
            .iter()
            .find(|img| img.height == Some(height))
        {
            return Ok(image);
        }
    }
    Err(AssemblyError::NoSuitableArtwork {
        album: album.name.clone(),
    })
}

/// Downloads cover art bytes.
#[async_trait]
pub trait ArtworkFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AssemblyError>;
}

/// Fetches artwork over HTTP.
pub struct HttpArtworkFetcher {
    client: reqwest::Client,
}

impl HttpArtworkFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpArtworkFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArtworkFetcher for HttpArtworkFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AssemblyError> {
        debug!(url, "fetching artwork");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AssemblyError::ArtworkFetchFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(AssemblyError::ArtworkFetchFailed {
                url: url.to_string(),
                reason: format!("HTTP status {}", response.status()),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AssemblyError::ArtworkFetchFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if bytes.is_empty() {
            return Err(AssemblyError::ArtworkFetchFailed {
                url: url.to_string(),
                reason: "empty response body".to_string(),
            });
        }

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Artist, Image};

    fn album_with_images(images: Vec<Image>) -> Album {
        Album {
            name: "Test Album".to_string(),
            artists: vec![Artist {
                name: "Tester".to_string(),
            }],
            images,
        }
    }

    fn image(height: u32, url: &str) -> Image {
        Image {
            height: Some(height),
            url: url.to_string(),
        }
    }

    #[test]
    fn full_size_cover_wins() {
        let album = album_with_images(vec![
            image(300, "http://img/medium"),
            image(640, "http://img/large"),
            image(64, "http://img/small"),
        ]);
        assert_eq!(select_artwork(&album).unwrap().url, "http://img/large");
    }

    #[test]
    fn medium_cover_is_the_fallback() {
        let album = album_with_images(vec![image(64, "http://img/small"), image(300, "http://img/medium")]);
        assert_eq!(select_artwork(&album).unwrap().url, "http://img/medium");
    }

    #[test]
    fn odd_resolutions_are_rejected() {
        let album = album_with_images(vec![
            image(64, "http://img/small"),
            Image {
                height: None,
                url: "http://img/unknown".to_string(),
            },
        ]);
        let err = select_artwork(&album).unwrap_err();
        assert!(matches!(err, AssemblyError::NoSuitableArtwork { .. }));
    }

    #[test]
    fn no_images_at_all() {
        let album = album_with_images(vec![]);
        assert!(select_artwork(&album).is_err());
    }
}
