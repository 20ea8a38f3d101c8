//! Web API implementation of the catalog/playback client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::error::CatalogError;
use super::session::{Credentials, Session};
use super::traits::CatalogClient;
use super::types::{Album, Artist, Device, Page, PlaybackState, PlaylistItem, Track};

/// Configuration for the web catalog client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the catalog/playback API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Token endpoint used to exchange credentials for a session.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_auth_url() -> String {
    "https://accounts.spotify.com/api/token".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_url: default_auth_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Catalog client talking to the service's web API with a bearer session.
pub struct WebCatalogClient {
    client: Client,
    base_url: String,
    session: Session,
}

impl WebCatalogClient {
    /// Authenticates and returns a ready client. The session lives as long
    /// as the client; callers drop the whole client at run end.
    pub async fn connect(
        config: CatalogConfig,
        credentials: &Credentials,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let session = Session::authenticate(&client, &config.auth_url, credentials).await?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn map_transport(e: reqwest::Error) -> CatalogError {
        if e.is_timeout() {
            CatalogError::Timeout
        } else {
            CatalogError::Http(e)
        }
    }

    /// Maps non-success statuses to typed errors; passes the response
    /// through untouched otherwise.
    async fn check_status(response: Response, context: &str) -> Result<Response, CatalogError> {
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimitExceeded);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(context.to_string()));
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(CatalogError::AuthenticationFailed(format!(
                "{} returned {}",
                context, status
            )));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CatalogError::ApiError {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        context: &str,
    ) -> Result<T, CatalogError> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(self.session.bearer_token())
            .query(query)
            .send()
            .await
            .map_err(Self::map_transport)?;

        let response = Self::check_status(response, context).await?;

        response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(format!("{}: {}", context, e)))
    }
}

#[async_trait]
impl CatalogClient for WebCatalogClient {
    async fn list_devices(&self) -> Result<Vec<Device>, CatalogError> {
        let listing: DeviceListing = self
            .get_json("/me/player/devices", &[], "device listing")
            .await?;

        Ok(listing
            .devices
            .into_iter()
            .filter_map(|d| d.id.map(|id| Device { id, name: d.name }))
            .collect())
    }

    async fn start_playback(
        &self,
        device_id: &str,
        track_uris: &[String],
    ) -> Result<(), CatalogError> {
        debug!(device_id, ?track_uris, "starting playback");

        let response = self
            .client
            .put(self.url("/me/player/play"))
            .bearer_auth(self.session.bearer_token())
            .query(&[("device_id", device_id)])
            .json(&json!({ "uris": track_uris }))
            .send()
            .await
            .map_err(Self::map_transport)?;

        Self::check_status(response, "playback start").await?;
        Ok(())
    }

    async fn playback_state(&self) -> Result<Option<PlaybackState>, CatalogError> {
        let response = self
            .client
            .get(self.url("/me/player"))
            .bearer_auth(self.session.bearer_token())
            .send()
            .await
            .map_err(Self::map_transport)?;

        // The service answers with an empty 204 when there is no playback
        // context yet.
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let response = Self::check_status(response, "playback state").await?;
        let state: PlaybackState = response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(format!("playback state: {}", e)))?;

        Ok(Some(state))
    }

    async fn playlist_items(
        &self,
        playlist_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Page<PlaylistItem>, CatalogError> {
        let path = format!("/playlists/{}/tracks", urlencoding::encode(playlist_id));
        self.get_json(
            &path,
            &[
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
                ("additional_types", "track".to_string()),
            ],
            "playlist items",
        )
        .await
    }

    async fn album_tracks(
        &self,
        album_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Page<Track>, CatalogError> {
        // Album track listings come back without the album object, so the
        // album metadata is fetched alongside and embedded into each track.
        let album_path = format!("/albums/{}", urlencoding::encode(album_id));
        let album: Album = self.get_json(&album_path, &[], "album").await?;

        let tracks_path = format!("{}/tracks", album_path);
        let page: Page<SimplifiedTrack> = self
            .get_json(
                &tracks_path,
                &[
                    ("limit", limit.to_string()),
                    ("offset", offset.to_string()),
                ],
                "album tracks",
            )
            .await?;

        Ok(Page {
            total: page.total,
            items: page
                .items
                .into_iter()
                .map(|t| t.into_track(album.clone()))
                .collect(),
        })
    }

    async fn remove_playlist_items(
        &self,
        playlist_id: &str,
        track_uris: &[String],
    ) -> Result<(), CatalogError> {
        debug!(playlist_id, count = track_uris.len(), "removing playlist items");

        let tracks: Vec<_> = track_uris.iter().map(|uri| json!({ "uri": uri })).collect();

        let response = self
            .client
            .delete(self.url(&format!(
                "/playlists/{}/tracks",
                urlencoding::encode(playlist_id)
            )))
            .bearer_auth(self.session.bearer_token())
            .json(&json!({ "tracks": tracks }))
            .send()
            .await
            .map_err(Self::map_transport)?;

        Self::check_status(response, "playlist item removal").await?;
        Ok(())
    }
}

// ============================================================================
// Wire types private to the web implementation
// ============================================================================

#[derive(Debug, Deserialize)]
struct DeviceListing {
    #[serde(default)]
    devices: Vec<WireDevice>,
}

#[derive(Debug, Deserialize)]
struct WireDevice {
    /// Devices in a restricted state come back without an id.
    id: Option<String>,
    name: String,
}

/// Track shape returned by album listings: no embedded album.
#[derive(Debug, Deserialize)]
struct SimplifiedTrack {
    uri: String,
    name: String,
    #[serde(default)]
    track_number: u32,
    #[serde(default)]
    artists: Vec<Artist>,
}

impl SimplifiedTrack {
    fn into_track(self, album: Album) -> Track {
        Track {
            uri: self.uri,
            name: self.name,
            track_number: self.track_number,
            artists: self.artists,
            album,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playlist_page_parses_with_null_entries() {
        let body = r#"{
            "total": 3,
            "items": [
                {
                    "track": {
                        "uri": "svc:track:a",
                        "name": "First",
                        "track_number": 1,
                        "artists": [{"name": "Someone"}],
                        "album": {
                            "name": "Record",
                            "artists": [{"name": "Someone"}],
                            "images": [{"height": 640, "url": "http://img/1"}]
                        }
                    }
                },
                { "track": null }
            ]
        }"#;

        let page: Page<PlaylistItem> = serde_json::from_str(body).unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);
        assert!(page.items[1].track.is_none());

        let track = page.items[0].track.as_ref().unwrap();
        assert_eq!(track.uri, "svc:track:a");
        assert_eq!(track.album.images[0].height, Some(640));
    }

    #[test]
    fn device_listing_skips_idless_devices() {
        let body = r#"{
            "devices": [
                {"id": "dev-1", "name": "_comp_"},
                {"id": null, "name": "restricted"}
            ]
        }"#;

        let listing: DeviceListing = serde_json::from_str(body).unwrap();
        let devices: Vec<Device> = listing
            .devices
            .into_iter()
            .filter_map(|d| d.id.map(|id| Device { id, name: d.name }))
            .collect();

        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "_comp_");
    }

    #[test]
    fn simplified_track_embeds_album() {
        let body = r#"{
            "total": 1,
            "items": [
                {"uri": "svc:track:b", "name": "Only", "track_number": 4, "artists": [{"name": "Band"}]}
            ]
        }"#;

        let page: Page<SimplifiedTrack> = serde_json::from_str(body).unwrap();
        let album = Album {
            name: "LP".to_string(),
            artists: vec![Artist {
                name: "Band".to_string(),
            }],
            images: vec![],
        };

        let track = page.items.into_iter().next().unwrap().into_track(album);
        assert_eq!(track.album.name, "LP");
        assert_eq!(track.track_number, 4);
    }
}
