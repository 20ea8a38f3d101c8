//! Turns a raw capture into a finished, tagged audio file.
//!
//! Assembly runs after playback capture has finished: the staged raw
//! recording is transcoded to MP3, the album cover is fetched, and the
//! metadata is written into the encoded file. The result stays in the
//! staging area; moving it into the output directory is the caller's job.

mod artwork;
mod error;
mod tags;

pub use artwork::{select_artwork, ArtworkFetcher, HttpArtworkFetcher};
pub use error::{AssemblyError, TagError};
pub use tags::{LoftyTagWriter, TagWriter, TrackTags};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::Track;
use crate::converter::{ConversionJob, Converter};

/// Artist name used when a track carries no credits at all.
const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Compilation marker; when the album credit is a various-artists
/// placeholder the track credit wins.
const VARIOUS_ARTISTS: &str = "Various Artists";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyConfig {
    /// Target bitrate for the encoded output, in kb/s.
    #[serde(default = "default_bitrate")]
    pub bitrate_kbps: u32,
}

fn default_bitrate() -> u32 {
    320
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            bitrate_kbps: default_bitrate(),
        }
    }
}

/// A fully assembled track, still sitting in the staging area.
#[derive(Debug, Clone)]
pub struct AssembledTrack {
    /// Final file name, derived from artist and title.
    pub filename: String,
    /// Path of the tagged file in the staging area.
    pub path: PathBuf,
}

/// Transcodes, tags and names one captured track.
pub struct AssemblyStage {
    converter: Arc<dyn Converter>,
    tagger: Arc<dyn TagWriter>,
    artwork: Arc<dyn ArtworkFetcher>,
    config: AssemblyConfig,
}

impl AssemblyStage {
    pub fn new(
        converter: Arc<dyn Converter>,
        tagger: Arc<dyn TagWriter>,
        artwork: Arc<dyn ArtworkFetcher>,
        config: AssemblyConfig,
    ) -> Self {
        Self {
            converter,
            tagger,
            artwork,
            config,
        }
    }

    /// Runs the full assembly for one track. `staged_path` is the raw
    /// capture, `encoded_path` is where the transcoded file goes.
    pub async fn assemble(
        &self,
        track: &Track,
        staged_path: &Path,
        encoded_path: &Path,
    ) -> Result<AssembledTrack, AssemblyError> {
        let artist = canonical_artist(track)?;
        let title = track.name.clone();

        debug!(%artist, %title, "assembling track");

        let job = ConversionJob {
            job_id: track.uri.clone(),
            input_path: staged_path.to_path_buf(),
            output_path: encoded_path.to_path_buf(),
            bitrate_kbps: self.config.bitrate_kbps,
        };
        let result = self.converter.convert(job).await?;
        debug!(
            size_bytes = result.output_size_bytes,
            duration_ms = result.duration_ms,
            "transcode finished"
        );

        let image = select_artwork(&track.album)?;
        let artwork = self.artwork.fetch(&image.url).await?;

        let tags = TrackTags {
            title: title.clone(),
            artist: display_artists(track),
            album: track.album.name.clone(),
            album_artist: join_names(&track.album.artists),
            track_number: track.track_number,
            artwork,
        };
        self.tagger.write(encoded_path, &tags).await?;

        let filename = format!("{}.mp3", sanitize_filename(&format!("{artist} - {title}")));
        info!(%filename, "track assembled");

        Ok(AssembledTrack {
            filename,
            path: encoded_path.to_path_buf(),
        })
    }
}

/// Joins every credited artist for the track-level artist frame.
pub fn display_artists(track: &Track) -> String {
    join_names(&track.artists)
}

fn join_names(artists: &[crate::catalog::Artist]) -> String {
    if artists.is_empty() {
        return UNKNOWN_ARTIST.to_string();
    }
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Resolves the single artist used for the album-artist frame and the
/// file name. Track and album credits must agree, except that a
/// various-artists album defers to the track.
pub fn canonical_artist(track: &Track) -> Result<String, AssemblyError> {
    let track_artist = track.primary_artist();
    let album_artist = track.album.artists.first().map(|a| a.name.as_str());

    match (track_artist, album_artist) {
        (None, None) => Ok(UNKNOWN_ARTIST.to_string()),
        (Some(t), None) => Ok(t.to_string()),
        (None, Some(a)) => Ok(a.to_string()),
        (Some(t), Some(a)) if t == a => Ok(t.to_string()),
        (Some(t), Some(a)) if a.contains(VARIOUS_ARTISTS) => {
            debug!(track_artist = t, "compilation album, using track artist");
            Ok(t.to_string())
        }
        (Some(t), Some(a)) => Err(AssemblyError::UnresolvedArtist {
            track_artist: t.to_string(),
            album_artist: a.to_string(),
        }),
    }
}

/// Strips path separators so the name is safe as a single file name.
/// Applying it twice gives the same result.
pub fn sanitize_filename(name: &str) -> String {
    name.replace(['/', '\\'], " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Album, Artist, Image, Track};
    use crate::testing::{MockArtworkFetcher, MockConverter, MockTagWriter};

    fn track_with_artists(track_artist: Option<&str>, album_artist: Option<&str>) -> Track {
        Track {
            uri: "catalog:track:1".to_string(),
            name: "Song".to_string(),
            track_number: 1,
            artists: track_artist
                .map(|n| {
                    vec![Artist {
                        name: n.to_string(),
                    }]
                })
                .unwrap_or_default(),
            album: Album {
                name: "Record".to_string(),
                artists: album_artist
                    .map(|n| {
                        vec![Artist {
                            name: n.to_string(),
                        }]
                    })
                    .unwrap_or_default(),
                images: vec![],
            },
        }
    }

    #[test]
    fn matching_credits_resolve() {
        let track = track_with_artists(Some("Ada"), Some("Ada"));
        assert_eq!(canonical_artist(&track).unwrap(), "Ada");
    }

    #[test]
    fn compilation_defers_to_track() {
        let track = track_with_artists(Some("Ada"), Some("Various Artists"));
        assert_eq!(canonical_artist(&track).unwrap(), "Ada");

        let track = track_with_artists(Some("Ada"), Some("Various Artists Vol. 2"));
        assert_eq!(canonical_artist(&track).unwrap(), "Ada");
    }

    #[test]
    fn disagreeing_credits_fail() {
        let track = track_with_artists(Some("Ada"), Some("Grace"));
        let err = canonical_artist(&track).unwrap_err();
        assert!(matches!(err, AssemblyError::UnresolvedArtist { .. }));
    }

    #[test]
    fn missing_credit_falls_back_to_the_other_side() {
        let track = track_with_artists(Some("Ada"), None);
        assert_eq!(canonical_artist(&track).unwrap(), "Ada");

        let track = track_with_artists(None, Some("Grace"));
        assert_eq!(canonical_artist(&track).unwrap(), "Grace");
    }

    #[test]
    fn fully_uncredited_track() {
        let track = track_with_artists(None, None);
        assert_eq!(canonical_artist(&track).unwrap(), "Unknown Artist");
        assert_eq!(display_artists(&track), "Unknown Artist");
    }

    #[test]
    fn multiple_artists_are_joined() {
        let mut track = track_with_artists(Some("Ada"), Some("Ada"));
        track.artists.push(Artist {
            name: "Grace".to_string(),
        });
        assert_eq!(display_artists(&track), "Ada; Grace");
    }

    fn stage_with_tagger(tagger: Arc<MockTagWriter>) -> AssemblyStage {
        AssemblyStage::new(
            Arc::new(MockConverter::new()),
            tagger,
            Arc::new(MockArtworkFetcher::new()),
            AssemblyConfig::default(),
        )
    }

    #[tokio::test]
    async fn assemble_fails_without_suitable_artwork() {
        let dir = tempfile::tempdir().unwrap();
        let mut track = track_with_artists(Some("Band"), Some("Band"));
        // Only an undersized variant: no 640px or 300px cover exists.
        track.album.images = vec![Image {
            height: Some(100),
            url: "http://img/tiny".to_string(),
        }];

        let tagger = Arc::new(MockTagWriter::new());
        let stage = stage_with_tagger(Arc::clone(&tagger));

        let err = stage
            .assemble(
                &track,
                &dir.path().join("raw.ogg"),
                &dir.path().join("enc.mp3"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AssemblyError::NoSuitableArtwork { .. }));
        // Nothing may be tagged once artwork selection has failed.
        assert!(tagger.recorded_writes().await.is_empty());
    }

    #[tokio::test]
    async fn assemble_embeds_the_selected_cover() {
        let dir = tempfile::tempdir().unwrap();
        let mut track = track_with_artists(Some("Band"), Some("Band"));
        track.album.images = vec![Image {
            height: Some(300),
            url: "http://img/medium".to_string(),
        }];

        let tagger = Arc::new(MockTagWriter::new());
        let stage = stage_with_tagger(Arc::clone(&tagger));

        let assembled = stage
            .assemble(
                &track,
                &dir.path().join("raw.ogg"),
                &dir.path().join("enc.mp3"),
            )
            .await
            .unwrap();

        assert_eq!(assembled.filename, "Band - Song.mp3");
        let writes = tagger.recorded_writes().await;
        assert_eq!(writes.len(), 1);
        assert!(!writes[0].1.artwork.is_empty());
    }

    #[test]
    fn sanitize_strips_separators() {
        assert_eq!(sanitize_filename("AC/DC - Back\\In Black"), "AC DC - Back In Black");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let once = sanitize_filename(" a/b\\c ");
        assert_eq!(sanitize_filename(&once), once);
    }
}
