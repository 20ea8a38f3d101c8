//! ID3 metadata writing via lofty.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lofty::config::WriteOptions;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::tag::{Accessor, ItemKey, Tag, TagExt, TagType};
use tracing::debug;

use super::error::TagError;

/// Metadata to embed into an encoded track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackTags {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub album_artist: String,
    pub track_number: u32,
    /// JPEG bytes for the front cover.
    pub artwork: Vec<u8>,
}

/// Writes metadata into an audio file on disk.
#[async_trait]
pub trait TagWriter: Send + Sync {
    async fn write(&self, path: &Path, tags: &TrackTags) -> Result<(), TagError>;
}

/// Tag writer backed by the lofty crate, producing ID3v2 frames.
pub struct LoftyTagWriter;

#[async_trait]
impl TagWriter for LoftyTagWriter {
    async fn write(&self, path: &Path, tags: &TrackTags) -> Result<(), TagError> {
        debug!(path = %path.display(), title = %tags.title, "writing tags");

        let path: PathBuf = path.to_path_buf();
        let tags = tags.clone();

        // lofty does blocking file I/O.
        tokio::task::spawn_blocking(move || write_id3v2(&path, &tags))
            .await
            .map_err(|_| TagError::TaskFailed)?
    }
}

fn write_id3v2(path: &Path, tags: &TrackTags) -> Result<(), TagError> {
    let mut tag = Tag::new(TagType::Id3v2);
    tag.set_title(tags.title.clone());
    tag.set_artist(tags.artist.clone());
    tag.set_album(tags.album.clone());
    tag.set_track(tags.track_number);
    tag.insert_text(ItemKey::AlbumArtist, tags.album_artist.clone());

    let picture = Picture::new_unchecked(
        PictureType::CoverFront,
        Some(MimeType::Jpeg),
        None,
        tags.artwork.clone(),
    );
    tag.push_picture(picture);

    tag.save_to_path(path, WriteOptions::default())
        .map_err(|e| TagError::WriteFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}
