//! Error types for track assembly.

use thiserror::Error;

use crate::converter::ConverterError;

/// Errors that can occur while assembling a finished track.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// Track and album credits disagree and no rule picks a winner.
    #[error("Conflicting artist credits: track says {track_artist:?}, album says {album_artist:?}")]
    UnresolvedArtist {
        track_artist: String,
        album_artist: String,
    },

    /// The album carries no artwork at an acceptable resolution.
    #[error("No suitable artwork for album: {album}")]
    NoSuitableArtwork { album: String },

    /// Artwork was selected but could not be downloaded.
    #[error("Failed to fetch artwork from {url}: {reason}")]
    ArtworkFetchFailed { url: String, reason: String },

    #[error(transparent)]
    Converter(#[from] ConverterError),

    #[error(transparent)]
    Tag(#[from] TagError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from writing metadata into an encoded file.
#[derive(Debug, Error)]
pub enum TagError {
    #[error("Failed to write tags to {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("Tag task panicked")]
    TaskFailed,
}
