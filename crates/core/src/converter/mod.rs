//! Converter module for transcoding captured audio.
//!
//! The transcoder is an external collaborator; this module defines the
//! `Converter` seam and an FFmpeg implementation that re-encodes the raw
//! staged capture to MP3 at a fixed bitrate.

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::ConverterConfig;
pub use error::ConverterError;
pub use ffmpeg::FfmpegConverter;
pub use traits::Converter;
pub use types::{ConversionJob, ConversionResult};
