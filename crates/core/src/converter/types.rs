//! Types for the converter module.

use std::path::PathBuf;

/// A single transcode request.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    /// Identifier for logs and diagnostics (the track URI in practice).
    pub job_id: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Target audio bitrate in kb/s.
    pub bitrate_kbps: u32,
}

/// Outcome of a completed transcode.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub job_id: String,
    pub output_path: PathBuf,
    pub output_size_bytes: u64,
    pub duration_ms: u64,
}
