//! Run request and report types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Everything needed to record one collection.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Collection URI, e.g. `catalog:playlist:<id>`.
    pub uri: String,
    /// Directory finished tracks are moved into.
    pub output_dir: PathBuf,
    /// Remove successfully recorded tracks from the source playlist
    /// once the run has been validated.
    pub purge: bool,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Number of tracks enumerated from the collection.
    pub tracks_total: usize,
    /// Number of tracks captured, assembled and placed.
    pub tracks_recorded: usize,
    /// Number of files found in the output directory afterwards.
    pub files_in_output: usize,
    /// Whether the source playlist was purged.
    pub purged: bool,
}
