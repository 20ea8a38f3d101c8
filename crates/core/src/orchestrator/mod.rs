//! Run orchestration: ties enumeration, capture, assembly and placement
//! into a single sequential pipeline.

mod config;
mod runner;
mod types;

pub use config::{OrchestratorConfig, StagingConfig};
pub use runner::{list_output_files, RunError, RunOrchestrator};
pub use types::{RunReport, RunRequest};
