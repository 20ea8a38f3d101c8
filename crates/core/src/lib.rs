pub mod assembly;
pub mod capture;
pub mod catalog;
pub mod collection;
pub mod config;
pub mod converter;
pub mod device;
pub mod orchestrator;
pub mod recorder;
pub mod testing;

pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use orchestrator::{RunError, RunOrchestrator, RunReport, RunRequest};
