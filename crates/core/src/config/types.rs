use serde::{Deserialize, Serialize};

use crate::assembly::AssemblyConfig;
use crate::capture::CaptureConfig;
use crate::catalog::CatalogConfig;
use crate::converter::ConverterConfig;
use crate::device::LocatorConfig;
use crate::orchestrator::OrchestratorConfig;
use crate::recorder::RecorderConfig;

/// Top-level application configuration. Every section has sensible
/// defaults, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub recorder: RecorderConfig,

    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub locator: LocatorConfig,

    #[serde(default)]
    pub converter: ConverterConfig,

    #[serde(default)]
    pub assembly: AssemblyConfig,

    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}
