use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("TAPEDECK_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn empty_config_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.capture.poll_interval_ms, 2000);
        assert_eq!(config.locator.max_retries, 5);
        assert_eq!(config.assembly.bitrate_kbps, 320);
        assert_eq!(config.recorder.device_name, "_comp_");
    }

    #[test]
    fn sections_override_defaults() {
        let toml = r#"
[capture]
poll_interval_ms = 500

[recorder]
device_name = "studio"
bitrate_kbps = 160
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.capture.poll_interval_ms, 500);
        assert_eq!(config.recorder.device_name, "studio");
        assert_eq!(config.recorder.bitrate_kbps, 160);
        // Untouched sections keep their defaults.
        assert_eq!(config.capture.settle_delay_ms, 2000);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let result = load_config_from_str("[capture\npoll = ");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn missing_file_is_reported() {
        let result = load_config(Path::new("/nonexistent/tapedeck.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn loads_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[orchestrator.staging]
raw_path = "/var/tmp/raw.ogg"

[converter]
timeout_secs = 60
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(
            config.orchestrator.staging.raw_path,
            PathBuf::from("/var/tmp/raw.ogg")
        );
        assert_eq!(config.converter.timeout_secs, 60);
    }
}
