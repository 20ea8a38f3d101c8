use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Bitrate and capture timings are non-zero
/// - Staging paths are distinct
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.assembly.bitrate_kbps == 0 {
        return Err(ConfigError::ValidationError(
            "assembly.bitrate_kbps cannot be 0".to_string(),
        ));
    }

    if config.capture.poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "capture.poll_interval_ms cannot be 0".to_string(),
        ));
    }

    if config.orchestrator.staging.raw_path == config.orchestrator.staging.encoded_path {
        return Err(ConfigError::ValidationError(
            "staging raw_path and encoded_path must differ".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_zero_bitrate_fails() {
        let mut config = Config::default();
        config.assembly.bitrate_kbps = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_colliding_staging_paths_fail() {
        let mut config = Config::default();
        config.orchestrator.staging.encoded_path = config.orchestrator.staging.raw_path.clone();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
