//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::output::OutputFormat;

use super::Config;

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fraction = self.dataset.sample_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(ConfigError::ValidationError(
                "dataset.sample_fraction must be in (0.0, 1.0]".into(),
            ));
        }
        let test = self.dataset.test_fraction;
        if !(0.0..1.0).contains(&test) {
            return Err(ConfigError::ValidationError(
                "dataset.test_fraction must be in [0.0, 1.0)".into(),
            ));
        }
        if self.vectorizer.max_features == 0 {
            return Err(ConfigError::ValidationError(
                "vectorizer.max_features must be > 0".into(),
            ));
        }
        if self.classifier.k == 0 {
            return Err(ConfigError::ValidationError(
                "classifier.k must be > 0".into(),
            ));
        }
        if !self.classifier.smoothing.is_finite() || self.classifier.smoothing < 0.0 {
            return Err(ConfigError::ValidationError(
                "classifier.smoothing must be a finite value >= 0.0".into(),
            ));
        }
        if OutputFormat::parse(&self.output.format).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "output.format must be one of json, jsonl, text (got '{}')",
                self.output.format
            )));
        }
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {} (got '{}')",
                LOG_LEVELS.join(", "),
                self.logging.level
            )));
        }
        if self.logging.format != "pretty" && self.logging.format != "json" {
            return Err(ConfigError::ValidationError(
                "logging.format must be \"pretty\" or \"json\"".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_k() {
        let mut config = Config::default();
        config.classifier.k = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("classifier.k"));
    }

    #[test]
    fn test_validate_rejects_negative_smoothing() {
        let mut config = Config::default();
        config.classifier.smoothing = -0.1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("smoothing"));

        config.classifier.smoothing = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_sample_fraction_out_of_range() {
        let mut config = Config::default();
        config.dataset.sample_fraction = 0.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sample_fraction"));

        config.dataset.sample_fraction = 1.5;
        assert!(config.validate().is_err());

        config.dataset.sample_fraction = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_full_test_fraction() {
        let mut config = Config::default();
        config.dataset.test_fraction = 1.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("test_fraction"));

        config.dataset.test_fraction = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_max_features() {
        let mut config = Config::default();
        config.vectorizer.max_features = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_features"));
    }

    #[test]
    fn test_validate_rejects_unknown_formats() {
        let mut config = Config::default();
        config.output.format = "xml".into();
        assert!(config.validate().unwrap_err().to_string().contains("output.format"));

        let mut config = Config::default();
        config.logging.level = "loud".into();
        assert!(config.validate().unwrap_err().to_string().contains("logging.level"));

        let mut config = Config::default();
        config.logging.format = "yaml".into();
        assert!(config.validate().unwrap_err().to_string().contains("logging.format"));
    }
}
