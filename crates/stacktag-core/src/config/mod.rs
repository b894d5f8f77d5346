//! Configuration management for stacktag.
//!
//! Configuration is loaded from the platform config directory (falling back to
//! `~/.stacktag/config.toml`) with sensible defaults. Every section implements
//! `Default` so a partial (or missing) file still yields a complete config.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use crate::pipeline::ModelConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for stacktag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Dataset sampling and splitting
    pub dataset: DatasetConfig,

    /// TF-IDF vectorizer settings
    pub vectorizer: VectorizerConfig,

    /// ML-kNN classifier settings
    pub classifier: KnnConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.stacktag.stacktag/config.toml
    /// - Linux: ~/.config/stacktag/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\stacktag\config\config.toml
    ///
    /// Falls back to ~/.stacktag/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "stacktag", "stacktag")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".stacktag").join("config.toml")
            })
    }

    /// Get the resolved model directory path (with ~ expansion).
    pub fn model_dir(&self) -> PathBuf {
        let path_str = self.general.model_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Hyperparameters handed to `TagPipeline::fit`.
    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            vectorizer: self.vectorizer.clone(),
            classifier: self.classifier.clone(),
        }
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.classifier.k, 7);
        assert!((config.classifier.smoothing - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.vectorizer.max_features, 12000);
        assert!((config.dataset.sample_fraction - 0.10).abs() < f64::EPSILON);
        assert_eq!(config.dataset.seed, 42);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[classifier]"));
        assert!(toml.contains("[vectorizer]"));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.classifier.k, config.classifier.k);
        assert_eq!(parsed.vectorizer.stop_words, config.vectorizer.stop_words);
        assert_eq!(parsed.vectorizer.tokenizer, config.vectorizer.tokenizer);
    }

    #[test]
    fn test_load_from_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "[classifier]\nk = 3\n\n[vectorizer]\nstop_words = \"none\"").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.classifier.k, 3);
        assert!((config.classifier.smoothing - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.vectorizer.stop_words, StopWords::None);
        assert_eq!(config.vectorizer.max_features, 12000);
    }

    #[test]
    fn test_load_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[classifier]\nk = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("classifier.k"));
    }

    #[test]
    fn test_model_config_mirrors_sections() {
        let mut config = Config::default();
        config.classifier.k = 5;
        config.vectorizer.max_features = 100;
        let model = config.model_config();
        assert_eq!(model.classifier.k, 5);
        assert_eq!(model.vectorizer.max_features, 100);
    }
}
