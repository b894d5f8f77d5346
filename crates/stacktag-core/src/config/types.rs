//! Sub-configuration structs and their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use crate::knn::KnnConfig;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where the fitted encoder and pipeline are stored
    pub model_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("~/.stacktag/models"),
        }
    }
}

/// Dataset sampling and splitting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Fraction of rows kept after loading, in (0, 1]
    pub sample_fraction: f64,

    /// Seed for sampling and the train/test shuffle
    pub seed: u64,

    /// Fraction of the sampled rows held out for evaluation, in [0, 1)
    pub test_fraction: f64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            sample_fraction: 0.10,
            seed: 42,
            test_fraction: 0.25,
        }
    }
}

/// Stop-word list applied after tokenizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StopWords {
    /// Built-in English list
    #[default]
    English,
    /// Keep every token
    None,
}

/// Tokenization strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    /// Word runs that keep programming-name punctuation (`c#`, `c++`, `node.js`)
    #[default]
    Code,
    /// Split on whitespace only
    Whitespace,
}

/// TF-IDF vectorizer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Maximum number of terms kept, ranked by corpus frequency
    pub max_features: usize,

    /// Lowercase text before tokenizing
    pub lowercase: bool,

    /// Remove diacritics (NFKD, combining marks dropped)
    pub strip_accents: bool,

    /// Stop-word list
    pub stop_words: StopWords,

    /// Tokenizer used to split normalized text
    pub tokenizer: TokenizerKind,

    /// Remove HTML tags and decode common entities first.
    /// Post bodies are stored as HTML.
    pub strip_markup: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: 12000,
            lowercase: true,
            strip_accents: true,
            stop_words: StopWords::English,
            tokenizer: TokenizerKind::Code,
            strip_markup: true,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("json", "jsonl" or "text")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,

    /// Attach posterior confidence to each predicted tag
    pub include_scores: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            pretty: false,
            include_scores: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
