//! CLI command implementations.

pub mod config;
pub mod evaluate;
pub mod predict;
pub mod train;

use clap::ValueEnum;
use stacktag_core::{ArtifactStore, Config, OutputFormat as CoreOutputFormat, Tagger};
use std::path::PathBuf;

/// Supported output formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object or array
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
    /// Human-readable text
    Text,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
            OutputFormat::Text => CoreOutputFormat::Text,
        }
    }
}

/// Output format from the command line, falling back to `[output] format`.
pub(crate) fn resolve_format(flag: Option<OutputFormat>, config: &Config) -> CoreOutputFormat {
    flag.map(CoreOutputFormat::from)
        .or_else(|| CoreOutputFormat::parse(&config.output.format))
        .unwrap_or(CoreOutputFormat::Text)
}

/// Artifact store at `--model-dir`, or the configured model directory.
pub(crate) fn model_store(model_dir: Option<PathBuf>, config: &Config) -> ArtifactStore {
    ArtifactStore::new(model_dir.unwrap_or_else(|| config.model_dir()))
}

/// Load the trained tagger, with a hint when nothing has been trained yet.
pub(crate) fn load_tagger(store: &ArtifactStore) -> anyhow::Result<Tagger> {
    if !Tagger::exists(store) {
        anyhow::bail!(
            "No trained model found in {}\n\n  \
             Hint: Run `stacktag train --data <csv>` first, or pass --model-dir.",
            store.dir().display()
        );
    }
    Ok(Tagger::load(store)?)
}
