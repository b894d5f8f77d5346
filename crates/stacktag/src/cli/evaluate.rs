//! The `stacktag evaluate` command: score a trained tagger on labelled posts.

use clap::Args;
use stacktag_core::{Config, Dataset, OutputWriter};
use std::io::BufWriter;
use std::path::PathBuf;

use super::OutputFormat;

/// Arguments for the `evaluate` command.
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// CSV export with Title, Body, and Tags columns
    #[arg(short, long)]
    pub data: PathBuf,

    /// Output format for the report (defaults to the configured format)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Directory holding the trained artifacts (overrides config)
    #[arg(long, env = "STACKTAG_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,
}

/// Execute the evaluate command.
pub fn execute(args: EvaluateArgs) -> anyhow::Result<()> {
    let config = Config::load()?;
    if !args.data.exists() {
        anyhow::bail!(
            "Dataset not found: {:?}\n\n  Hint: Check the file path and try again.",
            args.data
        );
    }

    let store = super::model_store(args.model_dir, &config);
    let tagger = super::load_tagger(&store)?;

    let dataset = Dataset::from_csv_path(&args.data)?;
    if dataset.is_empty() {
        anyhow::bail!("No usable rows in {:?}", args.data);
    }
    tracing::info!("Evaluating on {} posts", dataset.len());
    let report = tagger.evaluate(dataset.posts())?;

    let format = super::resolve_format(args.format, &config);
    let stdout = std::io::stdout();
    let mut writer = OutputWriter::new(BufWriter::new(stdout.lock()), format, config.output.pretty);
    writer.write(&report)?;
    writer.flush()?;
    Ok(())
}
