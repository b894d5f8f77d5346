//! The `stacktag predict` command for tagging a single post.

use clap::Args;
use stacktag_core::{Config, OutputWriter};
use std::io::BufWriter;
use std::path::PathBuf;

use super::OutputFormat;

/// Arguments for the `predict` command.
#[derive(Args, Debug, Default)]
pub struct PredictArgs {
    /// Post title
    #[arg(short, long, default_value = "")]
    pub title: String,

    /// Post body (HTML is fine)
    #[arg(short, long, conflicts_with = "body_file")]
    pub body: Option<String>,

    /// Read the post body from a file ("-" for stdin)
    #[arg(long)]
    pub body_file: Option<PathBuf>,

    /// Output format (defaults to the configured format)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Directory holding the trained artifacts (overrides config)
    #[arg(long, env = "STACKTAG_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,
}

/// Post body from `--body`, `--body-file`, or nothing.
fn read_body(args: &PredictArgs) -> anyhow::Result<String> {
    if let Some(body) = &args.body {
        return Ok(body.clone());
    }
    match &args.body_file {
        Some(path) if path.as_os_str() == "-" => Ok(std::io::read_to_string(std::io::stdin())?),
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read body file {:?}: {}", path, e)
        }),
        None => Ok(String::new()),
    }
}

/// Execute the predict command.
pub fn execute(args: PredictArgs) -> anyhow::Result<()> {
    let config = Config::load()?;
    let body = read_body(&args)?;
    if args.title.trim().is_empty() && body.trim().is_empty() {
        anyhow::bail!(
            "Nothing to tag\n\n  Hint: Pass --title and/or --body (or --body-file)."
        );
    }

    let store = super::model_store(args.model_dir.clone(), &config);
    let tagger = super::load_tagger(&store)?;

    let mut prediction = tagger.predict_post(&args.title, &body)?;
    if !config.output.include_scores {
        prediction = prediction.without_scores();
    }
    tracing::debug!("Predicted {} tags", prediction.tags.len());

    let format = super::resolve_format(args.format, &config);
    let stdout = std::io::stdout();
    let mut writer = OutputWriter::new(BufWriter::new(stdout.lock()), format, config.output.pretty);
    writer.write(&prediction)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_body_prefers_inline() {
        let args = PredictArgs {
            body: Some("inline".into()),
            ..PredictArgs::default()
        };
        assert_eq!(read_body(&args).unwrap(), "inline");
    }

    #[test]
    fn test_read_body_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.html");
        std::fs::write(&path, "<p>flask route</p>").unwrap();
        let args = PredictArgs {
            body_file: Some(path),
            ..PredictArgs::default()
        };
        assert_eq!(read_body(&args).unwrap(), "<p>flask route</p>");
    }

    #[test]
    fn test_read_body_missing_file_errors() {
        let args = PredictArgs {
            body_file: Some(PathBuf::from("/nonexistent/body.html")),
            ..PredictArgs::default()
        };
        assert!(read_body(&args).is_err());
    }
}
