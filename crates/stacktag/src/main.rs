//! stacktag CLI - train and run a multi-label tagger for forum posts.
//!
//! A model is trained from a CSV export of tagged posts and saved as two
//! artifacts (label encoder and pipeline). Later runs reload them to tag new
//! posts or to score the model on another labelled export.
//!
//! # Usage
//!
//! ```bash
//! # Train on a CSV export and save the model
//! stacktag train --data questions.csv
//!
//! # Tag a post
//! stacktag predict --title "Flask route 404" --body "<p>my decorator...</p>"
//!
//! # Score the saved model on labelled posts
//! stacktag evaluate --data holdout.csv --format json
//!
//! # View configuration
//! stacktag config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// stacktag - multi-label tagging for forum posts.
#[derive(Parser, Debug)]
#[command(name = "stacktag")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Train a tagger from a CSV export and save it
    Train(cli::train::TrainArgs),

    /// Tag a single post with a trained model
    Predict(cli::predict::PredictArgs),

    /// Score a trained model on labelled posts
    Evaluate(cli::evaluate::EvaluateArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match stacktag_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `stacktag config path`."
            );
            stacktag_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("stacktag v{}", stacktag_core::VERSION);

    match cli.command {
        Commands::Train(args) => cli::train::execute(args),
        Commands::Predict(args) => cli::predict::execute(args),
        Commands::Evaluate(args) => cli::evaluate::execute(args),
        Commands::Config(args) => cli::config::execute(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_train_overrides() {
        let cli = Cli::parse_from([
            "stacktag", "train", "--data", "posts.csv", "-k", "5", "--smoothing", "1.0",
        ]);
        match cli.command {
            Commands::Train(args) => {
                assert_eq!(args.k, Some(5));
                assert_eq!(args.smoothing, Some(1.0));
                assert!(!args.exclude_self);
            }
            other => panic!("expected train, got {other:?}"),
        }
    }

    #[test]
    fn test_body_and_body_file_conflict() {
        let result = Cli::try_parse_from([
            "stacktag", "predict", "--body", "x", "--body-file", "y.html",
        ]);
        assert!(result.is_err());
    }
}
