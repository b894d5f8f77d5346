//! The `stacktag train` command: fit, evaluate, and save a tagger.

use clap::Args;
use stacktag_core::{Config, Dataset, LabelEncoder, Tagger, TrainingStats};
use std::path::PathBuf;
use std::time::Instant;

/// Stages reported on the progress bar.
const STAGES: u64 = 5;

/// Arguments for the `train` command.
#[derive(Args, Debug, Default)]
pub struct TrainArgs {
    /// CSV export with Title, Body, and Tags columns
    #[arg(short, long)]
    pub data: PathBuf,

    /// Fraction of rows to sample before training (overrides config)
    #[arg(long)]
    pub sample_fraction: Option<f64>,

    /// Seed for sampling and the train/test split (overrides config)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fraction of sampled rows held out for evaluation (overrides config)
    #[arg(long)]
    pub test_fraction: Option<f64>,

    /// Number of neighbours (overrides config)
    #[arg(short, long)]
    pub k: Option<usize>,

    /// Smoothing constant (overrides config)
    #[arg(long)]
    pub smoothing: Option<f64>,

    /// Vocabulary size cap (overrides config)
    #[arg(long)]
    pub max_features: Option<usize>,

    /// Leave each training point out of its own neighbourhood
    #[arg(long)]
    pub exclude_self: bool,

    /// Directory to write the trained artifacts to (overrides config)
    #[arg(long, env = "STACKTAG_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,
}

/// Apply command-line overrides on top of the loaded config and re-validate.
fn apply_overrides(config: &mut Config, args: &TrainArgs) -> anyhow::Result<()> {
    if let Some(fraction) = args.sample_fraction {
        config.dataset.sample_fraction = fraction;
    }
    if let Some(seed) = args.seed {
        config.dataset.seed = seed;
    }
    if let Some(fraction) = args.test_fraction {
        config.dataset.test_fraction = fraction;
    }
    if let Some(k) = args.k {
        config.classifier.k = k;
    }
    if let Some(smoothing) = args.smoothing {
        config.classifier.smoothing = smoothing;
    }
    if let Some(max_features) = args.max_features {
        config.vectorizer.max_features = max_features;
    }
    if args.exclude_self {
        config.classifier.exclude_self = true;
    }
    config.validate()?;
    Ok(())
}

/// Execute the train command.
pub fn execute(args: TrainArgs) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    apply_overrides(&mut config, &args)?;
    let store = super::model_store(args.model_dir.clone(), &config);

    if !args.data.exists() {
        anyhow::bail!(
            "Dataset not found: {:?}\n\n  Hint: Check the file path and try again.",
            args.data
        );
    }

    let progress = create_progress_bar(STAGES);
    let start = Instant::now();

    progress.set_message("loading dataset");
    let dataset = Dataset::from_csv_path(&args.data)?;
    if dataset.is_empty() {
        progress.finish_and_clear();
        anyhow::bail!(
            "No usable rows in {:?}\n\n  Hint: Rows need non-empty Title, Body, and Tags.",
            args.data
        );
    }
    let dataset = dataset.sample(config.dataset.sample_fraction, config.dataset.seed)?;
    progress.inc(1);

    progress.set_message("fitting label encoder");
    let encoder = LabelEncoder::fit(&dataset.tag_sets())?;
    let (train, test) = dataset.split(config.dataset.test_fraction, config.dataset.seed)?;
    progress.inc(1);

    progress.set_message(format!("fitting model on {} posts", train.len()));
    let fit_start = Instant::now();
    let tagger = Tagger::train_with_encoder(encoder, train.posts(), &config.model_config())?;
    let fit_seconds = fit_start.elapsed().as_secs_f64();
    progress.inc(1);

    progress.set_message(format!("evaluating on {} posts", test.len()));
    let report = if test.is_empty() {
        tracing::warn!("Test split is empty, skipping evaluation");
        None
    } else {
        Some(tagger.evaluate(test.posts())?)
    };
    progress.inc(1);

    progress.set_message("saving artifacts");
    tagger.save(&store)?;
    progress.inc(1);
    progress.finish_and_clear();

    let stats = TrainingStats {
        train_posts: train.len(),
        test_posts: test.len(),
        labels: tagger.encoder().len(),
        features: tagger.pipeline().vectorizer().dim(),
        fit_seconds,
    };
    tracing::info!(
        "Training finished in {:.1}s, artifacts in {}",
        start.elapsed().as_secs_f64(),
        store.dir().display()
    );

    print_summary(&stats, &store.dir().display().to_string());
    if let Some(report) = report {
        eprintln!();
        eprint!("{}", report);
    }
    Ok(())
}

/// Create a stage progress bar for training.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after training.
fn print_summary(stats: &TrainingStats, model_dir: &str) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Train posts:  {:>8}", stats.train_posts);
    eprintln!("    Test posts:   {:>8}", stats.test_posts);
    eprintln!("    Labels:       {:>8}", stats.labels);
    eprintln!("    Features:     {:>8}", stats.features);
    eprintln!("  ------------------------------------");
    eprintln!("    Fit time:     {:>7.1}s", stats.fit_seconds);
    eprintln!("    Saved to:     {}", model_dir);
    eprintln!("  ====================================");
}
