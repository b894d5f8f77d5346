//! stacktag core - multi-label tagging of forum posts.
//!
//! Posts (title + body) are mapped to TF-IDF feature vectors and tagged by an
//! ML-kNN classifier trained on previously tagged posts. The label space is a
//! fixed vocabulary learned from the training tags.
//!
//! # Architecture
//!
//! ```text
//! CSV → Dataset → LabelEncoder fit → TfidfVectorizer + MlKnn fit (TagPipeline)
//!     → ArtifactStore (label_encoder, model_pipeline)
//!     → reload → transform → predict → decode → tags
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use stacktag_core::{ArtifactStore, Config, Dataset, Tagger};
//!
//! fn main() -> stacktag_core::Result<()> {
//!     let config = Config::load()?;
//!     let dataset = Dataset::from_csv_path("questions.csv".as_ref())?;
//!     let tagger = Tagger::train(dataset.posts(), &config.model_config())?;
//!     tagger.save(&ArtifactStore::new(config.model_dir()))?;
//!
//!     let tags = tagger.tag("Flask route returns 404", "<p>my decorator...</p>")?;
//!     println!("Tags: {:?}", tags);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod dataset;
pub mod error;
pub mod eval;
pub mod knn;
pub mod labels;
pub mod math;
pub mod output;
pub mod pipeline;
pub mod store;
pub mod tagger;
pub mod text;
pub mod types;
pub mod vectorizer;

// Re-exports for convenient access
pub use config::Config;
pub use dataset::{Dataset, Post};
pub use error::{
    ArtifactError, ConfigError, DatasetError, ModelError, ModelResult, Result, TaggerError,
};
pub use eval::EvaluationReport;
pub use knn::{KnnConfig, MlKnn};
pub use labels::{LabelEncoder, MultiHot, TagSet};
pub use math::FeatureVector;
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{ModelConfig, TagPipeline};
pub use store::ArtifactStore;
pub use tagger::Tagger;
pub use types::{Tag, TagPrediction, TrainingStats};
pub use vectorizer::TfidfVectorizer;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
