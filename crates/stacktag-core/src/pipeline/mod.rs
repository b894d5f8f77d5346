//! Vectorizer + classifier composed into one fit/predict unit.
//!
//! The pipeline has two ordered stages:
//! - **vectorizer**: TF-IDF over analyzed text, fitted once
//! - **classifier**: ML-kNN over the vectorizer's feature space
//!
//! `fit` is the only place the vectorizer learns anything. Every predict path
//! calls `transform`, so training and inference always share one feature space.

use serde::{Deserialize, Serialize};

use crate::config::{KnnConfig, VectorizerConfig};
use crate::error::{ModelError, ModelResult};
use crate::knn::MlKnn;
use crate::labels::MultiHot;
use crate::math::FeatureVector;
use crate::vectorizer::TfidfVectorizer;

/// Hyperparameters for both pipeline stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub vectorizer: VectorizerConfig,
    pub classifier: KnnConfig,
}

/// Fitted vectorizer and classifier, persisted as a single artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagPipeline {
    vectorizer: TfidfVectorizer,
    classifier: MlKnn,
}

impl TagPipeline {
    /// Fit the vectorizer on `docs`, then the classifier on the resulting features.
    pub fn fit<S: AsRef<str>>(
        docs: &[S],
        labels: Vec<MultiHot>,
        config: &ModelConfig,
    ) -> ModelResult<Self> {
        if docs.len() != labels.len() {
            return Err(ModelError::SampleMismatch {
                features: docs.len(),
                labels: labels.len(),
            });
        }
        let start = std::time::Instant::now();
        let (vectorizer, features) = TfidfVectorizer::fit_transform(docs, config.vectorizer.clone())?;
        tracing::debug!("Vectorized {} training documents in {:?}", docs.len(), start.elapsed());

        let classifier = MlKnn::fit(features, labels, config.classifier.clone())?;
        tracing::info!("Pipeline fitted in {:?}", start.elapsed());

        Ok(Self {
            vectorizer,
            classifier,
        })
    }

    /// Feature vectors for `docs` in the fitted space.
    pub fn transform<S: AsRef<str>>(&self, docs: &[S]) -> Vec<FeatureVector> {
        self.vectorizer.transform(docs)
    }

    /// Predicted multi-hot label rows for `docs`.
    pub fn predict<S: AsRef<str>>(&self, docs: &[S]) -> ModelResult<Vec<MultiHot>> {
        self.classifier.predict(&self.transform(docs))
    }

    /// Per-label posterior probabilities for `docs`.
    pub fn predict_proba<S: AsRef<str>>(&self, docs: &[S]) -> ModelResult<Vec<Vec<f64>>> {
        self.classifier.predict_proba(&self.transform(docs))
    }

    /// Predicted labels and posteriors for a single document.
    pub fn predict_one(&self, doc: &str) -> ModelResult<(MultiHot, Vec<f64>)> {
        let features = [self.vectorizer.transform_one(doc)];
        self.classifier
            .predict_with_proba(&features)?
            .pop()
            .ok_or(ModelError::EmptyInput("classifier returned no prediction"))
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &MlKnn {
        &self.classifier
    }

    /// Width of the label space the classifier was fitted on.
    pub fn num_labels(&self) -> usize {
        self.classifier.num_labels()
    }
}
