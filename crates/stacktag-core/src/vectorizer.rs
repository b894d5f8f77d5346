//! TF-IDF vectorizer over analyzed post text.
//!
//! `fit` learns a bounded term vocabulary and smoothed IDF weights from the
//! training corpus; `transform` maps documents into that fixed feature space.
//! Only `transform` is ever used on inference documents.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::VectorizerConfig;
use crate::error::{ModelError, ModelResult};
use crate::math::FeatureVector;
use crate::text::TextAnalyzer;

type TermCounts = HashMap<String, usize>;

#[derive(Serialize, Deserialize)]
struct VectorizerState {
    config: VectorizerConfig,
    terms: Vec<String>,
    idf: Vec<f64>,
}

/// Fitted TF-IDF vectorizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "VectorizerState", into = "VectorizerState")]
pub struct TfidfVectorizer {
    config: VectorizerConfig,
    /// Term at each feature index, lexicographic order
    terms: Vec<String>,
    /// IDF weight per feature index
    idf: Vec<f64>,
    index: HashMap<String, usize>,
    analyzer: TextAnalyzer,
}

impl TryFrom<VectorizerState> for TfidfVectorizer {
    type Error = String;

    fn try_from(state: VectorizerState) -> Result<Self, Self::Error> {
        if state.terms.len() != state.idf.len() {
            return Err(format!(
                "vectorizer has {} terms but {} idf weights",
                state.terms.len(),
                state.idf.len()
            ));
        }
        let index = build_index(&state.terms);
        if index.len() != state.terms.len() {
            return Err("vectorizer terms contain duplicates".to_string());
        }
        Ok(Self {
            analyzer: TextAnalyzer::new(state.config.clone()),
            config: state.config,
            terms: state.terms,
            idf: state.idf,
            index,
        })
    }
}

impl From<TfidfVectorizer> for VectorizerState {
    fn from(v: TfidfVectorizer) -> Self {
        Self {
            config: v.config,
            terms: v.terms,
            idf: v.idf,
        }
    }
}

fn build_index(terms: &[String]) -> HashMap<String, usize> {
    terms
        .iter()
        .enumerate()
        .map(|(i, t)| (t.clone(), i))
        .collect()
}

fn count_terms(analyzer: &TextAnalyzer, doc: &str) -> TermCounts {
    let mut counts = TermCounts::new();
    for token in analyzer.analyze(doc) {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

impl TfidfVectorizer {
    /// Learn vocabulary and IDF weights from a training corpus.
    pub fn fit<S: AsRef<str>>(docs: &[S], config: VectorizerConfig) -> ModelResult<Self> {
        let analyzer = TextAnalyzer::new(config.clone());
        let counts: Vec<TermCounts> = docs
            .iter()
            .map(|d| count_terms(&analyzer, d.as_ref()))
            .collect();
        Self::fit_counts(&counts, config)
    }

    /// Fit and return the training corpus in the fitted feature space.
    pub fn fit_transform<S: AsRef<str>>(
        docs: &[S],
        config: VectorizerConfig,
    ) -> ModelResult<(Self, Vec<FeatureVector>)> {
        let analyzer = TextAnalyzer::new(config.clone());
        let counts: Vec<TermCounts> = docs
            .iter()
            .map(|d| count_terms(&analyzer, d.as_ref()))
            .collect();
        let vectorizer = Self::fit_counts(&counts, config)?;
        let features = counts.iter().map(|c| vectorizer.weigh(c)).collect();
        Ok((vectorizer, features))
    }

    fn fit_counts(counts: &[TermCounts], config: VectorizerConfig) -> ModelResult<Self> {
        if counts.is_empty() {
            return Err(ModelError::EmptyInput("no documents to fit the vectorizer on"));
        }
        if config.max_features == 0 {
            return Err(ModelError::InvalidHyperparameter {
                name: "max_features",
                message: "must be > 0".to_string(),
            });
        }

        let mut corpus_freq: HashMap<&str, usize> = HashMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for doc in counts {
            for (term, &n) in doc {
                *corpus_freq.entry(term.as_str()).or_insert(0) += n;
                *doc_freq.entry(term.as_str()).or_insert(0) += 1;
            }
        }
        if corpus_freq.is_empty() {
            return Err(ModelError::EmptyInput(
                "corpus contains no terms after analysis",
            ));
        }

        // Keep the most frequent terms; ties resolve by term for reproducibility
        let mut ranked: Vec<(&str, usize)> = corpus_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(config.max_features);

        let mut terms: Vec<String> = ranked.iter().map(|(t, _)| t.to_string()).collect();
        terms.sort();

        let n = counts.len() as f64;
        let idf: Vec<f64> = terms
            .iter()
            .map(|t| {
                let df = doc_freq.get(t.as_str()).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        tracing::info!(
            "Vectorizer vocabulary: {} terms (cap {}) from {} documents",
            terms.len(),
            config.max_features,
            counts.len()
        );

        let index = build_index(&terms);
        Ok(Self {
            analyzer: TextAnalyzer::new(config.clone()),
            config,
            terms,
            idf,
            index,
        })
    }

    /// Map documents into the fitted feature space.
    pub fn transform<S: AsRef<str>>(&self, docs: &[S]) -> Vec<FeatureVector> {
        docs.iter().map(|d| self.transform_one(d.as_ref())).collect()
    }

    /// Map a single document into the fitted feature space.
    pub fn transform_one(&self, doc: &str) -> FeatureVector {
        self.weigh(&count_terms(&self.analyzer, doc))
    }

    fn weigh(&self, counts: &TermCounts) -> FeatureVector {
        let entries = counts
            .iter()
            .filter_map(|(term, &tf)| {
                self.index
                    .get(term)
                    .map(|&i| (i, tf as f64 * self.idf[i]))
            })
            .collect();
        let mut vector = FeatureVector::new(self.terms.len(), entries);
        if vector.is_zero() {
            tracing::debug!("Document has no terms in the fitted vocabulary");
        }
        vector.l2_normalize_in_place();
        vector
    }

    /// Width of the fitted feature space.
    pub fn dim(&self) -> usize {
        self.terms.len()
    }

    /// Term at each feature index.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// Feature index of `term`, if it survived fitting.
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StopWords;

    fn weight(f: &FeatureVector, index: usize) -> f64 {
        f.entries()
            .iter()
            .find(|&&(i, _)| i == index)
            .map_or(0.0, |&(_, v)| v)
    }

    fn corpus() -> Vec<&'static str> {
        vec![
            "python list comprehension",
            "python flask route",
            "javascript promise callback",
        ]
    }

    #[test]
    fn test_fit_builds_sorted_vocabulary() {
        let v = TfidfVectorizer::fit(&corpus(), VectorizerConfig::default()).unwrap();
        let mut sorted = v.terms().to_vec();
        sorted.sort();
        assert_eq!(v.terms(), sorted.as_slice());
        assert!(v.index_of("python").is_some());
        assert_eq!(v.dim(), 8);
    }

    #[test]
    fn test_idf_is_smoothed() {
        let v = TfidfVectorizer::fit(&corpus(), VectorizerConfig::default()).unwrap();
        let python = v.idf()[v.index_of("python").unwrap()];
        let flask = v.idf()[v.index_of("flask").unwrap()];
        // n = 3: python df = 2, flask df = 1
        assert!((python - ((4.0f64 / 3.0).ln() + 1.0)).abs() < 1e-12);
        assert!((flask - (2.0f64.ln() + 1.0)).abs() < 1e-12);
        assert!(flask > python);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let config = VectorizerConfig {
            max_features: 1,
            ..VectorizerConfig::default()
        };
        let v = TfidfVectorizer::fit(&corpus(), config).unwrap();
        assert_eq!(v.terms(), &["python"]);
    }

    #[test]
    fn test_transform_dimension_is_constant() {
        let v = TfidfVectorizer::fit(&corpus(), VectorizerConfig::default()).unwrap();
        let features = v.transform(&["python", "", "totally unrelated words", "flask flask"]);
        assert!(features.iter().all(|f| f.dim() == v.dim()));
    }

    #[test]
    fn test_transform_rows_are_unit_length() {
        let v = TfidfVectorizer::fit(&corpus(), VectorizerConfig::default()).unwrap();
        let f = v.transform_one("python flask python");
        assert!((f.norm_squared() - 1.0).abs() < 1e-12);
        // python appears twice but has lower idf than flask
        let python = weight(&f, v.index_of("python").unwrap());
        let flask = weight(&f, v.index_of("flask").unwrap());
        assert!(python > 0.0 && flask > 0.0);
    }

    #[test]
    fn test_unknown_terms_give_zero_vector() {
        let v = TfidfVectorizer::fit(&corpus(), VectorizerConfig::default()).unwrap();
        let f = v.transform_one("haskell monad");
        assert!(f.is_zero());
        assert_eq!(f.dim(), v.dim());
    }

    #[test]
    fn test_fit_transform_matches_transform() {
        let (v, features) =
            TfidfVectorizer::fit_transform(&corpus(), VectorizerConfig::default()).unwrap();
        assert_eq!(features, v.transform(&corpus()));
    }

    #[test]
    fn test_fit_rejects_empty_corpus() {
        let empty: Vec<&str> = vec![];
        assert!(matches!(
            TfidfVectorizer::fit(&empty, VectorizerConfig::default()),
            Err(ModelError::EmptyInput(_))
        ));
        assert!(matches!(
            TfidfVectorizer::fit(&["the a of", ""], VectorizerConfig::default()),
            Err(ModelError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_fit_rejects_zero_max_features() {
        let config = VectorizerConfig {
            max_features: 0,
            ..VectorizerConfig::default()
        };
        assert!(matches!(
            TfidfVectorizer::fit(&corpus(), config),
            Err(ModelError::InvalidHyperparameter { name: "max_features", .. })
        ));
    }

    #[test]
    fn test_stop_words_configurable() {
        let config = VectorizerConfig {
            stop_words: StopWords::None,
            ..VectorizerConfig::default()
        };
        let v = TfidfVectorizer::fit(&["the python"], config).unwrap();
        assert!(v.index_of("the").is_some());

        let v = TfidfVectorizer::fit(&["the python"], VectorizerConfig::default()).unwrap();
        assert!(v.index_of("the").is_none());
    }

    #[test]
    fn test_serde_round_trip_is_exact() {
        let v = TfidfVectorizer::fit(&corpus(), VectorizerConfig::default()).unwrap();
        let json = serde_json::to_string(&v).unwrap();
        let restored: TfidfVectorizer = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.terms(), v.terms());
        assert_eq!(restored.idf(), v.idf());
        let doc = "flask python route promise";
        assert_eq!(restored.transform_one(doc), v.transform_one(doc));
    }

    #[test]
    fn test_deserialize_rejects_inconsistent_state() {
        let json = r#"{"config":{},"terms":["a","b"],"idf":[1.0]}"#;
        assert!(serde_json::from_str::<TfidfVectorizer>(json).is_err());
    }
}
