//! ML-kNN: multi-label k-nearest-neighbour classification with Bayesian smoothing.
//!
//! For every label the model learns, from the neighbourhoods of the training
//! points, how often a point carrying the label has `j` neighbours that also
//! carry it (and likewise for points without the label), `j ∈ 0..=k`. At
//! prediction time each label is decided independently by comparing
//!
//! ```text
//! P(H1) · P(E_j | H1)   vs   P(H0) · P(E_j | H0)
//! ```
//!
//! where `j` is the number of the query's k nearest neighbours carrying the
//! label. The smoothing constant `s` is added to every count before it is
//! normalized, so no estimate is ever exactly zero or one.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::labels::MultiHot;
use crate::math::{squared_distance, FeatureVector};

/// ML-kNN hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnnConfig {
    /// Neighbourhood size, used both when building the tables and when predicting
    pub k: usize,

    /// Additive smoothing constant; larger values pull estimates toward uniform
    pub smoothing: f64,

    /// Skip each training point in its own neighbourhood while fitting.
    /// When false a point counts as its own nearest neighbour.
    pub exclude_self: bool,
}

impl Default for KnnConfig {
    fn default() -> Self {
        Self {
            k: 7,
            smoothing: 0.7,
            exclude_self: false,
        }
    }
}

impl KnnConfig {
    fn validate(&self, samples: usize) -> ModelResult<()> {
        if self.k == 0 {
            return Err(ModelError::InvalidHyperparameter {
                name: "k",
                message: "must be > 0".to_string(),
            });
        }
        let pool = if self.exclude_self {
            samples.saturating_sub(1)
        } else {
            samples
        };
        if self.k > pool {
            return Err(ModelError::InvalidHyperparameter {
                name: "k",
                message: format!(
                    "k = {} exceeds the {} neighbours available from {} training samples",
                    self.k, pool, samples
                ),
            });
        }
        if !self.smoothing.is_finite() || self.smoothing < 0.0 {
            return Err(ModelError::InvalidHyperparameter {
                name: "smoothing",
                message: format!("must be finite and >= 0 (got {})", self.smoothing),
            });
        }
        Ok(())
    }
}

/// Column-oriented view of the training matrix for sparse dot products.
#[derive(Debug, Clone, Default)]
struct InvertedIndex {
    /// Per feature: (sample index, value), sample index ascending
    postings: Vec<Vec<(usize, f64)>>,
    /// Squared L2 norm per sample
    norms: Vec<f64>,
}

impl InvertedIndex {
    fn build(dim: usize, samples: &[FeatureVector]) -> Self {
        let mut postings = vec![Vec::new(); dim];
        for (s, x) in samples.iter().enumerate() {
            for &(f, v) in x.entries() {
                postings[f].push((s, v));
            }
        }
        let norms = samples.iter().map(FeatureVector::norm_squared).collect();
        Self { postings, norms }
    }

    /// Dot product of `query` with every training sample.
    fn dots(&self, query: &FeatureVector) -> Vec<f64> {
        let mut dots = vec![0.0; self.norms.len()];
        for &(f, qv) in query.entries() {
            for &(s, sv) in &self.postings[f] {
                dots[s] += qv * sv;
            }
        }
        dots
    }
}

#[derive(Serialize, Deserialize)]
struct MlKnnState {
    config: KnnConfig,
    dim: usize,
    samples: Vec<FeatureVector>,
    labels: Vec<MultiHot>,
    prior_true: Vec<f64>,
    cond_true: Vec<Vec<f64>>,
    cond_false: Vec<Vec<f64>>,
}

/// Fitted ML-kNN classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "MlKnnState", into = "MlKnnState")]
pub struct MlKnn {
    config: KnnConfig,
    dim: usize,
    samples: Vec<FeatureVector>,
    labels: Vec<MultiHot>,
    /// P(H1) per label
    prior_true: Vec<f64>,
    /// P(E_j | H1) per label, j ∈ 0..=k
    cond_true: Vec<Vec<f64>>,
    /// P(E_j | H0) per label, j ∈ 0..=k
    cond_false: Vec<Vec<f64>>,
    index: InvertedIndex,
}

impl TryFrom<MlKnnState> for MlKnn {
    type Error = String;

    fn try_from(state: MlKnnState) -> Result<Self, Self::Error> {
        if state.samples.len() != state.labels.len() {
            return Err("classifier sample and label counts differ".to_string());
        }
        if state.samples.iter().any(|x| {
            x.dim() != state.dim || x.entries().iter().any(|&(i, _)| i >= state.dim)
        }) {
            return Err("classifier samples have inconsistent dimensions".to_string());
        }
        let num_labels = state.prior_true.len();
        let row_width = state.config.k + 1;
        if state.cond_true.len() != num_labels
            || state.cond_false.len() != num_labels
            || state
                .cond_true
                .iter()
                .chain(&state.cond_false)
                .any(|row| row.len() != row_width)
        {
            return Err("classifier probability tables have inconsistent shapes".to_string());
        }
        if state.labels.iter().any(|y| y.len() != num_labels) {
            return Err("classifier label rows have inconsistent widths".to_string());
        }
        let index = InvertedIndex::build(state.dim, &state.samples);
        Ok(Self {
            config: state.config,
            dim: state.dim,
            samples: state.samples,
            labels: state.labels,
            prior_true: state.prior_true,
            cond_true: state.cond_true,
            cond_false: state.cond_false,
            index,
        })
    }
}

impl From<MlKnn> for MlKnnState {
    fn from(model: MlKnn) -> Self {
        Self {
            config: model.config,
            dim: model.dim,
            samples: model.samples,
            labels: model.labels,
            prior_true: model.prior_true,
            cond_true: model.cond_true,
            cond_false: model.cond_false,
        }
    }
}

/// `numerator / denominator`, or 0 when the denominator vanishes (only possible with s = 0).
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

impl MlKnn {
    /// Fit prior and conditional tables from training features and label rows.
    pub fn fit(
        samples: Vec<FeatureVector>,
        labels: Vec<MultiHot>,
        config: KnnConfig,
    ) -> ModelResult<Self> {
        let n = samples.len();
        if n == 0 {
            return Err(ModelError::EmptyInput("no training samples"));
        }
        if labels.len() != n {
            return Err(ModelError::SampleMismatch {
                features: n,
                labels: labels.len(),
            });
        }
        let num_labels = labels[0].len();
        if num_labels == 0 {
            return Err(ModelError::EmptyInput("label rows have zero width"));
        }
        if let Some(row) = labels.iter().find(|y| y.len() != num_labels) {
            return Err(ModelError::DimensionMismatch {
                context: "training label rows",
                expected: num_labels,
                actual: row.len(),
            });
        }
        let dim = samples[0].dim();
        if let Some(x) = samples.iter().find(|x| x.dim() != dim) {
            return Err(ModelError::DimensionMismatch {
                context: "training features",
                expected: dim,
                actual: x.dim(),
            });
        }
        config.validate(n)?;

        let start = std::time::Instant::now();
        let k = config.k;
        let s = config.smoothing;
        let index = InvertedIndex::build(dim, &samples);

        let mut model = Self {
            config,
            dim,
            samples,
            labels,
            prior_true: Vec::new(),
            cond_true: Vec::new(),
            cond_false: Vec::new(),
            index,
        };

        // Priors
        let mut with_label = vec![0usize; num_labels];
        for y in &model.labels {
            for l in y.ones() {
                with_label[l] += 1;
            }
        }
        model.prior_true = with_label
            .iter()
            .map(|&c| ratio(s + c as f64, 2.0 * s + n as f64))
            .collect();

        // Neighbour label-count histograms
        let mut c = vec![vec![0usize; k + 1]; num_labels];
        let mut cn = vec![vec![0usize; k + 1]; num_labels];
        let skip_self = model.config.exclude_self;
        for i in 0..n {
            let skip = skip_self.then_some(i);
            let neighbors = model.nearest(&model.samples[i], skip);
            let deltas = model.label_counts(&neighbors);
            for (l, &delta) in deltas.iter().enumerate() {
                if model.labels[i].get(l) {
                    c[l][delta] += 1;
                } else {
                    cn[l][delta] += 1;
                }
            }
            if (i + 1) % 1000 == 0 {
                tracing::debug!("  Neighbourhoods computed: {}/{}", i + 1, n);
            }
        }

        let smoothed = |hist: &[usize]| -> Vec<f64> {
            let total: usize = hist.iter().sum();
            let denominator = s * (k + 1) as f64 + total as f64;
            hist.iter()
                .map(|&count| ratio(s + count as f64, denominator))
                .collect()
        };
        model.cond_true = c.iter().map(|h| smoothed(h.as_slice())).collect();
        model.cond_false = cn.iter().map(|h| smoothed(h.as_slice())).collect();

        tracing::info!(
            "ML-kNN fitted: {} samples, {} labels, {} features, k={}, s={} in {:?}",
            n,
            num_labels,
            dim,
            k,
            s,
            start.elapsed()
        );

        Ok(model)
    }

    /// Indices of the k nearest training samples, nearest first.
    ///
    /// Ordered by (distance, training index) so ties resolve the same way every time.
    fn nearest(&self, query: &FeatureVector, skip: Option<usize>) -> Vec<usize> {
        let dots = self.index.dots(query);
        let query_norm = query.norm_squared();
        let mut candidates: Vec<(f64, usize)> = dots
            .iter()
            .zip(&self.index.norms)
            .enumerate()
            .filter(|&(i, _)| Some(i) != skip)
            .map(|(i, (&dot, &norm))| (squared_distance(query_norm, norm, dot), i))
            .collect();

        let order = |a: &(f64, usize), b: &(f64, usize)| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1));
        let k = self.config.k.min(candidates.len());
        if k < candidates.len() {
            candidates.select_nth_unstable_by(k, order);
            candidates.truncate(k);
        }
        candidates.sort_by(order);
        candidates.into_iter().map(|(_, i)| i).collect()
    }

    /// Per label, how many of `neighbors` carry it.
    fn label_counts(&self, neighbors: &[usize]) -> Vec<usize> {
        let mut deltas = vec![0usize; self.num_labels()];
        for &j in neighbors {
            for l in self.labels[j].ones() {
                deltas[l] += 1;
            }
        }
        deltas
    }

    fn check_dim(&self, x: &FeatureVector) -> ModelResult<()> {
        if x.dim() != self.dim {
            return Err(ModelError::DimensionMismatch {
                context: "classifier input",
                expected: self.dim,
                actual: x.dim(),
            });
        }
        Ok(())
    }

    /// Unnormalized (present, absent) joint probabilities for one label.
    fn joint(&self, label: usize, delta: usize) -> (f64, f64) {
        let prior = self.prior_true[label];
        (
            prior * self.cond_true[label][delta],
            (1.0 - prior) * self.cond_false[label][delta],
        )
    }

    /// Training indices of the k nearest neighbours of `x`.
    pub fn kneighbors(&self, x: &FeatureVector) -> ModelResult<Vec<usize>> {
        self.check_dim(x)?;
        Ok(self.nearest(x, None))
    }

    /// Neighbour label counts of `x`, one per label.
    fn evidence(&self, x: &FeatureVector) -> ModelResult<Vec<usize>> {
        Ok(self.label_counts(&self.kneighbors(x)?))
    }

    /// Predict a multi-hot row for each input vector.
    pub fn predict(&self, xs: &[FeatureVector]) -> ModelResult<Vec<MultiHot>> {
        xs.iter()
            .map(|x| {
                let bits = self
                    .evidence(x)?
                    .iter()
                    .enumerate()
                    .map(|(l, &delta)| {
                        let (present, absent) = self.joint(l, delta);
                        present >= absent
                    })
                    .collect::<Vec<bool>>();
                Ok(MultiHot::from(bits))
            })
            .collect()
    }

    /// Posterior probability P(H1 | E_j) of every label for each input vector.
    pub fn predict_proba(&self, xs: &[FeatureVector]) -> ModelResult<Vec<Vec<f64>>> {
        xs.iter()
            .map(|x| {
                Ok(self
                    .evidence(x)?
                    .iter()
                    .enumerate()
                    .map(|(l, &delta)| {
                        let (present, absent) = self.joint(l, delta);
                        ratio(present, present + absent)
                    })
                    .collect())
            })
            .collect()
    }

    /// `predict` and `predict_proba` together, from a single neighbour search per input.
    pub fn predict_with_proba(
        &self,
        xs: &[FeatureVector],
    ) -> ModelResult<Vec<(MultiHot, Vec<f64>)>> {
        xs.iter()
            .map(|x| {
                let (bits, scores): (Vec<bool>, Vec<f64>) = self
                    .evidence(x)?
                    .iter()
                    .enumerate()
                    .map(|(l, &delta)| {
                        let (present, absent) = self.joint(l, delta);
                        (present >= absent, ratio(present, present + absent))
                    })
                    .unzip();
                Ok((MultiHot::from(bits), scores))
            })
            .collect()
    }

    pub fn config(&self) -> &KnnConfig {
        &self.config
    }

    /// Width of the feature space the model was fitted on.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn num_labels(&self) -> usize {
        self.prior_true.len()
    }

    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    /// P(H1) per label.
    pub fn prior_true(&self) -> &[f64] {
        &self.prior_true
    }

    /// P(E_j | H1) table for one label.
    pub fn cond_true(&self, label: usize) -> Option<&[f64]> {
        self.cond_true.get(label).map(Vec::as_slice)
    }

    /// P(E_j | H0) table for one label.
    pub fn cond_false(&self, label: usize) -> Option<&[f64]> {
        self.cond_false.get(label).map(Vec::as_slice)
    }
}
