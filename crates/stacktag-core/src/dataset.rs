//! Labelled post datasets: CSV loading, tag parsing, sampling, and splitting.
//!
//! The expected export has at least `Title`, `Body`, and `Tags` columns, with
//! tags in markup form (`<python><flask>`). Rows missing any of the three are
//! dropped, as are rows whose tag field parses to nothing.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::DatasetError;
use crate::labels::TagSet;

/// One labelled post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub title: String,
    pub body: String,
    pub tags: TagSet,
}

impl Post {
    /// Title and body joined into the text the pipeline sees.
    pub fn document(&self) -> String {
        format!("{} {}", self.title, self.body)
    }
}

/// Parse markup tag syntax (`<a><b>`) into distinct tags, in order of appearance.
pub fn parse_tags(raw: &str) -> TagSet {
    let delimited = raw.replace('<', " ").replace('>', ",");
    let mut seen = HashSet::new();
    delimited
        .trim_end_matches(',')
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_string()))
        .map(str::to_string)
        .collect()
}

/// An ordered collection of labelled posts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    posts: Vec<Post>,
}

impl Dataset {
    pub fn new(posts: Vec<Post>) -> Self {
        Self { posts }
    }

    /// Load a dataset from a CSV file.
    pub fn from_csv_path(path: &Path) -> Result<Self, DatasetError> {
        let reader = csv::ReaderBuilder::new().from_path(path)?;
        let dataset = Self::from_csv(reader)?;
        tracing::info!("Loaded {} posts from {:?}", dataset.len(), path);
        Ok(dataset)
    }

    /// Load a dataset from any CSV byte stream with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        Self::from_csv(csv::ReaderBuilder::new().from_reader(reader))
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, DatasetError> {
        let headers = reader.headers()?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(DatasetError::MissingColumn(name))
        };
        let title_col = column("Title")?;
        let body_col = column("Body")?;
        let tags_col = column("Tags")?;

        let mut posts = Vec::new();
        let mut dropped = 0usize;
        for record in reader.records() {
            let record = record?;
            let field = |i: usize| record.get(i).map(str::trim).filter(|f| !f.is_empty());
            let (Some(title), Some(body), Some(raw_tags)) =
                (field(title_col), field(body_col), field(tags_col))
            else {
                dropped += 1;
                continue;
            };
            let tags = parse_tags(raw_tags);
            if tags.is_empty() {
                dropped += 1;
                continue;
            }
            posts.push(Post {
                title: title.to_string(),
                body: body.to_string(),
                tags,
            });
        }

        if dropped > 0 {
            tracing::warn!("Dropped {} incomplete rows while loading dataset", dropped);
        }
        Ok(Self { posts })
    }

    /// Seeded random subset of `round(len * fraction)` posts.
    pub fn sample(&self, fraction: f64, seed: u64) -> Result<Self, DatasetError> {
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(DatasetError::InvalidFraction {
                name: "sample fraction",
                value: fraction,
                message: "must be in (0, 1]",
            });
        }
        let count = (self.posts.len() as f64 * fraction).round() as usize;
        if count == 0 && !self.posts.is_empty() {
            return Err(DatasetError::TooSmall(format!(
                "sampling {} of {} posts keeps none",
                fraction,
                self.posts.len()
            )));
        }

        let mut indices: Vec<usize> = (0..self.posts.len()).collect();
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let posts = indices
            .into_iter()
            .take(count)
            .map(|i| self.posts[i].clone())
            .collect();
        tracing::info!(
            "Sampled {} of {} posts (fraction {}, seed {})",
            count,
            self.posts.len(),
            fraction,
            seed
        );
        Ok(Self { posts })
    }

    /// Seeded shuffle split into (train, test); test holds `ceil(len * test_fraction)` posts.
    ///
    /// At least one post always stays in the training side.
    pub fn split(&self, test_fraction: f64, seed: u64) -> Result<(Self, Self), DatasetError> {
        if !(0.0..1.0).contains(&test_fraction) {
            return Err(DatasetError::InvalidFraction {
                name: "test fraction",
                value: test_fraction,
                message: "must be in [0, 1)",
            });
        }
        let n = self.posts.len();
        if n == 0 {
            return Err(DatasetError::TooSmall("cannot split an empty dataset".into()));
        }
        let test_n = ((n as f64 * test_fraction).ceil() as usize).min(n - 1);

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let (test_idx, train_idx) = indices.split_at(test_n);
        let pick = |idx: &[usize]| Self {
            posts: idx.iter().map(|&i| self.posts[i].clone()).collect(),
        };
        Ok((pick(train_idx), pick(test_idx)))
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Title + body text for every post.
    pub fn documents(&self) -> Vec<String> {
        self.posts.iter().map(Post::document).collect()
    }

    /// Tag set for every post.
    pub fn tag_sets(&self) -> Vec<TagSet> {
        self.posts.iter().map(|p| p.tags.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}
