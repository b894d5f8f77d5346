//! Label vocabulary and multi-hot encoding.
//!
//! The encoder is closed-vocabulary: it learns the tag set once from the
//! training corpus and silently ignores any tag it did not see. The vocabulary
//! is an explicit, lexicographically sorted index → tag list, so encoding is
//! identical across processes and across save/load.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// The tags attached to one document.
pub type TagSet = Vec<String>;

/// Fixed-width binary vector over the label vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MultiHot {
    bits: Vec<bool>,
}

impl MultiHot {
    /// All-zero vector of the given width.
    pub fn zeros(len: usize) -> Self {
        Self {
            bits: vec![false; len],
        }
    }

    /// Vector of the given width with `indices` set. Out-of-range indices are ignored.
    pub fn from_indices(len: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut row = Self::zeros(len);
        for i in indices {
            if i < len {
                row.bits[i] = true;
            }
        }
        row
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn get(&self, index: usize) -> bool {
        self.bits.get(index).copied().unwrap_or(false)
    }

    /// Indices of set positions, ascending.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, &b)| b)
            .map(|(i, _)| i)
    }
}

impl From<Vec<bool>> for MultiHot {
    fn from(bits: Vec<bool>) -> Self {
        Self { bits }
    }
}

/// Serialized form: the class list alone. The lookup index is rebuilt on load.
#[derive(Serialize, Deserialize)]
struct LabelEncoderState {
    classes: Vec<String>,
}

/// Bijective mapping between tag strings and multi-hot positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LabelEncoderState", into = "LabelEncoderState")]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

impl TryFrom<LabelEncoderState> for LabelEncoder {
    type Error = String;

    fn try_from(state: LabelEncoderState) -> Result<Self, Self::Error> {
        let index = build_index(&state.classes);
        if index.len() != state.classes.len() {
            return Err("label encoder classes contain duplicates".to_string());
        }
        Ok(Self {
            classes: state.classes,
            index,
        })
    }
}

impl From<LabelEncoder> for LabelEncoderState {
    fn from(encoder: LabelEncoder) -> Self {
        Self {
            classes: encoder.classes,
        }
    }
}

fn build_index(classes: &[String]) -> HashMap<String, usize> {
    classes
        .iter()
        .enumerate()
        .map(|(i, c)| (c.clone(), i))
        .collect()
}

impl LabelEncoder {
    /// Learn the tag vocabulary from training tag sets.
    pub fn fit(tag_sets: &[TagSet]) -> ModelResult<Self> {
        if tag_sets.is_empty() {
            return Err(ModelError::EmptyInput("no tag sets to fit the label encoder on"));
        }

        let classes: Vec<String> = tag_sets
            .iter()
            .flatten()
            .map(String::as_str)
            .collect::<BTreeSet<&str>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        if classes.is_empty() {
            return Err(ModelError::EmptyInput("tag sets contain no tags"));
        }

        tracing::info!(
            "Label vocabulary: {} tags from {} documents",
            classes.len(),
            tag_sets.len()
        );

        let index = build_index(&classes);
        Ok(Self { classes, index })
    }

    /// Encode tag sets as multi-hot rows. Tags outside the vocabulary are dropped.
    pub fn transform(&self, tag_sets: &[TagSet]) -> Vec<MultiHot> {
        let mut dropped = 0usize;
        let rows = tag_sets
            .iter()
            .map(|tags| {
                let known = tags.iter().filter_map(|tag| {
                    let i = self.index.get(tag).copied();
                    dropped += usize::from(i.is_none());
                    i
                });
                MultiHot::from_indices(self.classes.len(), known)
            })
            .collect();
        if dropped > 0 {
            tracing::debug!("Dropped {} tags outside the label vocabulary", dropped);
        }
        rows
    }

    /// Decode multi-hot rows back into tag sets (in vocabulary order).
    pub fn inverse_transform(&self, rows: &[MultiHot]) -> ModelResult<Vec<TagSet>> {
        rows.iter()
            .map(|row| {
                if row.len() != self.classes.len() {
                    return Err(ModelError::DimensionMismatch {
                        context: "label decoding",
                        expected: self.classes.len(),
                        actual: row.len(),
                    });
                }
                Ok(row.ones().map(|i| self.classes[i].clone()).collect())
            })
            .collect()
    }

    /// Vocabulary in index order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Position of `tag` in the vocabulary.
    pub fn index_of(&self, tag: &str) -> Option<usize> {
        self.index.get(tag).copied()
    }

    /// Tag at `index`.
    pub fn class(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
