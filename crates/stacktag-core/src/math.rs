//! Sparse vector math shared by the vectorizer and the classifier.

use serde::{Deserialize, Serialize};

/// Fixed-dimension sparse vector with entries sorted by index.
///
/// Zero-valued entries are never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    dim: usize,
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    /// Build from unordered `(index, value)` pairs. Duplicate indices are summed;
    /// indices at or beyond `dim` are discarded.
    pub fn new(dim: usize, mut entries: Vec<(usize, f64)>) -> Self {
        entries.retain(|&(i, v)| i < dim && v != 0.0);
        entries.sort_by_key(|&(i, _)| i);
        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(entries.len());
        for (i, v) in entries {
            match merged.last_mut() {
                Some((last, acc)) if *last == i => *acc += v,
                _ => merged.push((i, v)),
            }
        }
        merged.retain(|&(_, v)| v != 0.0);
        Self {
            dim,
            entries: merged,
        }
    }

    /// Width of the feature space.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn norm_squared(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v * v).sum()
    }

    /// L2-normalize in place so the magnitude is 1. Zero vectors stay zero.
    pub fn l2_normalize_in_place(&mut self) {
        let norm = self.norm_squared().sqrt();
        if norm > f64::EPSILON {
            for (_, v) in self.entries.iter_mut() {
                *v /= norm;
            }
        }
    }
}

/// Squared Euclidean distance from precomputed squared norms and a dot product.
///
/// Clamped at zero: cancellation can leave tiny negatives for identical vectors.
pub fn squared_distance(norm_a: f64, norm_b: f64, dot: f64) -> f64 {
    (norm_a + norm_b - 2.0 * dot).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l2_normalize() {
        let mut v = FeatureVector::new(4, vec![(0, 3.0), (2, 4.0)]);
        v.l2_normalize_in_place();
        assert!((v.norm_squared() - 1.0).abs() < 1e-12);
        let [(0, a), (2, b)] = v.entries() else {
            panic!("unexpected entries {:?}", v.entries());
        };
        assert!((a - 0.6).abs() < 1e-12);
        assert!((b - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_l2_normalize_zero_vector() {
        let mut v = FeatureVector::new(3, Vec::new());
        v.l2_normalize_in_place();
        assert!(v.is_zero());
        assert_eq!(v.dim(), 3);
    }

    #[test]
    fn test_new_sorts_merges_and_bounds() {
        let v = FeatureVector::new(3, vec![(2, 1.0), (0, 2.0), (2, 0.5), (7, 9.0), (1, 0.0)]);
        assert_eq!(v.entries(), &[(0, 2.0), (2, 1.5)]);
        assert_eq!(v.dim(), 3);
    }

    #[test]
    fn test_new_drops_entries_that_cancel() {
        let v = FeatureVector::new(2, vec![(1, 0.5), (1, -0.5), (0, 1.0)]);
        assert_eq!(v.entries(), &[(0, 1.0)]);
    }

    #[test]
    fn test_squared_distance_clamps() {
        assert_eq!(squared_distance(1.0, 1.0, 1.0000000001), 0.0);
        assert!((squared_distance(1.0, 1.0, 0.0) - 2.0).abs() < 1e-12);
    }
}
