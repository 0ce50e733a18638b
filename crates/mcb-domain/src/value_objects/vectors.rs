//! Dense and sparse vector representations (§3, §4.5).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A dense embedding vector of configured dimensionality `D`.
///
/// Invariant: stored vectors are L2-normalized (§4.5); this type does not
/// enforce normalization itself, the dense encoder port does on the way out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseVector(pub Vec<f32>);

impl DenseVector {
    /// Dimensionality of this vector.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.0.len()
    }

    /// L2-normalize in place; a zero vector is left unchanged.
    pub fn normalize(&mut self) {
        let norm: f32 = self.0.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut self.0 {
                *v /= norm;
            }
        }
    }
}

/// Upper bound on non-zero entries in a sparse vector (§4.5: "capped at 4096 entries").
pub const SPARSE_VECTOR_CAP: usize = 4096;

/// A sparse vector keyed by hashed token id, capped at [`SPARSE_VECTOR_CAP`] entries.
///
/// Used both for the keyword encoder (`sparseKeywords`) and the citation
/// encoder (`sparseCitations`); the two are stored separately per chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector(pub HashMap<u32, f32>);

impl SparseVector {
    /// Build from an iterator of (token hash, weight) pairs, keeping only the
    /// [`SPARSE_VECTOR_CAP`] highest-weight entries when the input exceeds the cap.
    pub fn capped(entries: impl IntoIterator<Item = (u32, f32)>) -> Self {
        let mut all: Vec<(u32, f32)> = entries.into_iter().collect();
        if all.len() > SPARSE_VECTOR_CAP {
            all.sort_by(|a, b| b.1.total_cmp(&a.1));
            all.truncate(SPARSE_VECTOR_CAP);
        }
        Self(all.into_iter().collect())
    }

    /// Number of non-zero entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the vector has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_produces_unit_vector() {
        let mut v = DenseVector(vec![3.0, 4.0]);
        v.normalize();
        let norm: f32 = v.0.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn normalize_leaves_zero_vector_untouched() {
        let mut v = DenseVector(vec![0.0, 0.0]);
        v.normalize();
        assert_eq!(v.0, vec![0.0, 0.0]);
    }

    #[test]
    fn capped_keeps_highest_weight_entries() {
        let entries = (0..(SPARSE_VECTOR_CAP + 10)).map(|i| (i as u32, i as f32));
        let sparse = SparseVector::capped(entries);
        assert_eq!(sparse.len(), SPARSE_VECTOR_CAP);
        assert!(sparse.0.contains_key(&(SPARSE_VECTOR_CAP as u32 + 9)));
        assert!(!sparse.0.contains_key(&0));
    }
}
