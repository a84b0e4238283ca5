//! Vector similarity and distance functions

use serde::{Deserialize, Serialize};

/// Distance metric used to rank search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distance {
    /// Cosine distance (1 - cosine similarity)
    #[default]
    Cosine,
    /// Euclidean distance
    L2,
    /// Negative inner product
    MaxInnerProduct,
}

impl Distance {
    /// Distance between two vectors; smaller is more similar.
    ///
    /// Vectors of different lengths are maximally distant.
    pub fn between(&self, a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return f32::INFINITY;
        }

        match self {
            Self::Cosine => 1.0 - cosine_similarity(a, b),
            Self::L2 => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f32>()
                .sqrt(),
            Self::MaxInnerProduct => -inner_product(a, b),
        }
    }
}

impl std::fmt::Display for Distance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cosine => write!(f, "cosine"),
            Self::L2 => write!(f, "l2"),
            Self::MaxInnerProduct => write!(f, "max_inner_product"),
        }
    }
}

/// Dot product of two vectors of equal length
pub fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Calculate cosine similarity between two vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product = inner_product(a, b);
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_identical() {
        let v = [0.3, 0.4, 0.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_cosine_similarity_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_l2_distance() {
        let d = Distance::L2.between(&[0.0, 0.0], &[3.0, 4.0]);
        assert!((d - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_inner_product_ranks_larger_first() {
        let query = [1.0, 1.0];
        let near = Distance::MaxInnerProduct.between(&query, &[2.0, 2.0]);
        let far = Distance::MaxInnerProduct.between(&query, &[0.5, 0.5]);
        assert!(near < far);
    }

    #[test]
    fn test_mismatched_vectors_are_infinitely_far() {
        assert_eq!(Distance::Cosine.between(&[1.0], &[]), f32::INFINITY);
    }

    #[test]
    fn test_distance_display() {
        assert_eq!(Distance::MaxInnerProduct.to_string(), "max_inner_product");
    }
}
