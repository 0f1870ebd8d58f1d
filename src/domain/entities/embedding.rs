use serde::{Deserialize, Serialize};

/// Dense vector produced once per chunk at ingestion and once per query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding(pub Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// An empty vector is how embedders signal failure.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Cosine of the angle between two vectors; 0.0 when they cannot be compared.
    pub fn cosine_similarity(&self, other: &Embedding) -> f32 {
        if self.dimension() != other.dimension() || self.is_empty() {
            return 0.0;
        }

        let (dot, norm_a, norm_b) = self.0.iter().zip(&other.0).fold(
            (0.0f32, 0.0f32, 0.0f32),
            |(dot, a2, b2), (a, b)| (dot + a * b, a2 + a * a, b2 + b * b),
        );

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot / (norm_a.sqrt() * norm_b.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_mismatched_dimensions() {
        let a = Embedding::new(vec![1.0, 0.0]);
        let b = Embedding::new(vec![1.0, 0.0, 0.0]);
        assert_eq!(a.cosine_similarity(&b), 0.0);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = Embedding::new(vec![1.0, 0.0]);
        let b = Embedding::new(vec![0.0, 2.0]);
        assert!(a.cosine_similarity(&b).abs() < f32::EPSILON);
        assert!((a.cosine_similarity(&a) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_zero_vector_scores_zero() {
        let a = Embedding::new(vec![0.0, 0.0]);
        let b = Embedding::new(vec![1.0, 1.0]);
        assert_eq!(a.cosine_similarity(&b), 0.0);
    }
}
