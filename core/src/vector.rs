use std::collections::BTreeMap;

/// Sparse or dense token -> weight map, stored L2-normalized.
///
/// Weights are divided by the vector's Euclidean norm at construction, so the
/// dot product of two vectors is already their cosine similarity. A zero
/// vector is left as is and is similar to nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenVector {
    weights: BTreeMap<String, f64>,
    norm: f64,
}

impl TokenVector {
    pub fn new(weights: BTreeMap<String, f64>) -> Self {
        let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
        let weights = if norm > 0.0 {
            weights.into_iter().map(|(token, w)| (token, w / norm)).collect()
        } else {
            weights
        };
        Self { weights, norm }
    }

    /// Euclidean norm of the weights as given, before normalization.
    pub fn norm(&self) -> f64 { self.norm }

    /// Normalized weight of `token`, 0.0 when absent.
    pub fn weight(&self, token: &str) -> f64 { self.weights.get(token).copied().unwrap_or(0.0) }

    pub fn len(&self) -> usize { self.weights.len() }
    pub fn is_empty(&self) -> bool { self.weights.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(t, w)| (t.as_str(), *w))
    }

    /// (A·B) / (‖A‖·‖B‖); 0.0 if either side is a zero vector.
    pub fn cosine_similarity(&self, other: &TokenVector) -> f64 {
        if self.norm == 0.0 || other.norm == 0.0 {
            return 0.0;
        }
        let (small, large) = if self.len() <= other.len() { (self, other) } else { (other, self) };
        small.weights.iter().map(|(token, w)| w * large.weight(token)).sum()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for TokenVector {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(t, w)| (t.into(), w)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_raw_norm() {
        let v: TokenVector = [("x", 3.0), ("y", 4.0)].into_iter().collect();
        assert_eq!(v.norm(), 5.0);
        assert!((v.weight("x") - 0.6).abs() < 1e-12);
        assert_eq!(v.weight("z"), 0.0);
    }

    #[test]
    fn zero_vector_is_similar_to_nothing() {
        let zero: TokenVector = [("x", 0.0)].into_iter().collect();
        let x: TokenVector = [("x", 1.0)].into_iter().collect();
        assert_eq!(zero.cosine_similarity(&x), 0.0);
        assert_eq!(x.cosine_similarity(&zero), 0.0);
        assert_eq!(zero.cosine_similarity(&zero), 0.0);
    }
}
