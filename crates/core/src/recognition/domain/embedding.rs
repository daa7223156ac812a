//! Face embeddings and the "same person" decision.
//!
//! Embeddings are only comparable when produced by the same network and
//! jitter policy; nothing here checks that, callers keep configurations
//! consistent within one operation.

#[derive(Clone, Debug, PartialEq)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Euclidean distance.
    pub fn distance(&self, other: &Embedding) -> f32 {
        debug_assert_eq!(self.len(), other.len(), "embedding dimensions differ");
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f32>()
            .sqrt()
    }

    /// Element-wise mean. `None` for an empty slice.
    pub fn mean(embeddings: &[Embedding]) -> Option<Embedding> {
        let first = embeddings.first()?;
        let mut sum = vec![0.0f32; first.len()];
        for e in embeddings {
            for (acc, v) in sum.iter_mut().zip(e.values()) {
                *acc += v;
            }
        }
        let n = embeddings.len() as f32;
        Some(Embedding(sum.into_iter().map(|v| v / n).collect()))
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// True when the two embeddings are strictly closer than `threshold`.
pub fn matched(e1: &Embedding, e2: &Embedding, threshold: f32) -> bool {
    e1.distance(e2) < threshold
}
