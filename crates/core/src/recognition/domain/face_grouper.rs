use crate::recognition::domain::embedding::Embedding;

/// Domain interface for grouping face embeddings by identity.
///
/// Returns a partition of `0..embeddings.len()`: every index appears in
/// exactly one non-empty group.
pub trait FaceGrouper: Send + Sync {
    fn group(&self, embeddings: &[Embedding]) -> Vec<Vec<usize>>;
}
