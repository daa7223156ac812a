use crate::recognition::domain::embedding::Embedding;
use crate::shared::image::Image;

/// Domain interface for the pretrained embedding network.
///
/// Takes a batch of aligned face chips and returns one embedding per chip,
/// in input order. Implementations should push the whole batch through
/// the network in one pass where they can.
pub trait EmbeddingNetwork: Send + Sync {
    fn embed(&self, chips: &[Image]) -> Result<Vec<Embedding>, Box<dyn std::error::Error>>;
}
