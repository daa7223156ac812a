use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::detection::domain::face::Face;
use crate::recognition::domain::chinese_whispers::ChineseWhispersGrouper;
use crate::recognition::domain::embedding::{matched, Embedding};
use crate::recognition::domain::embedding_network::EmbeddingNetwork;
use crate::recognition::domain::face_grouper::FaceGrouper;
use crate::recognition::domain::jitter::{jitter_image, JitterConfig};
use crate::shared::error::{validate_threshold, FaceToolsError};
use crate::shared::image::Image;

/// Embeds aligned faces and decides identity from the embeddings.
///
/// With jitter enabled every face is embedded as the mean over a stack of
/// randomly perturbed crops; otherwise a batch of faces goes through the
/// network in a single pass. The threshold drives both matching and
/// clustering.
pub struct FaceRecogniser {
    network: Box<dyn EmbeddingNetwork>,
    grouper: Box<dyn FaceGrouper>,
    threshold: f32,
    jitter: bool,
    jitter_config: JitterConfig,
    seed: Option<u64>,
}

impl FaceRecogniser {
    pub fn new(
        network: Box<dyn EmbeddingNetwork>,
        threshold: f32,
        jitter: bool,
        seed: Option<u64>,
    ) -> Result<Self, FaceToolsError> {
        let threshold = validate_threshold(threshold)?;
        Ok(Self {
            network,
            grouper: Box::new(ChineseWhispersGrouper::new(threshold, seed)),
            threshold,
            jitter,
            jitter_config: JitterConfig::default(),
            seed,
        })
    }

    pub fn with_grouper(mut self, grouper: Box<dyn FaceGrouper>) -> Self {
        self.grouper = grouper;
        self
    }

    pub fn with_jitter_config(mut self, config: JitterConfig) -> Self {
        self.jitter_config = config;
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn jitter(&self) -> bool {
        self.jitter
    }

    pub fn set_jitter(&mut self, state: bool) {
        self.jitter = state;
    }

    pub fn matches(&self, e1: &Embedding, e2: &Embedding) -> bool {
        matched(e1, e2, self.threshold)
    }

    pub fn get_embedding(&self, face: &Face) -> Result<Embedding, Box<dyn std::error::Error>> {
        self.get_embeddings(std::slice::from_ref(face))?
            .pop()
            .ok_or_else(|| no_output(1, 0).into())
    }

    /// One embedding per face, in order. Every face must be aligned.
    pub fn get_embeddings(
        &self,
        faces: &[Face],
    ) -> Result<Vec<Embedding>, Box<dyn std::error::Error>> {
        if faces.is_empty() {
            return Ok(Vec::new());
        }
        let chips = faces
            .iter()
            .map(|f| f.chip().ok_or("face has not been aligned"))
            .collect::<Result<Vec<&Image>, _>>()?;

        let embeddings = if self.jitter {
            self.embed_jittered(&chips)?
        } else {
            let batch: Vec<Image> = chips.into_iter().cloned().collect();
            self.network.embed(&batch)?
        };
        if embeddings.len() != faces.len() {
            return Err(no_output(faces.len(), embeddings.len()).into());
        }
        Ok(embeddings)
    }

    fn embed_jittered(
        &self,
        chips: &[&Image],
    ) -> Result<Vec<Embedding>, Box<dyn std::error::Error>> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        chips
            .iter()
            .map(|chip| -> Result<Embedding, Box<dyn std::error::Error>> {
                let stack = jitter_image(chip, &self.jitter_config, &mut rng);
                let embeddings = self.network.embed(&stack)?;
                Embedding::mean(&embeddings).ok_or_else(|| no_output(stack.len(), 0).into())
            })
            .collect()
    }

    /// Partition `embeddings` into identities.
    pub fn get_people(&self, embeddings: &[Embedding]) -> Vec<Vec<usize>> {
        self.grouper.group(embeddings)
    }
}

fn no_output(expected: usize, got: usize) -> FaceToolsError {
    FaceToolsError::UnexpectedModelOutput(format!("expected {expected} embedding(s), got {got}"))
}
