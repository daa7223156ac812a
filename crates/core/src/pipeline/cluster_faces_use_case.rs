use std::path::{Path, PathBuf};

use crate::detection::domain::face_extractor::FaceExtractor;
use crate::pipeline::search_executor::ProgressFn;
use crate::recognition::domain::embedding::Embedding;
use crate::recognition::domain::face_recogniser::FaceRecogniser;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::image_file_reader::read_image;

/// Where a clustered face came from.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceRef {
    pub path: PathBuf,
    /// Position of the face among those detected in `path`.
    pub face_index: usize,
    /// In the coordinates of the downscaled image used for detection.
    pub bounding_box: BoundingBox,
}

/// Detects every face across a set of images and groups them by identity.
pub struct ClusterFacesUseCase {
    extractor: FaceExtractor,
    recogniser: FaceRecogniser,
    on_progress: Option<Box<ProgressFn<'static>>>,
}

impl ClusterFacesUseCase {
    pub fn new(extractor: FaceExtractor, recogniser: FaceRecogniser) -> Self {
        Self {
            extractor,
            recogniser,
            on_progress: None,
        }
    }

    pub fn with_progress(mut self, on_progress: Box<ProgressFn<'static>>) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    /// Clusters of faces, one inner list per identity. Every detected face
    /// appears in exactly one cluster; images that fail to decode are
    /// skipped with a warning.
    pub fn execute(
        &self,
        images: &[PathBuf],
    ) -> Result<Vec<Vec<FaceRef>>, Box<dyn std::error::Error>> {
        let mut refs: Vec<FaceRef> = Vec::new();
        let mut embeddings: Vec<Embedding> = Vec::new();

        for (i, path) in images.iter().enumerate() {
            self.collect_faces(path, &mut refs, &mut embeddings)?;
            if let Some(ref callback) = self.on_progress {
                callback(i + 1, images.len());
            }
        }

        let people = self.recogniser.get_people(&embeddings);
        log::info!(
            "{} face(s) from {} image(s) form {} cluster(s)",
            refs.len(),
            images.len(),
            people.len()
        );
        Ok(people
            .into_iter()
            .map(|group| group.into_iter().map(|i| refs[i].clone()).collect())
            .collect())
    }

    fn collect_faces(
        &self,
        path: &Path,
        refs: &mut Vec<FaceRef>,
        embeddings: &mut Vec<Embedding>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let image = match read_image(path) {
            Ok(image) => image,
            Err(e) => {
                log::warn!("Skipping {}: {e}", path.display());
                return Ok(());
            }
        };
        let faces = self.extractor.extract_faces(&image)?;
        embeddings.extend(self.recogniser.get_embeddings(&faces)?);
        refs.extend(faces.iter().enumerate().map(|(face_index, face)| FaceRef {
            path: path.to_path_buf(),
            face_index,
            bounding_box: *face.bounding_box(),
        }));
        Ok(())
    }
}
