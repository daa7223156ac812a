use crate::shared::bounding_box::BoundingBox;
use crate::shared::image::Image;

/// A detected face: where it is and, once aligned, its canonical chip.
///
/// Immutable once built; the `with_*` methods return modified copies.
/// `id` and `name` are free-form metadata for callers; the pipeline never
/// reads them.
#[derive(Clone, Debug, PartialEq)]
pub struct Face {
    id: Option<u32>,
    name: Option<String>,
    bounding_box: BoundingBox,
    chip: Option<Image>,
}

impl Face {
    pub fn new(bounding_box: BoundingBox) -> Self {
        Self {
            id: None,
            name: None,
            bounding_box,
            chip: None,
        }
    }

    pub fn with_id(&self, id: u32) -> Self {
        Self {
            id: Some(id),
            ..self.clone()
        }
    }

    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self.clone()
        }
    }

    /// Copy of this face carrying an aligned chip.
    pub fn with_chip(&self, chip: Image) -> Self {
        Self {
            chip: Some(chip),
            ..self.clone()
        }
    }

    pub fn id(&self) -> Option<u32> {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    /// The aligned face image, present after alignment.
    pub fn chip(&self) -> Option<&Image> {
        self.chip.as_ref()
    }

    pub fn is_aligned(&self) -> bool {
        self.chip.is_some()
    }
}
