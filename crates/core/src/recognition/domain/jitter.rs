//! Random crop perturbation of aligned face chips.
//!
//! Each crop keeps the face nearly filling the output while shifting and
//! slightly rotating it; half of the crops are mirrored. Averaging
//! embeddings over such a stack damps sensitivity to alignment noise.

use rand::Rng;

use crate::detection::domain::face_aligner::{warp, SimilarityTransform};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::FACE_CHIP_SIZE;
use crate::shared::image::Image;

/// Sampling parameters for [`jitter_image`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JitterConfig {
    /// Output crop side length.
    pub chip_size: u32,
    /// Number of crops produced per face.
    pub num_crops: usize,
    /// Maximum shift of the face centre, as a fraction of the face box size.
    pub translate_amount: f64,
    pub max_rotation_degrees: f64,
    /// Face height as a fraction of crop height, sampled uniformly in this range.
    pub min_object_height: f64,
    pub max_object_height: f64,
    pub randomly_flip: bool,
    /// The face box is the input rectangle shrunk by this many pixels per side.
    pub object_inset: f64,
}

impl Default for JitterConfig {
    fn default() -> Self {
        Self {
            chip_size: FACE_CHIP_SIZE,
            num_crops: 100,
            translate_amount: 0.02,
            max_rotation_degrees: 3.0,
            min_object_height: 0.97,
            max_object_height: 0.99999,
            randomly_flip: true,
            object_inset: 3.0,
        }
    }
}

/// Produce `config.num_crops` perturbed copies of `image`.
///
/// Every crop contains the face; no background-only crops are generated.
pub fn jitter_image(image: &Image, config: &JitterConfig, rng: &mut impl Rng) -> Vec<Image> {
    let object = BoundingBox::new(0.0, 0.0, image.width() as f64, image.height() as f64)
        .shrunk(config.object_inset);
    (0..config.num_crops)
        .map(|_| random_crop(image, &object, config, rng))
        .collect()
}

fn random_crop(
    image: &Image,
    object: &BoundingBox,
    config: &JitterConfig,
    rng: &mut impl Rng,
) -> Image {
    let height_fraction = rng.random_range(config.min_object_height..=config.max_object_height);
    let side = object.height / height_fraction;

    let t = config.translate_amount;
    let dx = rng.random_range(-t..=t) * object.width;
    let dy = rng.random_range(-t..=t) * object.height;
    let (cx, cy) = object.center();

    let r = config.max_rotation_degrees;
    let angle = rng.random_range(-r..=r).to_radians();
    let flip = config.randomly_flip && rng.random_bool(0.5);

    let crop = warp(
        image,
        &crop_transform(cx + dx, cy + dy, side, angle, config.chip_size),
        config.chip_size,
    );
    if flip {
        mirror(&crop)
    } else {
        crop
    }
}

/// Crop pixels → image pixels for a `side`-wide square centred on
/// `(cx, cy)`, rotated by `angle` radians.
fn crop_transform(cx: f64, cy: f64, side: f64, angle: f64, chip_size: u32) -> SimilarityTransform {
    let scale = side / chip_size as f64;
    let a = scale * angle.cos();
    let b = scale * angle.sin();
    let half = chip_size as f64 / 2.0;
    SimilarityTransform {
        a,
        b,
        tx: cx - (a * half - b * half),
        ty: cy - (b * half + a * half),
    }
}

fn mirror(image: &Image) -> Image {
    let w = image.width() as usize;
    let mut data = Vec::with_capacity(image.data().len());
    for row in image.data().chunks_exact(w * 3) {
        for px in row.chunks_exact(3).rev() {
            data.extend_from_slice(px);
        }
    }
    Image::new(data, image.width(), image.height())
}
