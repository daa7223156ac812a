//! Face alignment via a 4-DOF similarity transform.
//!
//! Five landmark anchors are mapped onto canonical positions inside a square
//! chip, and the chip is filled by sampling the source image through the
//! fitted transform. Shear is not corrected.

use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::shared::constants::{FACE_CHIP_PADDING, FACE_CHIP_SIZE};
use crate::shared::image::Image;

/// Canonical anchor positions in a unit face envelope (no padding):
/// left eye, right eye, nose tip, left mouth corner, right mouth corner.
const CANONICAL_ANCHORS: [(f64, f64); 5] = [
    (0.2458, 0.2304),
    (0.7542, 0.2304),
    (0.5000, 0.5336),
    (0.3154, 0.7914),
    (0.6846, 0.7914),
];

/// Output geometry of an aligned face chip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChipDetails {
    /// Side length in pixels.
    pub size: u32,
    /// Margin around the face envelope, as a fraction of the envelope size.
    pub padding: f64,
}

impl Default for ChipDetails {
    fn default() -> Self {
        Self {
            size: FACE_CHIP_SIZE,
            padding: FACE_CHIP_PADDING,
        }
    }
}

impl ChipDetails {
    /// Where each anchor lands inside the chip, in pixels.
    pub fn anchor_positions(&self) -> [(f64, f64); 5] {
        let scale = self.size as f64 / (1.0 + 2.0 * self.padding);
        CANONICAL_ANCHORS.map(|(x, y)| ((x + self.padding) * scale, (y + self.padding) * scale))
    }
}

/// `| a -b | x + | tx |`
/// `| b  a | y   | ty |`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimilarityTransform {
    pub a: f64,
    pub b: f64,
    pub tx: f64,
    pub ty: f64,
}

impl SimilarityTransform {
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x - self.b * y + self.tx,
            self.b * x + self.a * y + self.ty,
        )
    }

    pub fn scale(&self) -> f64 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    pub fn rotation_degrees(&self) -> f64 {
        self.b.atan2(self.a).to_degrees()
    }
}

/// Least-squares similarity transform taking `src` points onto `dst` points.
///
/// Closed form on centred coordinates; degenerate input (all source points
/// coincident) yields a pure translation between the centroids.
pub fn estimate_similarity(src: &[(f64, f64)], dst: &[(f64, f64)]) -> SimilarityTransform {
    let n = src.len().min(dst.len()).max(1) as f64;
    let (smx, smy) = centroid(src);
    let (dmx, dmy) = centroid(dst);

    let mut dot = 0.0;
    let mut cross = 0.0;
    let mut norm = 0.0;
    for (&(sx, sy), &(dx, dy)) in src.iter().zip(dst.iter()) {
        let (sx, sy) = (sx - smx, sy - smy);
        let (dx, dy) = (dx - dmx, dy - dmy);
        dot += sx * dx + sy * dy;
        cross += sx * dy - sy * dx;
        norm += sx * sx + sy * sy;
    }

    let (a, b) = if norm / n < 1e-12 {
        (1.0, 0.0)
    } else {
        (dot / norm, cross / norm)
    };

    SimilarityTransform {
        a,
        b,
        tx: dmx - (a * smx - b * smy),
        ty: dmy - (b * smx + a * smy),
    }
}

fn centroid(points: &[(f64, f64)]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(ax, ay), (x, y)| (ax + x, ay + y));
    (sx / n, sy / n)
}

/// Cut an aligned `size × size` chip out of `image`.
///
/// Chip pixels that map outside the source image are black.
pub fn extract_chip(image: &Image, landmarks: &FaceLandmarks, details: &ChipDetails) -> Image {
    // Map chip → image directly so each output pixel is a single lookup.
    let chip_to_image = estimate_similarity(&details.anchor_positions(), landmarks.points());
    warp(image, &chip_to_image, details.size)
}

/// Fill a square output by sampling `image` at `transform(x, y)` for every output pixel.
pub fn warp(image: &Image, transform: &SimilarityTransform, size: u32) -> Image {
    let s = size as usize;
    let mut data = Vec::with_capacity(s * s * 3);
    for oy in 0..s {
        for ox in 0..s {
            let (sx, sy) = transform.apply(ox as f64, oy as f64);
            let rgb = image.sample_bilinear(sx, sy);
            data.extend(rgb.iter().map(|v| v.round().clamp(0.0, 255.0) as u8));
        }
    }
    Image::new(data, size, size)
}
