//! Post-processing shared by the detection backends.

use crate::shared::bounding_box::BoundingBox;

/// Greedy non-maximum suppression.
///
/// Boxes are visited in descending confidence order (boxes without a
/// confidence sort last); any box overlapping an already kept one by more
/// than `iou_thresh` is dropped.
pub fn nms(mut boxes: Vec<BoundingBox>, iou_thresh: f64) -> Vec<BoundingBox> {
    boxes.sort_by(|a, b| {
        b.confidence
            .unwrap_or(f64::NEG_INFINITY)
            .partial_cmp(&a.confidence.unwrap_or(f64::NEG_INFINITY))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<BoundingBox> = Vec::with_capacity(boxes.len());
    for candidate in boxes {
        if keep.iter().all(|kept| kept.iou(&candidate) <= iou_thresh) {
            keep.push(candidate);
        }
    }
    keep
}
