/// Axis-aligned face rectangle in image coordinates.
///
/// `confidence` is filled in by detectors that score their output and left
/// as `None` for boxes constructed by hand or by alignment helpers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub confidence: Option<f64>,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence: None,
        }
    }

    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Multiply every coordinate by `factor` (used to undo an image rescale).
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
            width: self.width * factor,
            height: self.height * factor,
            confidence: self.confidence,
        }
    }

    /// Shrink by `amount` on every side; never produces negative extents.
    pub fn shrunk(&self, amount: f64) -> Self {
        Self {
            x: self.x + amount,
            y: self.y + amount,
            width: (self.width - 2.0 * amount).max(0.0),
            height: (self.height - 2.0 * amount).max(0.0),
            confidence: self.confidence,
        }
    }

    /// Intersect with the `[0, width) × [0, height)` image area.
    pub fn clamped(&self, width: u32, height: u32) -> Self {
        let x1 = self.x.clamp(0.0, width as f64);
        let y1 = self.y.clamp(0.0, height as f64);
        let x2 = self.right().clamp(0.0, width as f64);
        let y2 = self.bottom().clamp(0.0, height as f64);
        Self {
            confidence: self.confidence,
            ..Self::from_corners(x1, y1, x2, y2)
        }
    }

    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let ix1 = self.x.max(other.x);
        let iy1 = self.y.max(other.y);
        let ix2 = self.right().min(other.right());
        let iy2 = self.bottom().min(other.bottom());

        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        if inter == 0.0 {
            return 0.0;
        }
        inter / (self.area() + other.area() - inter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn bbox(x: f64, y: f64, w: f64, h: f64) -> BoundingBox {
        BoundingBox::new(x, y, w, h)
    }

    // ── IoU ──────────────────────────────────────────────────────────

    #[test]
    fn test_iou_identical_boxes() {
        let a = bbox(10.0, 10.0, 100.0, 100.0);
        assert_relative_eq!(a.iou(&a), 1.0);
    }

    #[test]
    fn test_iou_partial_overlap() {
        // intersection 50*100 = 5000, union 15000
        let a = bbox(0.0, 0.0, 100.0, 100.0);
        let b = bbox(50.0, 0.0, 100.0, 100.0);
        assert_relative_eq!(a.iou(&b), 5000.0 / 15000.0);
    }

    #[test]
    fn test_iou_contained() {
        let a = bbox(0.0, 0.0, 100.0, 100.0);
        let b = bbox(25.0, 25.0, 50.0, 50.0);
        assert_relative_eq!(a.iou(&b), 2500.0 / 10000.0);
    }

    #[rstest]
    #[case::no_overlap(bbox(0.0, 0.0, 50.0, 50.0), bbox(100.0, 100.0, 50.0, 50.0))]
    #[case::touching_edges(bbox(0.0, 0.0, 50.0, 50.0), bbox(50.0, 0.0, 50.0, 50.0))]
    #[case::zero_width(bbox(0.0, 0.0, 0.0, 100.0), bbox(0.0, 0.0, 50.0, 50.0))]
    fn test_iou_is_zero(#[case] a: BoundingBox, #[case] b: BoundingBox) {
        assert_relative_eq!(a.iou(&b), 0.0);
    }

    // ── Geometry helpers ─────────────────────────────────────────────

    #[test]
    fn test_from_corners() {
        let b = BoundingBox::from_corners(10.0, 20.0, 30.0, 60.0);
        assert_eq!(b, bbox(10.0, 20.0, 20.0, 40.0));
    }

    #[test]
    fn test_scaled_keeps_confidence() {
        let b = bbox(10.0, 20.0, 30.0, 40.0).with_confidence(0.8).scaled(0.5);
        assert_eq!(b.x, 5.0);
        assert_eq!(b.y, 10.0);
        assert_eq!(b.width, 15.0);
        assert_eq!(b.height, 20.0);
        assert_eq!(b.confidence, Some(0.8));
    }

    #[test]
    fn test_shrunk() {
        let b = bbox(0.0, 0.0, 150.0, 150.0).shrunk(3.0);
        assert_eq!(b, bbox(3.0, 3.0, 144.0, 144.0));
    }

    #[test]
    fn test_shrunk_never_negative() {
        let b = bbox(0.0, 0.0, 4.0, 4.0).shrunk(3.0);
        assert_eq!(b.width, 0.0);
        assert!(b.is_empty());
    }

    #[test]
    fn test_clamped_to_image() {
        let b = bbox(-10.0, 5.0, 50.0, 200.0).clamped(30, 100);
        assert_eq!(b, bbox(0.0, 5.0, 30.0, 95.0));
    }

    #[test]
    fn test_center_and_area() {
        let b = bbox(10.0, 10.0, 20.0, 40.0);
        assert_eq!(b.center(), (20.0, 30.0));
        assert_relative_eq!(b.area(), 800.0);
    }
}
