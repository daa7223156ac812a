//! Five-point face landmarks used as alignment anchors.
//!
//! Landmark models disagree on point count; everything downstream works on
//! the same five anchors: both eye centres, nose tip and the two mouth
//! corners. Denser layouts are reduced on construction.

pub const LEFT_EYE: usize = 0;
pub const RIGHT_EYE: usize = 1;
pub const NOSE: usize = 2;
pub const LEFT_MOUTH: usize = 3;
pub const RIGHT_MOUTH: usize = 4;

/// iBUG 300-W 68-point layout indices.
const IBUG_LEFT_EYE: std::ops::Range<usize> = 36..42;
const IBUG_RIGHT_EYE: std::ops::Range<usize> = 42..48;
const IBUG_NOSE_TIP: usize = 30;
const IBUG_LEFT_MOUTH: usize = 48;
const IBUG_RIGHT_MOUTH: usize = 54;

#[derive(Clone, Debug, PartialEq)]
pub struct FaceLandmarks {
    /// Image coordinates, ordered per the index constants above.
    points: [(f64, f64); 5],
}

impl FaceLandmarks {
    pub fn new(points: [(f64, f64); 5]) -> Self {
        Self { points }
    }

    /// Build from a landmark model's raw output (5 or 68 points).
    pub fn from_points(points: &[(f64, f64)]) -> Result<Self, String> {
        match points.len() {
            5 => Ok(Self::new([
                points[0], points[1], points[2], points[3], points[4],
            ])),
            68 => Ok(Self::from_ibug68(points)),
            n => Err(format!("expected 5 or 68 landmark points, got {n}")),
        }
    }

    fn from_ibug68(points: &[(f64, f64)]) -> Self {
        Self::new([
            mean(&points[IBUG_LEFT_EYE]),
            mean(&points[IBUG_RIGHT_EYE]),
            points[IBUG_NOSE_TIP],
            points[IBUG_LEFT_MOUTH],
            points[IBUG_RIGHT_MOUTH],
        ])
    }

    pub fn points(&self) -> &[(f64, f64); 5] {
        &self.points
    }

    pub fn eye_distance(&self) -> f64 {
        let (lx, ly) = self.points[LEFT_EYE];
        let (rx, ry) = self.points[RIGHT_EYE];
        ((rx - lx).powi(2) + (ry - ly).powi(2)).sqrt()
    }
}

fn mean(points: &[(f64, f64)]) -> (f64, f64) {
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(ax, ay), (x, y)| (ax + x, ay + y));
    (sx / n, sy / n)
}
