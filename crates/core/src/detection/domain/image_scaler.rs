//! Resolution management around detection.
//!
//! Large inputs are scaled down once before detection to bound memory;
//! small inputs are doubled (up to a cap) so that small faces reach the
//! detector's minimum window size.

use crate::shared::error::FaceToolsError;
use crate::shared::image::Image;

pub const DEFAULT_MAX_SCALING_LENGTH: u32 = 1800;
pub const DEFAULT_MAX_SCALING_TIMES: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScalingConfig {
    /// Longest side an input may keep before downscaling; also the length
    /// at which upsampling stops.
    pub max_scaling_length: u32,
    /// Maximum number of doublings applied before detection.
    pub max_scaling_times: u32,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            max_scaling_length: DEFAULT_MAX_SCALING_LENGTH,
            max_scaling_times: DEFAULT_MAX_SCALING_TIMES,
        }
    }
}

impl ScalingConfig {
    pub fn validate(self) -> Result<Self, FaceToolsError> {
        if self.max_scaling_length == 0 {
            return Err(FaceToolsError::InvalidScaling(
                "max_scaling_length must be > 0".into(),
            ));
        }
        Ok(self)
    }
}

/// Shrink `image` so its longest side equals `max_scaling_length`, keeping
/// the aspect ratio. Images already within bounds are returned unchanged.
pub fn downscale(image: &Image, config: &ScalingConfig) -> Image {
    let longest = image.longest_side();
    if longest <= config.max_scaling_length {
        return image.clone();
    }

    let scale = config.max_scaling_length as f64 / longest as f64;
    let scale_side = |side: u32| -> u32 {
        if side == longest {
            config.max_scaling_length
        } else {
            ((side as f64 * scale).round() as u32).max(1)
        }
    };
    let (width, height) = (scale_side(image.width()), scale_side(image.height()));
    log::debug!(
        "Downscaling {}x{} -> {}x{}",
        image.width(),
        image.height(),
        width,
        height
    );
    image.resize(width, height)
}

/// Double `image` until its longest side reaches `max_scaling_length` or
/// `max_scaling_times` doublings have been applied.
///
/// Returns the upsampled image and the total scale factor applied, so
/// coordinates found on the result can be mapped back with `1 / factor`.
pub fn upsample(image: &Image, config: &ScalingConfig) -> (Image, f64) {
    let mut current = image.clone();
    let mut factor = 1.0;
    let mut times = 0;
    while !current.is_empty()
        && current.longest_side() < config.max_scaling_length
        && times < config.max_scaling_times
    {
        current = current.resize(current.width() * 2, current.height() * 2);
        factor *= 2.0;
        times += 1;
    }
    if times > 0 {
        log::debug!(
            "Upsampled {}x{} x{} for detection",
            image.width(),
            image.height(),
            factor
        );
    }
    (current, factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn config(length: u32, times: u32) -> ScalingConfig {
        ScalingConfig {
            max_scaling_length: length,
            max_scaling_times: times,
        }
    }

    // ── downscale ────────────────────────────────────────────────────

    #[test]
    fn test_downscale_within_bounds_is_unchanged() {
        let image = Image::filled(300, 200, [1, 2, 3]);
        let out = downscale(&image, &config(300, 5));
        assert_eq!(out, image);
    }

    #[rstest]
    #[case::landscape(400, 300, 180, 135)]
    #[case::portrait(100, 300, 60, 180)]
    #[case::square(250, 250, 180, 180)]
    #[case::awkward_ratio(181, 7, 180, 7)]
    fn test_downscale_longest_side_equals_max(
        #[case] w: u32,
        #[case] h: u32,
        #[case] expected_w: u32,
        #[case] expected_h: u32,
    ) {
        let image = Image::filled(w, h, [0, 0, 0]);
        let out = downscale(&image, &config(180, 5));
        assert_eq!((out.width(), out.height()), (expected_w, expected_h));
    }

    #[test]
    fn test_downscale_preserves_aspect_ratio() {
        let image = Image::filled(333, 211, [0, 0, 0]);
        let out = downscale(&image, &config(180, 5));
        let before = 333.0 / 211.0;
        let after = out.width() as f64 / out.height() as f64;
        assert!((before - after).abs() < 0.01, "{before} vs {after}");
    }

    #[test]
    fn test_downscale_never_produces_zero_side() {
        let image = Image::filled(5000, 1, [0, 0, 0]);
        let out = downscale(&image, &config(100, 5));
        assert_eq!((out.width(), out.height()), (100, 1));
    }

    // ── upsample ─────────────────────────────────────────────────────

    #[test]
    fn test_upsample_stops_at_length() {
        // 100 -> 200 -> 400 -> 800; 800 >= 500 stops.
        let image = Image::filled(100, 50, [0, 0, 0]);
        let (out, factor) = upsample(&image, &config(500, 5));
        assert_eq!(out.width(), 800);
        assert_eq!(out.height(), 400);
        assert_eq!(factor, 8.0);
    }

    #[test]
    fn test_upsample_stops_at_times_cap() {
        let image = Image::filled(10, 10, [0, 0, 0]);
        let (out, factor) = upsample(&image, &config(1800, 2));
        assert_eq!(out.width(), 40);
        assert_eq!(factor, 4.0);
    }

    #[test]
    fn test_upsample_large_image_untouched() {
        let image = Image::filled(200, 100, [0, 0, 0]);
        let (out, factor) = upsample(&image, &config(200, 5));
        assert_eq!(out, image);
        assert_eq!(factor, 1.0);
    }

    #[test]
    fn test_upsample_zero_times_is_noop() {
        let image = Image::filled(20, 20, [0, 0, 0]);
        let (_, factor) = upsample(&image, &config(1800, 0));
        assert_eq!(factor, 1.0);
    }

    #[test]
    fn test_validate_rejects_zero_length() {
        assert!(config(0, 5).validate().is_err());
        assert!(ScalingConfig::default().validate().is_ok());
    }
}
