use std::path::Path;

use super::error::FaceToolsError;
use super::image::Image;

/// Decode an image file into RGB pixels.
///
/// Every pixel format is converted to 8-bit RGB; alpha is dropped.
pub fn read_image(path: &Path) -> Result<Image, FaceToolsError> {
    let decoded = image::open(path).map_err(|source| FaceToolsError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Image::from(decoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_test_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let mut img = image::RgbImage::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = image::Rgb([50, 100, 200]);
        }
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_read_png_dimensions_and_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), "test.png", 100, 80);
        let image = read_image(&path).unwrap();
        assert_eq!(image.width(), 100);
        assert_eq!(image.height(), 80);
        assert_eq!(image.pixel(0, 0), [50, 100, 200]);
    }

    #[test]
    fn test_read_rgba_drops_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alpha.png");
        image::RgbaImage::from_pixel(4, 4, image::Rgba([10, 20, 30, 40]))
            .save(&path)
            .unwrap();
        let image = read_image(&path).unwrap();
        assert_eq!(image.pixel(3, 3), [10, 20, 30]);
    }

    #[test]
    fn test_read_nonexistent_fails() {
        let err = read_image(Path::new("/nonexistent/test.png")).unwrap_err();
        assert!(matches!(err, FaceToolsError::ImageLoad { .. }));
    }

    #[test]
    fn test_read_garbage_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();
        assert!(read_image(&path).is_err());
    }
}
