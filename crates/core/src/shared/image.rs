use ndarray::ArrayView3;

/// An RGB image: contiguous 8-bit pixels in row-major order.
///
/// Decoding happens at the I/O boundary only; the pipeline works on this type.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

pub const CHANNELS: usize = 3;

impl Image {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
        }
    }

    /// Solid-colour image, mostly useful for fixtures and padding.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * CHANNELS);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&rgb);
        }
        Self::new(data, width, height)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn longest_side(&self) -> u32 {
        self.width.max(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let offset = (y as usize * self.width as usize + x as usize) * CHANNELS;
        [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ]
    }

    /// Bilinear sample at a sub-pixel position. Pixels outside the image read as black.
    pub fn sample_bilinear(&self, x: f64, y: f64) -> [f64; 3] {
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let fetch = |px: i64, py: i64| -> [f64; 3] {
            if px < 0 || py < 0 || px >= self.width as i64 || py >= self.height as i64 {
                return [0.0; 3];
            }
            let p = self.pixel(px as u32, py as u32);
            [p[0] as f64, p[1] as f64, p[2] as f64]
        };

        let tl = fetch(x0, y0);
        let tr = fetch(x0 + 1, y0);
        let bl = fetch(x0, y0 + 1);
        let br = fetch(x0 + 1, y0 + 1);

        let mut out = [0.0; 3];
        for c in 0..CHANNELS {
            out[c] = tl[c] * (1.0 - fx) * (1.0 - fy)
                + tr[c] * fx * (1.0 - fy)
                + bl[c] * (1.0 - fx) * fy
                + br[c] * fx * fy;
        }
        out
    }

    /// Resample to exactly `width × height` with a triangle filter.
    pub fn resize(&self, width: u32, height: u32) -> Image {
        if width == self.width && height == self.height {
            return self.clone();
        }
        let resized = image::imageops::resize(
            &self.to_rgb_image(),
            width,
            height,
            image::imageops::FilterType::Triangle,
        );
        Image::from(resized)
    }

    /// Luma plane in row-major order.
    pub fn to_grayscale(&self) -> Vec<u8> {
        image::imageops::grayscale(&self.to_rgb_image()).into_raw()
    }

    pub fn to_rgb_image(&self) -> image::RgbImage {
        image::RgbImage::from_raw(self.width, self.height, self.data.clone())
            .unwrap_or_else(|| image::RgbImage::new(self.width, self.height))
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(
            (self.height as usize, self.width as usize, CHANNELS),
            &self.data,
        )
        .expect("Image data length must match dimensions")
    }
}

impl From<image::RgbImage> for Image {
    fn from(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Image::new(img.into_raw(), width, height)
    }
}

impl From<image::DynamicImage> for Image {
    fn from(img: image::DynamicImage) -> Self {
        Image::from(img.into_rgb8())
    }
}
