use std::path::Path;

use image::DynamicImage;

use crate::AssetError;

/// A 2-D grid of height samples in `[0, 255]`, row-major (`x + y * width`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Heightmap {
    width: usize,
    height: usize,
    samples: Vec<f32>,
}

impl Heightmap {
    /// Build from raw samples. `samples.len()` must equal `width * height`.
    pub fn from_samples(
        width: usize,
        height: usize,
        samples: Vec<f32>,
    ) -> Result<Self, AssetError> {
        if samples.len() != width * height {
            return Err(AssetError::InvalidHeightmap {
                width,
                height,
                samples: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// A zero-sized heightmap. Generates an empty mesh.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decode the red channel of an image, one sample per pixel.
    pub fn from_image(image: &DynamicImage) -> Self {
        let rgb = image.to_rgb8();
        let (width, height) = (rgb.width() as usize, rgb.height() as usize);
        let mut samples = vec![0.0; width * height];
        for (x, y, pixel) in rgb.enumerate_pixels() {
            samples[x as usize + y as usize * width] = f32::from(pixel[0]);
        }
        Self {
            width,
            height,
            samples,
        }
    }

    /// Load and decode an image file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let image = image::open(path.as_ref())?;
        Ok(Self::from_image(&image))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample at grid coordinate `(x, y)`.
    pub fn sample(&self, x: usize, y: usize) -> f32 {
        self.samples[x + y * self.width]
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn from_samples_checks_length() {
        assert!(Heightmap::from_samples(2, 2, vec![0.0; 4]).is_ok());
        let err = Heightmap::from_samples(3, 2, vec![0.0; 4]).unwrap_err();
        assert!(matches!(err, AssetError::InvalidHeightmap { samples: 4, .. }));
    }

    #[test]
    fn decodes_red_channel() {
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(2, 1, Rgb([200, 10, 10]));
        img.put_pixel(0, 1, Rgb([7, 255, 255]));
        let map = Heightmap::from_image(&DynamicImage::ImageRgb8(img));
        assert_eq!(map.width(), 3);
        assert_eq!(map.height(), 2);
        assert_eq!(map.sample(2, 1), 200.0);
        assert_eq!(map.sample(0, 1), 7.0);
        assert_eq!(map.sample(1, 0), 0.0);
    }

    #[test]
    fn load_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hm.png");
        let mut img = RgbImage::new(4, 4);
        img.put_pixel(1, 2, Rgb([128, 0, 0]));
        img.save(&path).unwrap();

        let map = Heightmap::load(&path).unwrap();
        assert_eq!(map.samples().len(), 16);
        assert_eq!(map.sample(1, 2), 128.0);
    }

    #[test]
    fn load_missing_file_fails() {
        assert!(Heightmap::load("/nonexistent/heightmap.png").is_err());
    }
}
