//! In-memory raster images and their on-disk form.

use std::path::Path;

use image::DynamicImage;

/// An RGB pixel grid (3 bytes per pixel, row-major).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Raster {
    /// Wrap an RGB buffer, checking that its length matches the dimensions.
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ConversionError> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(ConversionError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a raster from single-channel samples by replicating each one
    /// across R, G and B.
    pub fn from_luma(width: u32, height: u32, samples: &[u8]) -> Result<Self, ConversionError> {
        let data = samples.iter().flat_map(|&v| [v, v, v]).collect();
        Self::from_rgb(width, height, data).map_err(|_| ConversionError::BufferSize {
            expected: width as usize * height as usize,
            actual: samples.len(),
        })
    }

    pub fn from_image(image: &DynamicImage) -> Self {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        Self {
            width,
            height,
            data: rgb.into_raw(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Encode the raster to `path`; the format follows the file extension.
    pub fn save(&self, path: &Path) -> Result<(), ConversionError> {
        image::save_buffer(
            path,
            &self.data,
            self.width,
            self.height,
            image::ExtendedColorType::Rgb8,
        )?;
        Ok(())
    }
}

/// Decode an image file into a raster.
///
/// Any format the `image` crate recognizes is accepted; the format is
/// guessed from the file contents and extension.
pub fn load_raster_from_path(path: &Path) -> Result<Raster, ConversionError> {
    let image = image::open(path)?;
    Ok(Raster::from_image(&image))
}

/// Errors raised while turning a raster into characters.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("{0}")]
    Image(#[from] image::ImageError),

    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_rgb_rejects_short_buffer() {
        let result = Raster::from_rgb(2, 2, vec![0; 11]);
        assert!(matches!(
            result,
            Err(ConversionError::BufferSize {
                expected: 12,
                actual: 11
            })
        ));
    }

    #[test]
    fn test_from_luma_replicates_channels() {
        let raster = Raster::from_luma(2, 1, &[10, 200]).unwrap();
        assert_eq!(raster.data(), &[10, 10, 10, 200, 200, 200]);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tile.png");
        let raster = Raster::from_rgb(2, 1, vec![255, 0, 0, 0, 0, 255]).unwrap();

        raster.save(&path).unwrap();
        let loaded = load_raster_from_path(&path).unwrap();

        assert_eq!(loaded, raster);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let result = load_raster_from_path(&dir.path().join("nope.png"));
        assert!(matches!(result, Err(ConversionError::Image(_))));
    }

    #[test]
    fn test_load_garbage_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        assert!(load_raster_from_path(&path).is_err());
    }
}
