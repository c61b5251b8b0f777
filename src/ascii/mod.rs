//! Raster to ASCII art conversion.
//!
//! The pipeline has three steps:
//!
//! 1. **Grayscale conversion** - RGB to luminance using BT.601
//! 2. **Downsampling** - Reduce resolution to the character grid
//! 3. **Assembly** - Quantize each sample onto [`ASCII_RAMP`] and join rows
//!
//! Failures surface as [`ConversionError`]. Callers that only deal in text
//! can use [`image_to_ascii`], which reports a failure as a line starting
//! with [`CONVERSION_ERROR_PREFIX`] instead.

mod charset;
mod downsample;
mod grayscale;
mod mapping;

use std::path::Path;

pub use charset::{quantize, ASCII_RAMP, BUCKET_WIDTH};
pub use downsample::{downsample, LuminanceGrid};
pub use grayscale::to_grayscale;
pub use mapping::assemble;

use crate::raster::{load_raster_from_path, ConversionError, Raster};

/// Leading text of a conversion failure rendered as art.
pub const CONVERSION_ERROR_PREFIX: &str = "Error converting image to ASCII: ";

/// Convert an in-memory raster to a `width × height` block of characters.
pub fn raster_to_ascii(raster: &Raster, width: u32, height: u32) -> Result<String, ConversionError> {
    let grid = downsample(raster, width, height)?;
    Ok(assemble(&grid))
}

/// Load an image file and convert it to a `width × height` block of characters.
pub fn try_image_to_ascii(path: &Path, width: u32, height: u32) -> Result<String, ConversionError> {
    let raster = load_raster_from_path(path)?;
    raster_to_ascii(&raster, width, height)
}

/// Like [`try_image_to_ascii`], but a failure comes back as descriptive text.
///
/// Use [`is_conversion_error`] to tell the two apart.
pub fn image_to_ascii(path: &Path, width: u32, height: u32) -> String {
    match try_image_to_ascii(path, width, height) {
        Ok(art) => art,
        Err(e) => describe_conversion_error(&e),
    }
}

/// The single place a conversion failure is turned into text.
pub fn describe_conversion_error(error: &ConversionError) -> String {
    format!("{}{}", CONVERSION_ERROR_PREFIX, error)
}

/// Whether a block of text carries a conversion failure.
pub fn is_conversion_error(text: &str) -> bool {
    text.trim_start().starts_with(CONVERSION_ERROR_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_raster_to_ascii_gradient() {
        let raster = Raster::from_luma(3, 1, &[0, 128, 255]).unwrap();
        assert_eq!(raster_to_ascii(&raster, 3, 1).unwrap(), "@*.");
    }

    #[test]
    fn test_image_to_ascii_reports_missing_file_as_text() {
        let dir = TempDir::new().unwrap();
        let text = image_to_ascii(&dir.path().join("missing.png"), 10, 5);
        assert!(is_conversion_error(&text));
    }

    #[test]
    fn test_art_is_not_a_conversion_error() {
        assert!(!is_conversion_error("@@##\n..,,"));
    }
}
