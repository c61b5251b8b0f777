//! RGB to grayscale conversion using ITU-R BT.601 luminance formula.

use crate::raster::Raster;

/// Convert an RGB raster to grayscale using ITU-R BT.601 luminance formula.
///
/// The luminance formula is: Y = 0.299*R + 0.587*G + 0.114*B
///
/// Integer math with coefficients scaled by 1000:
/// - R: 299/1000
/// - G: 587/1000
/// - B: 114/1000
///
/// # Returns
/// A vector of grayscale values (0-255), one per pixel
pub fn to_grayscale(raster: &Raster) -> Vec<u8> {
    let mut gray = Vec::with_capacity(raster.pixel_count());

    for rgb in raster.data().chunks_exact(3) {
        let r = rgb[0] as u32;
        let g = rgb[1] as u32;
        let b = rgb[2] as u32;
        let luminance = (299 * r + 587 * g + 114 * b) / 1000;
        gray.push(luminance as u8);
    }

    gray
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_colors() {
        let raster = Raster::from_rgb(3, 1, vec![255, 0, 0, 0, 255, 0, 0, 0, 255]).unwrap();
        // 299 * 255 / 1000 = 76, 587 * 255 / 1000 = 149, 114 * 255 / 1000 = 29
        assert_eq!(to_grayscale(&raster), vec![76, 149, 29]);
    }

    #[test]
    fn test_white_and_black() {
        let raster = Raster::from_rgb(2, 1, vec![255, 255, 255, 0, 0, 0]).unwrap();
        assert_eq!(to_grayscale(&raster), vec![255, 0]);
    }
}
