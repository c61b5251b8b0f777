//! Downsampling rasters to fixed-size luminance grids.

use super::grayscale::to_grayscale;
use crate::raster::{ConversionError, Raster};

/// A `width × height` grid of brightness samples in row-major order.
///
/// Always holds exactly `width * height` samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LuminanceGrid {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl LuminanceGrid {
    pub fn from_samples(width: u32, height: u32, samples: Vec<u8>) -> Result<Self, ConversionError> {
        if width == 0 || height == 0 {
            return Err(ConversionError::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(ConversionError::BufferSize {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }
}

/// Downsample a raster to a luminance grid.
///
/// The raster is converted to BT.601 grayscale, then each output cell takes
/// the average brightness of the source pixels it covers. Every cell covers
/// at least one pixel, so a target larger than the source repeats pixels
/// (nearest-neighbor) instead of leaving holes.
///
/// # Errors
/// `ConversionError::InvalidDimensions` if the target or the source has a
/// zero dimension.
pub fn downsample(
    raster: &Raster,
    target_width: u32,
    target_height: u32,
) -> Result<LuminanceGrid, ConversionError> {
    if target_width == 0 || target_height == 0 {
        return Err(ConversionError::InvalidDimensions {
            width: target_width,
            height: target_height,
        });
    }
    let (img_width, img_height) = (raster.width(), raster.height());
    if img_width == 0 || img_height == 0 {
        return Err(ConversionError::InvalidDimensions {
            width: img_width,
            height: img_height,
        });
    }

    let gray = to_grayscale(raster);

    let mut samples = Vec::with_capacity(target_width as usize * target_height as usize);

    for cy in 0..target_height {
        let (start_y, end_y) = cell_span(cy, target_height, img_height);
        for cx in 0..target_width {
            let (start_x, end_x) = cell_span(cx, target_width, img_width);

            let mut sum = 0u64;
            let mut count = 0u64;
            for py in start_y..end_y {
                let row = (py * img_width) as usize;
                for px in start_x..end_x {
                    sum += gray[row + px as usize] as u64;
                    count += 1;
                }
            }

            samples.push((sum / count) as u8);
        }
    }

    LuminanceGrid::from_samples(target_width, target_height, samples)
}

/// Pixel range `[start, end)` covered by cell `index` of `cells`; never empty.
///
/// Edges are exact integer fractions of `limit`, so the last cell always
/// ends on the last pixel.
fn cell_span(index: u32, cells: u32, limit: u32) -> (u32, u32) {
    let edge = |i: u32| (i as u64 * limit as u64 / cells as u64) as u32;
    let start = edge(index).min(limit - 1);
    let end = edge(index + 1).clamp(start + 1, limit);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_rejects_wrong_sample_count() {
        let result = LuminanceGrid::from_samples(3, 2, vec![0; 5]);
        assert!(matches!(result, Err(ConversionError::BufferSize { .. })));
    }

    #[test]
    fn test_grid_rejects_zero_width() {
        let result = LuminanceGrid::from_samples(0, 2, vec![]);
        assert!(matches!(
            result,
            Err(ConversionError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_downsample_averages_cells() {
        // 4x2 image, left half black, right half white
        let raster = Raster::from_luma(4, 2, &[0, 0, 255, 255, 0, 0, 255, 255]).unwrap();
        let grid = downsample(&raster, 2, 1).unwrap();
        assert_eq!(grid.samples(), &[0, 255]);
    }

    #[test]
    fn test_downsample_upscales_without_holes() {
        let raster = Raster::from_luma(2, 1, &[40, 220]).unwrap();
        let grid = downsample(&raster, 4, 3).unwrap();
        assert_eq!(grid.samples().len(), 12);
        assert_eq!(&grid.samples()[..4], &[40, 40, 220, 220]);
    }

    #[test]
    fn test_downsample_uneven_ratio_keeps_dimensions() {
        let raster = Raster::from_luma(7, 5, &[128; 35]).unwrap();
        let grid = downsample(&raster, 3, 4).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 4);
        assert!(grid.samples().iter().all(|&v| v == 128));
    }

    #[test]
    fn test_cell_spans_cover_every_pixel() {
        for limit in 1..=40u32 {
            for cells in 1..=40u32 {
                let mut covered = vec![false; limit as usize];
                for i in 0..cells {
                    let (start, end) = cell_span(i, cells, limit);
                    assert!(start < end && end <= limit, "{} cells over {}", cells, limit);
                    covered[start as usize..end as usize].fill(true);
                }
                assert!(covered.iter().all(|&c| c), "{} cells over {} left a gap", cells, limit);
                assert_eq!(cell_span(cells - 1, cells, limit).1, limit);
            }
        }
    }

    #[test]
    fn test_downsample_samples_last_row() {
        let mut samples = vec![0u8; 15];
        samples[14] = 255;
        let raster = Raster::from_luma(1, 15, &samples).unwrap();
        let grid = downsample(&raster, 1, 11).unwrap();
        // Last cell spans rows 13..15
        assert_eq!(grid.samples()[10], 127);
    }

    #[test]
    fn test_downsample_zero_target_is_error() {
        let raster = Raster::from_luma(2, 2, &[0; 4]).unwrap();
        assert!(downsample(&raster, 0, 10).is_err());
        assert!(downsample(&raster, 10, 0).is_err());
    }

    #[test]
    fn test_downsample_empty_source_is_error() {
        let raster = Raster::from_rgb(0, 0, vec![]).unwrap();
        assert!(matches!(
            downsample(&raster, 4, 4),
            Err(ConversionError::InvalidDimensions {
                width: 0,
                height: 0
            })
        ));
    }
}
