//! Laying quantized samples out as text.

use super::charset::quantize;
use super::downsample::LuminanceGrid;

/// Render a luminance grid as newline-separated rows of ramp characters.
///
/// A line break goes in front of every sample that starts a new row, so the
/// output has no leading or trailing newline: `width * height` characters
/// plus `height - 1` line breaks.
pub fn assemble(grid: &LuminanceGrid) -> String {
    let width = grid.width() as usize;
    let samples = grid.samples();
    let mut out = String::with_capacity(samples.len() + grid.height() as usize);

    for (i, &value) in samples.iter().enumerate() {
        if i % width == 0 && i != 0 {
            out.push('\n');
        }
        out.push(quantize(value));
    }

    out
}
