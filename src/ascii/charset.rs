//! Character ramp and luminance quantization.

/// Density ramp (11 levels).
/// Characters ordered from darkest (@) to lightest (.).
pub const ASCII_RAMP: [char; 11] = ['@', '#', 'S', '%', '?', '*', '+', ';', ':', ',', '.'];

/// Width of one brightness bucket on the ramp.
pub const BUCKET_WIDTH: u8 = 25;

/// Map a single brightness sample to its ramp character.
///
/// Buckets are `BUCKET_WIDTH` wide, so 0-24 map to `@`, 25-49 to `#`, and so
/// on. The last bucket is wider than the rest: everything from 250 up to 255
/// lands on `.`.
#[inline]
pub fn quantize(value: u8) -> char {
    let idx = (value / BUCKET_WIDTH) as usize;
    ASCII_RAMP[idx.min(ASCII_RAMP.len() - 1)]
}
