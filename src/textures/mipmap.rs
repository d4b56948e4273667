//! Mipmap chain generation
//!
//! Each level halves the previous one (integer halving, never below 1) and
//! is resampled from it in float. The chain ends with a 1x1 level.

use super::buffer::ImageBuf;

/// Dimensions of the level following a `width` x `height` level
pub fn half_dimensions(width: u32, height: u32) -> (u32, u32) {
    ((width / 2).max(1), (height / 2).max(1))
}

/// Produce the next smaller level, or `None` once `prev` is 1x1.
///
/// New pixels are sampled at `((x + 0.5) / prev_width, (y + 0.5) / prev_height)`
/// in normalized coordinates of `prev`, for `x`, `y` over the new level.
pub fn next_level(prev: &ImageBuf) -> Option<ImageBuf> {
    let (prev_width, prev_height) = (prev.width(), prev.height());
    if prev_width <= 1 && prev_height <= 1 {
        return None;
    }

    let (width, height) = half_dimensions(prev_width, prev_height);
    let mut spec = prev.spec().clone();
    spec.width = width;
    spec.height = height;
    spec.full_width = width;
    spec.full_height = height;
    spec.full_depth = spec.depth;

    let mut level = ImageBuf::new(spec);
    let mut pel = vec![0.0f32; prev.nchannels()];
    for y in 0..height {
        for x in 0..width {
            prev.interppixel_ndc(
                (x as f32 + 0.5) / prev_width as f32,
                (y as f32 + 0.5) / prev_height as f32,
                &mut pel,
            );
            level.setpixel(x, y, &pel);
        }
    }
    Some(level)
}

/// All level dimensions for a base of `width` x `height`, base first
pub fn mip_dimensions(width: u32, height: u32) -> Vec<(u32, u32)> {
    let mut dims = vec![(width, height)];
    let (mut w, mut h) = (width, height);
    while w > 1 || h > 1 {
        (w, h) = half_dimensions(w, h);
        dims.push((w, h));
    }
    dims
}

/// Number of levels in a full chain: floor(log2(max(w, h))) + 1
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}
