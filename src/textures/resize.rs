//! Power-of-two resize policy and base level resampling

use super::buffer::ImageBuf;
use super::mode::ConversionMode;
use super::spec::ImageSpec;

/// Smallest power of two >= `n` (1 for 0 and 1)
pub fn pow2_roundup(n: u32) -> u32 {
    n.max(1).next_power_of_two()
}

/// Power-of-two dimensions for the base level, or `None` when the source
/// resolution is kept (`--noresize` and shadow maps)
pub fn resized_dimensions(
    width: u32,
    height: u32,
    mode: ConversionMode,
    no_resize: bool,
) -> Option<(u32, u32)> {
    if no_resize || mode == ConversionMode::Shadow {
        None
    } else {
        Some((pow2_roundup(width), pow2_roundup(height)))
    }
}

/// Fill an image of `spec`'s resolution by point-sampling `src` at the
/// normalized center of every destination pixel.
pub fn resample(src: &ImageBuf, spec: ImageSpec) -> ImageBuf {
    let mut dst = ImageBuf::new(spec);
    let (width, height) = (dst.width(), dst.height());
    let mut pel = vec![0.0f32; dst.nchannels()];

    for y in 0..height {
        for x in 0..width {
            src.interppixel_ndc(
                (x as f32 + 0.5) / width as f32,
                (y as f32 + 0.5) / height as f32,
                &mut pel,
            );
            dst.setpixel(x, y, &pel);
        }
    }
    dst
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::textures::spec::PixelType;

    #[test]
    fn test_pow2_roundup() {
        assert_eq!(pow2_roundup(1), 1);
        assert_eq!(pow2_roundup(2), 2);
        assert_eq!(pow2_roundup(3), 4);
        assert_eq!(pow2_roundup(256), 256);
        assert_eq!(pow2_roundup(257), 512);
        assert_eq!(pow2_roundup(300), 512);
        for n in 1..2000u32 {
            let p = pow2_roundup(n);
            assert!(p.is_power_of_two());
            assert!(p >= n && p / 2 < n);
        }
    }

    #[test]
    fn test_resize_policy() {
        use ConversionMode::*;
        assert_eq!(resized_dimensions(300, 256, PlainTexture, false), Some((512, 256)));
        assert_eq!(resized_dimensions(300, 100, PlainTexture, true), None);
        assert_eq!(resized_dimensions(300, 100, Shadow, false), None);
        assert_eq!(resized_dimensions(1, 1, PlainTexture, false), Some((1, 1)));
    }

    #[test]
    fn test_resample_constant() {
        let spec = ImageSpec::new(3, 5, 2, PixelType::UInt8);
        let pixels = [0.25f32, 0.75].repeat(15);
        let src = ImageBuf::from_pixels(spec.clone(), pixels).unwrap();

        let mut dst_spec = spec;
        dst_spec.width = 4;
        dst_spec.height = 8;
        let dst = resample(&src, dst_spec);
        assert_eq!((dst.width(), dst.height()), (4, 8));
        for px in dst.pixels().chunks_exact(2) {
            assert!((px[0] - 0.25).abs() < 1e-6);
            assert!((px[1] - 0.75).abs() < 1e-6);
        }
    }

    #[test]
    fn test_resample_same_size_is_identity() {
        let spec = ImageSpec::new(4, 2, 1, PixelType::Float);
        let pixels: Vec<f32> = (0..8).map(|v| v as f32).collect();
        let src = ImageBuf::from_pixels(spec.clone(), pixels.clone()).unwrap();
        let dst = resample(&src, spec);
        for (a, b) in dst.pixels().iter().zip(&pixels) {
            assert!((a - b).abs() < 1e-4);
        }
    }
}
