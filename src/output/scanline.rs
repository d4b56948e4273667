//! Single-image scanline output through the `image` crate

use std::path::{Path, PathBuf};

use image::{
    DynamicImage, GrayAlphaImage, GrayImage, ImageBuffer, ImageFormat, Luma, LumaA, Rgb,
    Rgb32FImage, RgbImage, Rgba, Rgba32FImage, RgbaImage,
};

use super::{Feature, ImageOutput, OpenMode, OutputError, OutputResult};
use crate::textures::{ImageSpec, PixelType};

pub struct ScanlineOutput {
    format: ImageFormat,
    open: Option<(PathBuf, ImageSpec)>,
}

impl ScanlineOutput {
    pub fn new(format: ImageFormat) -> Self {
        Self { format, open: None }
    }
}

impl ImageOutput for ScanlineOutput {
    fn format_name(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("image")
    }

    fn supports(&self, _feature: Feature) -> bool {
        false
    }

    fn open(&mut self, path: &Path, spec: &ImageSpec, mode: OpenMode) -> OutputResult<()> {
        if mode == OpenMode::AppendSubimage {
            return Err(OutputError::AppendUnsupported(self.format_name()));
        }
        if !(1..=4).contains(&spec.nchannels) {
            return Err(OutputError::ChannelCount(self.format_name(), spec.nchannels));
        }
        self.open = Some((path.to_path_buf(), spec.clone()));
        Ok(())
    }

    fn write_image(&mut self, pixels: &[f32]) -> OutputResult<()> {
        let (path, spec) = self.open.as_ref().ok_or(OutputError::NotOpen)?;
        let expected = spec.width as usize * spec.height as usize * spec.nchannels;
        if pixels.len() != expected {
            return Err(OutputError::SampleCount {
                expected,
                got: pixels.len(),
            });
        }

        let img = to_dynamic(spec, pixels).ok_or(OutputError::SampleCount {
            expected,
            got: pixels.len(),
        })?;
        img.save_with_format(path, self.format)?;
        Ok(())
    }

    fn close(&mut self) -> OutputResult<()> {
        self.open = None;
        Ok(())
    }
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn to_u16(v: f32) -> u16 {
    (v.clamp(0.0, 1.0) * 65535.0).round() as u16
}

/// Pick the closest pixel layout the `image` crate has for the storage type
fn to_dynamic(spec: &ImageSpec, pixels: &[f32]) -> Option<DynamicImage> {
    let (w, h) = (spec.width, spec.height);
    let float = spec.format.is_floating_point();
    let wide = matches!(spec.format, PixelType::UInt16 | PixelType::Int16) || float;

    Some(match (spec.nchannels, float, wide) {
        (3, true, _) => DynamicImage::ImageRgb32F(Rgb32FImage::from_raw(w, h, pixels.to_vec())?),
        (4, true, _) => {
            DynamicImage::ImageRgba32F(Rgba32FImage::from_raw(w, h, pixels.to_vec())?)
        }
        (1, _, true) => DynamicImage::ImageLuma16(ImageBuffer::<Luma<u16>, _>::from_raw(
            w,
            h,
            pixels.iter().map(|v| to_u16(*v)).collect(),
        )?),
        (2, _, true) => DynamicImage::ImageLumaA16(ImageBuffer::<LumaA<u16>, _>::from_raw(
            w,
            h,
            pixels.iter().map(|v| to_u16(*v)).collect(),
        )?),
        (3, _, true) => DynamicImage::ImageRgb16(ImageBuffer::<Rgb<u16>, _>::from_raw(
            w,
            h,
            pixels.iter().map(|v| to_u16(*v)).collect(),
        )?),
        (4, _, true) => DynamicImage::ImageRgba16(ImageBuffer::<Rgba<u16>, _>::from_raw(
            w,
            h,
            pixels.iter().map(|v| to_u16(*v)).collect(),
        )?),
        (1, _, _) => DynamicImage::ImageLuma8(GrayImage::from_raw(
            w,
            h,
            pixels.iter().map(|v| to_u8(*v)).collect(),
        )?),
        (2, _, _) => DynamicImage::ImageLumaA8(GrayAlphaImage::from_raw(
            w,
            h,
            pixels.iter().map(|v| to_u8(*v)).collect(),
        )?),
        (3, _, _) => DynamicImage::ImageRgb8(RgbImage::from_raw(
            w,
            h,
            pixels.iter().map(|v| to_u8(*v)).collect(),
        )?),
        (4, _, _) => DynamicImage::ImageRgba8(RgbaImage::from_raw(
            w,
            h,
            pixels.iter().map(|v| to_u8(*v)).collect(),
        )?),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let spec = ImageSpec::new(2, 1, 3, PixelType::UInt8);

        let mut out = ScanlineOutput::new(ImageFormat::Png);
        out.open(&path, &spec, OpenMode::Create).unwrap();
        out.write_image(&[1.0, 0.0, 0.0, 0.0, 0.0, 1.0]).unwrap();
        out.close().unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(img.get_pixel(1, 0), &Rgb([0, 0, 255]));
    }

    #[test]
    fn test_sixteen_bit_gray() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let spec = ImageSpec::new(1, 1, 1, PixelType::UInt16);

        let mut out = ScanlineOutput::new(ImageFormat::Png);
        out.open(&path, &spec, OpenMode::Create).unwrap();
        out.write_image(&[0.5]).unwrap();

        let img = image::open(&path).unwrap();
        assert_eq!(img.color(), image::ColorType::L16);
    }

    #[test]
    fn test_no_append() {
        let spec = ImageSpec::new(1, 1, 1, PixelType::UInt8);
        let mut out = ScanlineOutput::new(ImageFormat::Png);
        let err = out
            .open(Path::new("x.png"), &spec, OpenMode::AppendSubimage)
            .unwrap_err();
        assert!(matches!(err, OutputError::AppendUnsupported("png")));
    }

    #[test]
    fn test_write_before_open() {
        let mut out = ScanlineOutput::new(ImageFormat::Png);
        assert!(matches!(out.write_image(&[0.0]), Err(OutputError::NotOpen)));
    }
}
