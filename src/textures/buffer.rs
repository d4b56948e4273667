//! In-memory float image with normalized-coordinate sampling
//!
//! Whatever the storage type of the file it came from, pixels are held as
//! interleaved `f32` samples. Integer sources are normalized to [0, 1].

use std::path::Path;

use image::{ColorType, DynamicImage, ImageReader};
use tracing::debug;

use super::spec::{ImageSpec, PixelType};
use crate::error::{MakeTxError, Result};

#[derive(Debug, Clone)]
pub struct ImageBuf {
    spec: ImageSpec,
    pixels: Vec<f32>,
}

impl ImageBuf {
    /// Allocate a zero-filled image. The working format is always float.
    pub fn new(spec: ImageSpec) -> Self {
        let spec = spec.with_format(PixelType::Float);
        let pixels = vec![0.0; spec.sample_count()];
        Self { spec, pixels }
    }

    /// Wrap existing samples; returns `None` if the length does not match the spec
    pub fn from_pixels(spec: ImageSpec, pixels: Vec<f32>) -> Option<Self> {
        if pixels.len() != spec.sample_count() {
            return None;
        }
        Some(Self {
            spec: spec.with_format(PixelType::Float),
            pixels,
        })
    }

    /// Decode an image file. The format is sniffed from the content first,
    /// then from the extension.
    pub fn read(path: &Path) -> Result<Self> {
        let decode_err = |source: image::ImageError| MakeTxError::Decode {
            path: path.to_path_buf(),
            source,
        };

        let img = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| decode_err(image::ImageError::IoError(e)))?
            .decode()
            .map_err(decode_err)?;

        let buf = Self::from_dynamic(&img);
        debug!(
            "Decoded {}: {}x{}, {} channels, {}",
            path.display(),
            buf.spec.width,
            buf.spec.height,
            buf.spec.nchannels,
            buf.spec.format
        );
        Ok(buf)
    }

    /// Convert a decoded image, remembering its original sample type in the spec
    pub fn from_dynamic(img: &DynamicImage) -> Self {
        let color = img.color();
        let nchannels = color.channel_count() as usize;
        let format = source_pixel_type(color);
        let (width, height) = (img.width(), img.height());

        let pixels = match nchannels {
            1 => img.to_luma32f().into_raw(),
            2 => img.to_luma_alpha32f().into_raw(),
            3 => img.to_rgb32f().into_raw(),
            _ => img.to_rgba32f().into_raw(),
        };
        let nchannels = nchannels.clamp(1, 4);

        Self {
            spec: ImageSpec::new(width, height, nchannels, format),
            pixels,
        }
    }

    pub fn spec(&self) -> &ImageSpec {
        &self.spec
    }

    pub fn width(&self) -> u32 {
        self.spec.width
    }

    pub fn height(&self) -> u32 {
        self.spec.height
    }

    pub fn nchannels(&self) -> usize {
        self.spec.nchannels
    }

    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.spec.width as usize + x as usize) * self.spec.nchannels
    }

    pub fn setpixel(&mut self, x: u32, y: u32, value: &[f32]) {
        let n = self.spec.nchannels;
        let o = self.offset(x, y);
        self.pixels[o..o + n].copy_from_slice(&value[..n]);
    }

    /// Bilinear sample at continuous pixel coordinates.
    ///
    /// Pixel centers sit at half-integers; lookups past the edge are clamped.
    pub fn interppixel(&self, x: f32, y: f32, out: &mut [f32]) {
        let n = self.spec.nchannels;
        if self.spec.width == 0 || self.spec.height == 0 {
            out[..n].fill(0.0);
            return;
        }

        let x = x - 0.5;
        let y = y - 0.5;
        let xf = x.floor();
        let yf = y.floor();
        let fx = x - xf;
        let fy = y - yf;

        let max_x = self.spec.width as i64 - 1;
        let max_y = self.spec.height as i64 - 1;
        let x0 = (xf as i64).clamp(0, max_x) as u32;
        let x1 = (xf as i64 + 1).clamp(0, max_x) as u32;
        let y0 = (yf as i64).clamp(0, max_y) as u32;
        let y1 = (yf as i64 + 1).clamp(0, max_y) as u32;

        let p00 = self.offset(x0, y0);
        let p10 = self.offset(x1, y0);
        let p01 = self.offset(x0, y1);
        let p11 = self.offset(x1, y1);

        for c in 0..n {
            let top = lerp(self.pixels[p00 + c], self.pixels[p10 + c], fx);
            let bottom = lerp(self.pixels[p01 + c], self.pixels[p11 + c], fx);
            out[c] = lerp(top, bottom, fy);
        }
    }

    /// Bilinear sample at normalized coordinates, (0,0) top-left and (1,1)
    /// bottom-right of the data window.
    pub fn interppixel_ndc(&self, s: f32, t: f32, out: &mut [f32]) {
        self.interppixel(
            s * self.spec.width as f32,
            t * self.spec.height as f32,
            out,
        );
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn source_pixel_type(color: ColorType) -> PixelType {
    match color {
        ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8 => PixelType::UInt8,
        ColorType::L16 | ColorType::La16 | ColorType::Rgb16 | ColorType::Rgba16 => {
            PixelType::UInt16
        }
        _ => PixelType::Float,
    }
}
