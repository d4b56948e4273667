//! Tiled, mip-mapped OpenEXR output
//!
//! OpenEXR stores all resolution levels of a layer in one header, so the
//! levels appended through [`ImageOutput::open`] are converted to their
//! storage type as they arrive and encoded together on [`ImageOutput::close`].

use std::path::{Path, PathBuf};

use exr::math::RoundingMode;
use exr::prelude::*;
use tracing::debug;

use super::{Feature, ImageOutput, OpenMode, OutputError, OutputResult};
use crate::textures::mipmap::half_dimensions;
use crate::textures::{AttrValue, ImageSpec, PixelType};

#[derive(Default)]
pub struct ExrOutput {
    file: Option<OpenFile>,
}

struct OpenFile {
    path: PathBuf,
    /// Spec of the first subimage; all levels share its channels and format
    base: ImageSpec,
    /// Spec of the most recently opened subimage
    current: ImageSpec,
    /// Whether `current` still waits for its pixels
    pending: bool,
    /// Converted samples, indexed by level then channel
    levels: Vec<Vec<FlatSamples>>,
}

impl ExrOutput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ImageOutput for ExrOutput {
    fn format_name(&self) -> &'static str {
        "openexr"
    }

    fn supports(&self, feature: Feature) -> bool {
        match feature {
            Feature::Tiles | Feature::MultiImage => true,
        }
    }

    fn open(&mut self, path: &Path, spec: &ImageSpec, mode: OpenMode) -> OutputResult<()> {
        match mode {
            OpenMode::Create => {
                if spec.nchannels == 0 {
                    return Err(OutputError::ChannelCount(self.format_name(), 0));
                }
                debug!(
                    "Opening {} ({}x{}, {} channels, {})",
                    path.display(),
                    spec.width,
                    spec.height,
                    spec.nchannels,
                    spec.format
                );
                self.file = Some(OpenFile {
                    path: path.to_path_buf(),
                    base: spec.clone(),
                    current: spec.clone(),
                    pending: true,
                    levels: Vec::new(),
                });
                Ok(())
            }
            OpenMode::AppendSubimage => {
                let file = self.file.as_mut().ok_or(OutputError::NotOpen)?;
                if file.path != path {
                    return Err(OutputError::PathMismatch {
                        open: file.path.display().to_string(),
                        appending: path.display().to_string(),
                    });
                }
                if !file.base.is_tiled() {
                    return Err(OutputError::AppendUnsupported("scanline openexr"));
                }

                let (width, height) = half_dimensions(file.current.width, file.current.height);
                if spec.width != width
                    || spec.height != height
                    || spec.nchannels != file.base.nchannels
                    || spec.format != file.base.format
                {
                    return Err(OutputError::LevelMismatch {
                        expected: describe(width, height, file.base.nchannels, file.base.format),
                        got: describe(spec.width, spec.height, spec.nchannels, spec.format),
                    });
                }

                file.current = spec.clone();
                file.pending = true;
                Ok(())
            }
        }
    }

    fn write_image(&mut self, pixels: &[f32]) -> OutputResult<()> {
        let file = self.file.as_mut().ok_or(OutputError::NotOpen)?;
        if !file.pending {
            return Err(OutputError::NotOpen);
        }

        let expected = file.current.width as usize
            * file.current.height as usize
            * file.current.nchannels;
        if pixels.len() != expected {
            return Err(OutputError::SampleCount {
                expected,
                got: pixels.len(),
            });
        }

        let nchannels = file.current.nchannels;
        let level = (0..nchannels)
            .map(|c| convert_channel(pixels, nchannels, c, file.base.format))
            .collect();
        file.levels.push(level);
        file.pending = false;
        Ok(())
    }

    fn close(&mut self) -> OutputResult<()> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };
        if file.levels.is_empty() {
            return Ok(());
        }

        let level_count = file.levels.len();
        let base = file.base;

        let mut per_channel: Vec<Vec<FlatSamples>> =
            (0..base.nchannels).map(|_| Vec::with_capacity(level_count)).collect();
        for level in file.levels {
            for (c, samples) in level.into_iter().enumerate() {
                per_channel[c].push(samples);
            }
        }

        let mut list = SmallVec::<[AnyChannel<Levels<FlatSamples>>; 4]>::new();
        for (name, mut samples) in base.channel_names.iter().zip(per_channel) {
            let sample_data = if samples.len() == 1 {
                Levels::Singular(samples.remove(0))
            } else {
                Levels::Mip {
                    rounding_mode: RoundingMode::Down,
                    level_data: samples,
                }
            };
            list.push(AnyChannel {
                name: text(name)?,
                sample_data,
                quantize_linearly: name == "A",
                sampling: Vec2(1, 1),
            });
        }

        let blocks = if base.is_tiled() {
            Blocks::Tiles(Vec2(base.tile_width as usize, base.tile_height as usize))
        } else {
            Blocks::ScanLines
        };
        let encoding = Encoding {
            compression: compression_for(base.get_string_attribute("compression")),
            blocks,
            line_order: LineOrder::Increasing,
        };

        let attributes = layer_attributes(&base)?;

        let layer = Layer::new(
            (base.width as usize, base.height as usize),
            attributes,
            encoding,
            AnyChannels::sort(list),
        );

        Image::from_layer(layer)
            .write()
            .non_parallel()
            .to_file(&file.path)?;

        debug!("Encoded {} levels into {}", level_count, file.path.display());
        Ok(())
    }
}

fn describe(width: u32, height: u32, nchannels: usize, format: PixelType) -> String {
    format!("{}x{} with {} channels of {}", width, height, nchannels, format)
}

/// OpenEXR only stores half, float and uint32 samples; integer formats
/// become half, double becomes float.
fn convert_channel(pixels: &[f32], nchannels: usize, channel: usize, storage: PixelType) -> FlatSamples {
    let samples = pixels.iter().skip(channel).step_by(nchannels).copied();
    match storage {
        PixelType::Float | PixelType::Double => FlatSamples::F32(samples.collect()),
        PixelType::Half
        | PixelType::UInt8
        | PixelType::Int8
        | PixelType::UInt16
        | PixelType::Int16 => FlatSamples::F16(samples.map(f16::from_f32).collect()),
    }
}

fn compression_for(name: Option<&str>) -> Compression {
    match name {
        Some("none") => Compression::Uncompressed,
        Some("rle") => Compression::RLE,
        Some("zips") => Compression::ZIP1,
        Some("piz") => Compression::PIZ,
        Some("pxr24") => Compression::PXR24,
        Some("b44") => Compression::B44,
        Some("b44a") => Compression::B44A,
        _ => Compression::ZIP16,
    }
}

/// EXR text is Latin-1; anything outside it is replaced
fn text(s: &str) -> OutputResult<Text> {
    let latin1: String = s
        .chars()
        .map(|c| if (c as u32) < 256 { c } else { '?' })
        .collect();
    Text::new_or_none(&latin1).ok_or_else(|| OutputError::InvalidName(s.to_string()))
}

/// Spec attributes as EXR header attributes.
///
/// Names the EXR standard reserves go to their typed fields; `exr` refuses
/// them as custom attributes.
fn layer_attributes(spec: &ImageSpec) -> OutputResult<LayerAttributes> {
    let mut attributes = LayerAttributes::default();
    for (name, value) in spec.attributes() {
        match (name, value) {
            ("compression", _) => {}
            ("wrapmodes", AttrValue::String(s)) => attributes.wrap_mode_name = Some(text(s)?),
            ("worldtocamera", AttrValue::Matrix(m)) => {
                attributes.world_to_camera = Some(m.to_flat())
            }
            _ => {
                attributes.other.insert(text(name)?, attribute_value(value)?);
            }
        }
    }
    Ok(attributes)
}

fn attribute_value(value: &AttrValue) -> OutputResult<AttributeValue> {
    Ok(match value {
        AttrValue::String(s) => AttributeValue::Text(text(s)?),
        AttrValue::Float(v) => AttributeValue::F32(*v),
        AttrValue::Matrix(m) => AttributeValue::Matrix4x4(m.to_flat()),
    })
}
