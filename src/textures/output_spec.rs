//! Destination spec derivation
//!
//! Turns the spec of the decoded source into the spec of the base level of
//! the texture: uncropped, tiled, float for the resampling math, with the
//! renderer metadata attached and the resolution rounded to powers of two.

use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use tracing::{info, warn};

use super::mode::ConversionMode;
use super::resize::resized_dimensions;
use super::spec::{ImageSpec, PixelType};
use crate::config::MakeTxConfig;
use crate::error::{MakeTxError, Result};

/// Everything needed to produce and write the base level
#[derive(Debug, Clone)]
pub struct OutputPlan {
    /// Working spec of the base level (always float)
    pub spec: ImageSpec,
    /// Sample type the file is written with
    pub storage: PixelType,
    /// Whether lower resolution levels follow the base level
    pub mipmap: bool,
}

/// `DateTime` attribute format, local time with a space-padded hour
pub fn datestring(time: SystemTime) -> String {
    let local: DateTime<Local> = time.into();
    local.format("%Y:%m:%d %k:%M:%S").to_string()
}

/// Pick the storage type of the written file.
///
/// Unrecognized `-d` names keep the source's type. Shadow maps are always
/// floating point.
pub fn resolve_storage_type(
    source: PixelType,
    data_format: Option<&str>,
    mode: ConversionMode,
) -> PixelType {
    let mut storage = source;
    if let Some(name) = data_format {
        match PixelType::from_name(name) {
            Some(t) => storage = t,
            None => warn!("Ignoring unknown data format \"{}\", keeping {}", name, source),
        }
    }

    if mode == ConversionMode::Shadow && !storage.is_floating_point() {
        storage = PixelType::Float;
    }
    storage
}

/// Derive the base level spec from the source spec and the options.
///
/// `date` is stamped into the `DateTime` attribute.
pub fn build_output_spec(
    source: &ImageSpec,
    source_path: &Path,
    config: &MakeTxConfig,
    date: SystemTime,
) -> Result<OutputPlan> {
    let shadow = config.mode == ConversionMode::Shadow;
    let storage = resolve_storage_type(source.format, config.data_format.as_deref(), config.mode);

    if shadow && source.nchannels != 1 {
        return Err(MakeTxError::ShadowChannels {
            path: source_path.to_path_buf(),
            channels: source.nchannels,
        });
    }

    let mut spec = source.clone();

    // Never a crop window
    spec.x = 0;
    spec.y = 0;
    spec.z = 0;
    spec.full_width = 0;
    spec.full_height = 0;
    spec.full_depth = 0;

    // Always tiled, regardless of input
    spec.tile_width = config.tile[0];
    spec.tile_height = config.tile[1];
    spec.tile_depth = config.tile[2];

    spec.attribute("compression", "zip");
    spec.attribute("DateTime", datestring(date));
    spec.attribute("Software", config.command_line.as_str());
    spec.attribute("textureformat", config.mode.texture_format());

    if !config.camera.is_zero() {
        spec.attribute("worldtocamera", config.camera);
    }
    if !config.screen.is_zero() {
        spec.attribute("worldtoscreen", config.screen);
    }

    if shadow {
        spec.remove_attribute("wrapmodes");
    } else {
        spec.attribute("wrapmodes", config.wrap_modes());
    }
    spec.attribute("fovcot", source.width as f32 / source.height as f32);

    if config.separate {
        spec.attribute("planarconfig", "separate");
    }

    // Resampling math is always float; the storage type is applied on write
    spec.set_format(PixelType::Float);

    if let Some((width, height)) =
        resized_dimensions(spec.width, spec.height, config.mode, config.no_resize)
    {
        spec.width = width;
        spec.height = height;
        spec.full_width = width;
        spec.full_height = height;
        info!("  Resizing image to {} x {}", width, height);
    }

    Ok(OutputPlan {
        spec,
        storage,
        mipmap: config.mipmap(),
    })
}
