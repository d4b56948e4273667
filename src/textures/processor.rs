//! Texture conversion pipeline
//!
//! Freshness check, decode, output spec, base level resampling, then the
//! mip chain is written level by level. In update mode the output is stamped
//! with the input's modification time afterwards.

use std::path::PathBuf;
use std::time::SystemTime;

use tracing::{debug, info};

use super::buffer::ImageBuf;
use super::freshness::{check_freshness, modified_time, stamp_modified, Freshness};
use super::output_spec::build_output_spec;
use super::resize::resample;
use super::writer::write_mipmap;
use crate::config::MakeTxConfig;
use crate::error::{MakeTxError, Result};
use crate::output::create_output;

/// What a conversion run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The texture was written with this many resolution levels
    Written { path: PathBuf, levels: u32 },
    /// Update mode found the output current
    UpToDate(PathBuf),
}

/// Run the conversion selected by `config.mode`.
///
/// Unimplemented modes fail with [`MakeTxError::Unsupported`], which callers
/// treat as non-fatal.
pub fn process_texture(config: &MakeTxConfig) -> Result<Outcome> {
    config.validate()?;
    if !config.mode.is_implemented() {
        return Err(MakeTxError::Unsupported(config.mode));
    }
    make_texturemap(config)
}

fn make_texturemap(config: &MakeTxConfig) -> Result<Outcome> {
    let map_type = config.mode.map_type_name();
    let input = match config.filenames.as_slice() {
        [input] => input,
        _ => {
            return Err(MakeTxError::Usage(format!(
                "{} requires exactly one input filename",
                map_type
            )))
        }
    };
    let output = config
        .output_path()
        .ok_or_else(|| MakeTxError::Usage("No output filename".to_string()))?;

    if check_freshness(input, &output, config.update_mode)? == Freshness::Skip {
        println!("texbake: no update required for \"{}\"", output.display());
        return Ok(Outcome::UpToDate(output));
    }
    let in_time = modified_time(input)?;

    info!("Reading file: {}", input.display());
    let src = ImageBuf::read(input)?;

    debug!(
        "gamma in {} out {}, opaque width {}, fov {}",
        config.in_gamma, config.out_gamma, config.opaque_width, config.fov
    );

    // Update mode dates the texture like its source
    let date = if config.update_mode {
        in_time
    } else {
        SystemTime::now()
    };
    let plan = build_output_spec(src.spec(), input, config, date)?;

    let format = config
        .output_format()
        .ok_or_else(|| MakeTxError::Usage("No output format".to_string()))?;
    let mut out = create_output(&format).ok_or(MakeTxError::NoWriter(format))?;

    let base = resample(&src, plan.spec);
    drop(src);

    let levels = write_mipmap(base, out.as_mut(), &output, plan.storage, plan.mipmap)?;

    if config.update_mode {
        stamp_modified(&output, in_time)?;
    }

    Ok(Outcome::Written {
        path: output,
        levels,
    })
}
