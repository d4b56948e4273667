//! Conversion configuration
//!
//! Built once from the command line and passed by reference into the
//! pipeline. Nothing in the library reads process-wide option state.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{MakeTxError, Result};
use crate::textures::{ConversionMode, Matrix44};

/// Texture lookup behavior outside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    Black,
    Clamp,
    Periodic,
    Mirror,
}

impl WrapMode {
    pub fn name(self) -> &'static str {
        match self {
            WrapMode::Black => "black",
            WrapMode::Clamp => "clamp",
            WrapMode::Periodic => "periodic",
            WrapMode::Mirror => "mirror",
        }
    }
}

impl fmt::Display for WrapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WrapMode {
    type Err = MakeTxError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "black" => Ok(WrapMode::Black),
            "clamp" => Ok(WrapMode::Clamp),
            "periodic" => Ok(WrapMode::Periodic),
            "mirror" => Ok(WrapMode::Mirror),
            _ => Err(MakeTxError::Usage(format!(
                "Unknown wrap mode \"{}\" (expected black, clamp, periodic or mirror)",
                s
            ))),
        }
    }
}

/// Configuration for one texture conversion
#[derive(Debug, Clone)]
pub struct MakeTxConfig {
    /// Input images; implemented modes take exactly one
    pub filenames: Vec<PathBuf>,

    /// Output path (defaults to the input with a `.tx` extension)
    pub output: Option<PathBuf>,

    /// Skip the conversion when the output is as new as the input
    pub update_mode: bool,

    /// Output file format name, overriding the output extension
    pub file_format: Option<String>,

    /// Output data format name (`-d`)
    pub data_format: Option<String>,

    /// Tile width, height and depth
    pub tile: [u32; 3],

    /// Store channels in separate planes
    pub separate: bool,

    pub in_gamma: f32,
    pub out_gamma: f32,

    /// Z fudge factor for volume shadows
    pub opaque_width: f32,

    /// Field of view for cube maps
    pub fov: f32,

    pub wrap: WrapMode,
    pub swrap: Option<WrapMode>,
    pub twrap: Option<WrapMode>,

    /// Keep the source resolution instead of rounding up to powers of two
    pub no_resize: bool,

    /// Write only the base level
    pub no_mipmap: bool,

    /// World-to-camera matrix; zero means "not given"
    pub camera: Matrix44,

    /// World-to-screen matrix; zero means "not given"
    pub screen: Matrix44,

    pub mode: ConversionMode,

    /// Full invocation, recorded in the `Software` attribute
    pub command_line: String,
}

impl Default for MakeTxConfig {
    fn default() -> Self {
        Self {
            filenames: Vec::new(),
            output: None,
            update_mode: false,
            file_format: None,
            data_format: None,
            tile: [64, 64, 1],
            separate: false,
            in_gamma: 1.0,
            out_gamma: 1.0,
            opaque_width: 0.0,
            fov: 90.0,
            wrap: WrapMode::Black,
            swrap: None,
            twrap: None,
            no_resize: false,
            no_mipmap: false,
            camera: Matrix44::ZERO,
            screen: Matrix44::ZERO,
            mode: ConversionMode::PlainTexture,
            command_line: String::new(),
        }
    }
}

impl MakeTxConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.filenames.is_empty() {
            return Err(MakeTxError::Usage(
                "Must have at least one input filename specified.".to_string(),
            ));
        }
        if self.tile.iter().any(|&t| t == 0) {
            return Err(MakeTxError::Usage(format!(
                "Tile size must be non-zero, got {}x{}x{}",
                self.tile[0], self.tile[1], self.tile[2]
            )));
        }
        Ok(())
    }

    /// Where the texture will be written
    pub fn output_path(&self) -> Option<PathBuf> {
        match &self.output {
            Some(path) => Some(path.clone()),
            None => self.filenames.first().map(|f| f.with_extension("tx")),
        }
    }

    /// Format name used to pick the image output: `--format` or the output path
    pub fn output_format(&self) -> Option<String> {
        self.file_format.clone().or_else(|| {
            self.output_path()
                .map(|p| p.to_string_lossy().into_owned())
        })
    }

    /// Value of the `wrapmodes` attribute: "s,t"
    pub fn wrap_modes(&self) -> String {
        format!(
            "{},{}",
            self.swrap.unwrap_or(self.wrap),
            self.twrap.unwrap_or(self.wrap)
        )
    }

    /// Whether multiple resolution levels are written
    pub fn mipmap(&self) -> bool {
        self.mode != ConversionMode::Shadow && !self.no_mipmap
    }
}
