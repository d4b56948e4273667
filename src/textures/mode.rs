//! Conversion modes and their capability table

use crate::error::{MakeTxError, Result};

/// What kind of texture to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionMode {
    /// Ordinary mipmapped texture
    #[default]
    PlainTexture,
    /// Single channel, floating point depth map
    Shadow,
    ShadowCube,
    VolumeShadow,
    LatLongEnv,
    CubeEnv,
    LightProbe,
    VertCross,
    LatLong2Cube,
}

impl ConversionMode {
    pub const ALL: [ConversionMode; 9] = [
        ConversionMode::PlainTexture,
        ConversionMode::Shadow,
        ConversionMode::ShadowCube,
        ConversionMode::VolumeShadow,
        ConversionMode::LatLongEnv,
        ConversionMode::CubeEnv,
        ConversionMode::LightProbe,
        ConversionMode::VertCross,
        ConversionMode::LatLong2Cube,
    ];

    /// Whether the pipeline can actually produce this kind of map
    pub fn is_implemented(self) -> bool {
        matches!(self, ConversionMode::PlainTexture | ConversionMode::Shadow)
    }

    /// Command-line flag selecting this mode (none for the default)
    pub fn flag(self) -> Option<&'static str> {
        match self {
            ConversionMode::PlainTexture => None,
            ConversionMode::Shadow => Some("--shadow"),
            ConversionMode::ShadowCube => Some("--shadcube"),
            ConversionMode::VolumeShadow => Some("--volshad"),
            ConversionMode::LatLongEnv => Some("--envlatl"),
            ConversionMode::CubeEnv => Some("--envcube"),
            ConversionMode::LightProbe => Some("--lightprobe"),
            ConversionMode::VertCross => Some("--vertcross"),
            ConversionMode::LatLong2Cube => Some("--latl2envcube"),
        }
    }

    /// Name used in diagnostics about the produced map
    pub fn map_type_name(self) -> &'static str {
        match self {
            ConversionMode::Shadow => "shadow map",
            _ => "texture map",
        }
    }

    /// Value of the `textureformat` attribute
    pub fn texture_format(self) -> &'static str {
        match self {
            ConversionMode::Shadow => "Shadow",
            _ => "Plain Texture",
        }
    }

    pub fn unsupported_message(self) -> &'static str {
        match self {
            ConversionMode::PlainTexture | ConversionMode::Shadow => "",
            ConversionMode::ShadowCube => "Shadow cubes currently unsupported",
            ConversionMode::VolumeShadow => "Volume shadows currently unsupported",
            ConversionMode::LatLongEnv => "Latlong environment maps currently unsupported",
            ConversionMode::CubeEnv => "Environment cubes currently unsupported",
            ConversionMode::LightProbe => "Light probes currently unsupported",
            ConversionMode::VertCross => "Vertcross currently unsupported",
            ConversionMode::LatLong2Cube => "Latlong->cube conversion currently unsupported",
        }
    }
}

/// Raw mode switches as given on the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct ModeFlags {
    pub shadow: bool,
    pub shadow_cube: bool,
    pub volume_shadow: bool,
    pub latlong_env: bool,
    pub cube_env: bool,
    pub light_probe: bool,
    pub vert_cross: bool,
    pub latlong_to_cube: bool,
}

impl ModeFlags {
    /// Collapse the switches into a single mode. At most one may be set.
    pub fn resolve(&self) -> Result<ConversionMode> {
        let selected: Vec<ConversionMode> = [
            (self.shadow, ConversionMode::Shadow),
            (self.shadow_cube, ConversionMode::ShadowCube),
            (self.volume_shadow, ConversionMode::VolumeShadow),
            (self.latlong_env, ConversionMode::LatLongEnv),
            (self.cube_env, ConversionMode::CubeEnv),
            (self.light_probe, ConversionMode::LightProbe),
            (self.vert_cross, ConversionMode::VertCross),
            (self.latlong_to_cube, ConversionMode::LatLong2Cube),
        ]
        .into_iter()
        .filter_map(|(set, mode)| set.then_some(mode))
        .collect();

        match selected.as_slice() {
            [] => Ok(ConversionMode::PlainTexture),
            [mode] => Ok(*mode),
            _ => {
                let flags: Vec<&str> = ConversionMode::ALL
                    .iter()
                    .filter_map(|mode| mode.flag())
                    .collect();
                Err(MakeTxError::Usage(format!(
                    "At most one of the following options may be set: {}",
                    flags.join(" ")
                )))
            }
        }
    }
}
