//! texbake - bake images into renderer-ready textures

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use texbake::textures::{process_texture, Matrix44, ModeFlags, Outcome};
use texbake::{ErrorKind, MakeTxConfig, MakeTxError, WrapMode};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "texbake")]
#[command(version)]
#[command(about = "Convert an image into a tiled, mip-mapped texture")]
struct Cli {
    /// Input image(s)
    #[arg(value_name = "FILE")]
    filenames: Vec<PathBuf>,

    /// Verbose status messages
    #[arg(short, long)]
    verbose: bool,

    /// Output filename
    #[arg(short = 'o', value_name = "PATH")]
    output: Option<PathBuf>,

    /// Update mode
    #[arg(short = 'u')]
    update: bool,

    /// Specify output format (default: guess from extension)
    #[arg(long = "format", value_name = "NAME")]
    format: Option<String>,

    /// Set the output data format to one of: uint8, sint8, uint16, sint16, half, float, double
    #[arg(short = 'd', value_name = "TYPE")]
    data_format: Option<String>,

    /// Specify tile size
    #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"])]
    tile: Option<Vec<u32>>,

    /// Use planarconfig separate (default: contiguous)
    #[arg(long)]
    separate: bool,

    /// Specify gamma of input files
    #[arg(long, default_value_t = 1.0)]
    ingamma: f32,

    /// Specify gamma of output files
    #[arg(long, default_value_t = 1.0)]
    outgamma: f32,

    /// Set z fudge factor for volume shadows
    #[arg(long, default_value_t = 0.0)]
    opaquewidth: f32,

    /// Field of view for envcube/shadcube
    #[arg(long, default_value_t = 90.0)]
    fov: f32,

    /// Specify wrap mode (black, clamp, periodic, mirror)
    #[arg(long, default_value = "black")]
    wrap: String,

    /// Specify s wrap mode separately
    #[arg(long)]
    swrap: Option<String>,

    /// Specify t wrap mode separately
    #[arg(long)]
    twrap: Option<String>,

    /// Do not resize textures to power of 2 resolution
    #[arg(long)]
    noresize: bool,

    /// Do not make multiple MIP-map levels
    #[arg(long)]
    nomipmap: bool,

    /// Set the world-to-camera matrix
    #[arg(long = "Mcamera", num_args = 16, value_name = "F", allow_negative_numbers = true)]
    mcamera: Option<Vec<f32>>,

    /// Set the world-to-screen matrix
    #[arg(long = "Mscreen", num_args = 16, value_name = "F", allow_negative_numbers = true)]
    mscreen: Option<Vec<f32>>,

    /// Create shadow map
    #[arg(long, help_heading = "Modes (default is plain texture)")]
    shadow: bool,

    /// Create shadow cube (file order: px,nx,py,ny,pz,nz) (UNIMPLEMENTED)
    #[arg(long, help_heading = "Modes (default is plain texture)")]
    shadcube: bool,

    /// Create volume shadow map (UNIMPLEMENTED)
    #[arg(long, help_heading = "Modes (default is plain texture)")]
    volshad: bool,

    /// Create lat/long environment map (UNIMPLEMENTED)
    #[arg(long, help_heading = "Modes (default is plain texture)")]
    envlatl: bool,

    /// Create cubic env map (file order: px,nx,py,ny,pz,nz) (UNIMPLEMENTED)
    #[arg(long, help_heading = "Modes (default is plain texture)")]
    envcube: bool,

    /// Convert a lightprobe to cubic env map (UNIMPLEMENTED)
    #[arg(long, help_heading = "Modes (default is plain texture)")]
    lightprobe: bool,

    /// Convert a lat-long env map to a cubic env map (UNIMPLEMENTED)
    #[arg(long, help_heading = "Modes (default is plain texture)")]
    latl2envcube: bool,

    /// Convert a vertical cross layout to a cubic env map (UNIMPLEMENTED)
    #[arg(long, help_heading = "Modes (default is plain texture)")]
    vertcross: bool,
}

fn parse_wrap(name: Option<&str>) -> Result<Option<WrapMode>, MakeTxError> {
    name.map(str::parse).transpose()
}

fn parse_matrix(values: Option<&[f32]>) -> Matrix44 {
    values
        .and_then(Matrix44::from_slice)
        .unwrap_or(Matrix44::ZERO)
}

impl Cli {
    /// Build the immutable conversion config
    fn into_config(self, command_line: String) -> Result<MakeTxConfig, MakeTxError> {
        let mode = ModeFlags {
            shadow: self.shadow,
            shadow_cube: self.shadcube,
            volume_shadow: self.volshad,
            latlong_env: self.envlatl,
            cube_env: self.envcube,
            light_probe: self.lightprobe,
            vert_cross: self.vertcross,
            latlong_to_cube: self.latl2envcube,
        }
        .resolve()?;

        let tile = match self.tile.as_deref() {
            Some([w, h]) => [*w, *h, 1],
            _ => [64, 64, 1],
        };

        let config = MakeTxConfig {
            filenames: self.filenames,
            output: self.output,
            update_mode: self.update,
            file_format: self.format,
            data_format: self.data_format,
            tile,
            separate: self.separate,
            in_gamma: self.ingamma,
            out_gamma: self.outgamma,
            opaque_width: self.opaquewidth,
            fov: self.fov,
            wrap: self.wrap.parse()?,
            swrap: parse_wrap(self.swrap.as_deref())?,
            twrap: parse_wrap(self.twrap.as_deref())?,
            no_resize: self.noresize,
            no_mipmap: self.nomipmap,
            camera: parse_matrix(self.mcamera.as_deref()),
            screen: parse_matrix(self.mscreen.as_deref()),
            mode,
            command_line,
        };
        config.validate()?;
        Ok(config)
    }
}

/// The invocation as recorded in the `Software` attribute
fn command_line(args: impl IntoIterator<Item = OsString>) -> String {
    args.into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

fn init_logging(verbose: bool) -> Result<()> {
    let directive = if verbose { "texbake=info" } else { "texbake=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
    Ok(())
}

fn main() -> ExitCode {
    let command_line = command_line(std::env::args_os());
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("texbake: could not initialize logging: {e:#}");
    }

    let result = cli
        .into_config(command_line)
        .and_then(|config| process_texture(&config));

    match result {
        Ok(Outcome::Written { .. }) | Ok(Outcome::UpToDate(_)) => ExitCode::SUCCESS,
        Err(e) if !e.is_fatal() => {
            eprintln!("{e}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("texbake ERROR: {e}");
            if e.kind() == ErrorKind::Usage {
                eprintln!("{}", Cli::command().render_usage());
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use texbake::textures::ConversionMode;

    fn parse(args: &[&str]) -> Result<MakeTxConfig, MakeTxError> {
        let cli = Cli::try_parse_from(std::iter::once("texbake").chain(args.iter().copied()))
            .expect("arguments should parse");
        cli.into_config(args.join(" "))
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["in.png"]).unwrap();
        assert_eq!(config.filenames, [PathBuf::from("in.png")]);
        assert_eq!(config.tile, [64, 64, 1]);
        assert_eq!(config.mode, ConversionMode::PlainTexture);
        assert_eq!(config.wrap_modes(), "black,black");
        assert!(config.camera.is_zero());
        assert_eq!(config.fov, 90.0);
        assert_eq!(config.output_path(), Some(PathBuf::from("in.tx")));
    }

    #[test]
    fn test_full_option_set() {
        let mut args = vec![
            "-v", "-u", "-o", "out.exr", "-d", "half", "--tile", "32", "16", "--wrap", "clamp",
            "--twrap", "mirror", "--noresize", "--nomipmap", "--Mcamera",
        ];
        args.extend(["1", "0", "0", "0", "0", "1", "0", "0", "0", "0", "1", "0", "0", "0", "-5", "1"]);
        args.push("in.png");

        let config = parse(&args).unwrap();
        assert!(config.update_mode);
        assert_eq!(config.output, Some(PathBuf::from("out.exr")));
        assert_eq!(config.data_format.as_deref(), Some("half"));
        assert_eq!(config.tile, [32, 16, 1]);
        assert_eq!(config.wrap_modes(), "clamp,mirror");
        assert!(config.no_resize && config.no_mipmap);
        assert_eq!(config.camera.0[3][2], -5.0);
        assert!(config.screen.is_zero());
        assert_eq!(config.filenames, [PathBuf::from("in.png")]);
    }

    #[test]
    fn test_mode_flags() {
        let config = parse(&["--shadow", "z.exr"]).unwrap();
        assert_eq!(config.mode, ConversionMode::Shadow);

        let config = parse(&["--latl2envcube", "env.exr"]).unwrap();
        assert_eq!(config.mode, ConversionMode::LatLong2Cube);

        let err = parse(&["--shadow", "--envcube", "z.exr"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_arguments() {
        use std::os::unix::ffi::OsStringExt;

        let path = OsString::from_vec(b"/tmp/\xffbrick.png".to_vec());
        let args = [OsString::from("texbake"), OsString::from("-v"), path.clone()];
        assert_eq!(command_line(args.clone()), "texbake -v /tmp/\u{FFFD}brick.png");

        let cli = Cli::try_parse_from(args).unwrap();
        let config = cli.into_config(command_line([path.clone()])).unwrap();
        assert_eq!(config.filenames, [PathBuf::from(path)]);
    }

    #[test]
    fn test_usage_errors() {
        assert_eq!(parse(&[]).unwrap_err().kind(), ErrorKind::Usage);
        assert_eq!(
            parse(&["--wrap", "repeat", "in.png"]).unwrap_err().kind(),
            ErrorKind::Usage
        );
        assert_eq!(
            parse(&["--tile", "0", "64", "in.png"]).unwrap_err().kind(),
            ErrorKind::Usage
        );
    }
}
