//! Writes the base level and its mip chain through an [`ImageOutput`]
//!
//! Sequence: check capabilities, create the file with the base level, then
//! for every smaller level reopen in append mode and write it, then close.
//! This loop holds only the level being written and the one it was sampled
//! from. Backends may buffer converted levels until `close` (OpenEXR does).

use std::path::Path;

use tracing::info;

use super::buffer::ImageBuf;
use super::mipmap::next_level;
use super::spec::PixelType;
use crate::error::{MakeTxError, Result};
use crate::output::{Feature, ImageOutput, OpenMode};

/// Write `base` (and, if `mipmap`, every smaller level down to 1x1) to `path`.
///
/// Pixels are handed over as float; `storage` is the sample type recorded in
/// the spec of every subimage. Returns the number of levels written.
pub fn write_mipmap(
    base: ImageBuf,
    out: &mut dyn ImageOutput,
    path: &Path,
    storage: PixelType,
    mipmap: bool,
) -> Result<u32> {
    if !out.supports(Feature::Tiles) {
        return Err(MakeTxError::NoTiles(path.to_path_buf()));
    }
    if mipmap && !out.supports(Feature::MultiImage) {
        return Err(MakeTxError::NoMultiImage(path.to_path_buf()));
    }

    let write_err = |source| MakeTxError::Write {
        path: path.to_path_buf(),
        source,
    };

    let outspec = base.spec().with_format(storage);
    out.open(path, &outspec, OpenMode::Create)
        .map_err(|source| MakeTxError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    out.write_image(base.pixels()).map_err(write_err)?;
    let mut levels = 1;

    if mipmap {
        info!("  Mipmapping...");
        let mut level = base;
        while let Some(smaller) = next_level(&level) {
            level = smaller;
            let outspec = level.spec().with_format(storage);
            out.open(path, &outspec, OpenMode::AppendSubimage)
                .map_err(|source| MakeTxError::Append {
                    path: path.to_path_buf(),
                    source,
                })?;
            out.write_image(level.pixels()).map_err(write_err)?;
            levels += 1;
        }
    }

    out.close().map_err(write_err)?;
    info!(" Wrote file: {}", path.display());
    Ok(levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{OutputError, OutputResult};
    use crate::textures::mipmap::mip_level_count;
    use crate::textures::ImageSpec;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Open(OpenMode, u32, u32, PixelType),
        Write(usize),
        Close,
    }

    /// Records every call; optionally fails the n-th append
    struct RecordingOutput {
        tiles: bool,
        multi_image: bool,
        fail_append: Option<usize>,
        calls: Vec<Call>,
        appends: usize,
    }

    impl RecordingOutput {
        fn new(tiles: bool, multi_image: bool) -> Self {
            Self {
                tiles,
                multi_image,
                fail_append: None,
                calls: Vec::new(),
                appends: 0,
            }
        }
    }

    impl ImageOutput for RecordingOutput {
        fn format_name(&self) -> &'static str {
            "recording"
        }

        fn supports(&self, feature: Feature) -> bool {
            match feature {
                Feature::Tiles => self.tiles,
                Feature::MultiImage => self.multi_image,
            }
        }

        fn open(&mut self, _path: &Path, spec: &ImageSpec, mode: OpenMode) -> OutputResult<()> {
            if mode == OpenMode::AppendSubimage {
                self.appends += 1;
                if self.fail_append == Some(self.appends) {
                    return Err(OutputError::AppendUnsupported("recording"));
                }
            }
            self.calls
                .push(Call::Open(mode, spec.width, spec.height, spec.format));
            Ok(())
        }

        fn write_image(&mut self, pixels: &[f32]) -> OutputResult<()> {
            self.calls.push(Call::Write(pixels.len()));
            Ok(())
        }

        fn close(&mut self) -> OutputResult<()> {
            self.calls.push(Call::Close);
            Ok(())
        }
    }

    fn base(width: u32, height: u32) -> ImageBuf {
        let mut spec = ImageSpec::new(width, height, 3, PixelType::UInt8);
        spec.tile_width = 64;
        spec.tile_height = 64;
        spec.tile_depth = 1;
        ImageBuf::new(spec)
    }

    #[test]
    fn test_mipmap_sequence() {
        let mut out = RecordingOutput::new(true, true);
        let levels = write_mipmap(base(4, 2), &mut out, Path::new("t.tx"), PixelType::Half, true)
            .unwrap();
        assert_eq!(levels, 3);
        assert_eq!(levels, mip_level_count(4, 2));
        assert_eq!(
            out.calls,
            [
                Call::Open(OpenMode::Create, 4, 2, PixelType::Half),
                Call::Write(24),
                Call::Open(OpenMode::AppendSubimage, 2, 1, PixelType::Half),
                Call::Write(6),
                Call::Open(OpenMode::AppendSubimage, 1, 1, PixelType::Half),
                Call::Write(3),
                Call::Close,
            ]
        );
    }

    #[test]
    fn test_no_mipmap_writes_single_level() {
        let mut out = RecordingOutput::new(true, false);
        let levels = write_mipmap(base(8, 8), &mut out, Path::new("t.tx"), PixelType::Float, false)
            .unwrap();
        assert_eq!(levels, 1);
        assert_eq!(
            out.calls,
            [
                Call::Open(OpenMode::Create, 8, 8, PixelType::Float),
                Call::Write(192),
                Call::Close,
            ]
        );
    }

    #[test]
    fn test_tiles_required() {
        let mut out = RecordingOutput::new(false, true);
        let err = write_mipmap(base(2, 2), &mut out, Path::new("t.png"), PixelType::UInt8, false)
            .unwrap_err();
        assert!(matches!(err, MakeTxError::NoTiles(_)));
        assert!(out.calls.is_empty());
    }

    #[test]
    fn test_multi_image_required_for_mipmap() {
        let mut out = RecordingOutput::new(true, false);
        let err = write_mipmap(base(2, 2), &mut out, Path::new("t.tx"), PixelType::UInt8, true)
            .unwrap_err();
        assert!(matches!(err, MakeTxError::NoMultiImage(_)));
        assert!(out.calls.is_empty());
    }

    #[test]
    fn test_append_failure_aborts() {
        let mut out = RecordingOutput::new(true, true);
        out.fail_append = Some(2);
        let err = write_mipmap(base(8, 8), &mut out, Path::new("t.tx"), PixelType::UInt8, true)
            .unwrap_err();
        assert!(matches!(err, MakeTxError::Append { .. }));
        assert!(!out.calls.contains(&Call::Close));
        assert_eq!(
            out.calls.iter().filter(|c| matches!(c, Call::Write(_))).count(),
            2
        );
    }
}
