//! Image output backends
//!
//! An [`ImageOutput`] is opened once per subimage: the first `open` creates
//! the file, later ones append another subimage (a smaller mip level) to it.
//! Pixels are always handed over as interleaved `f32`; converting them to
//! the storage type of the spec is the backend's job.

mod exr_output;
mod scanline;

use std::path::Path;

pub use self::exr_output::ExrOutput;
pub use self::scanline::ScanlineOutput;

use crate::textures::ImageSpec;

pub type OutputResult<T> = std::result::Result<T, OutputError>;

/// Optional capabilities of an output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// Tiled storage
    Tiles,
    /// More than one subimage per file
    MultiImage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Start a new file
    Create,
    /// Add a subimage to the file that is already open
    AppendSubimage,
}

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("no file is open")]
    NotOpen,

    #[error("{0} output does not support appending subimages")]
    AppendUnsupported(&'static str),

    #[error("cannot append to {appending}, {open} is open")]
    PathMismatch { open: String, appending: String },

    #[error("subimage is {got}, expected {expected}")]
    LevelMismatch { expected: String, got: String },

    #[error("expected {expected} samples, got {got}")]
    SampleCount { expected: usize, got: usize },

    #[error("{0} output cannot store {1} channels")]
    ChannelCount(&'static str, usize),

    #[error("invalid attribute or channel name \"{0}\"")]
    InvalidName(String),

    #[error(transparent)]
    Exr(#[from] exr::error::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// A writer for one image file format
pub trait ImageOutput {
    /// Short name of the format, for diagnostics
    fn format_name(&self) -> &'static str;

    fn supports(&self, feature: Feature) -> bool;

    /// Open `path` for the subimage described by `spec`
    fn open(&mut self, path: &Path, spec: &ImageSpec, mode: OpenMode) -> OutputResult<()>;

    /// Write all pixels of the currently open subimage
    fn write_image(&mut self, pixels: &[f32]) -> OutputResult<()>;

    /// Finish the file. Closing an output that is not open does nothing.
    fn close(&mut self) -> OutputResult<()>;
}

/// Find an output for a format name or a filename (by its extension)
pub fn create_output(format: &str) -> Option<Box<dyn ImageOutput>> {
    let name = Path::new(format)
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_else(|| format.to_string())
        .to_ascii_lowercase();

    match name.as_str() {
        "tx" | "exr" | "sxr" | "openexr" => Some(Box::new(ExrOutput::new())),
        _ => {
            let format = image::ImageFormat::from_extension(&name)?;
            if !format.writing_enabled() {
                return None;
            }
            Some(Box::new(ScanlineOutput::new(format)))
        }
    }
}
