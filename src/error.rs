//! Error types for texture conversion.
//!
//! Every pipeline component returns [`MakeTxError`]; only the binary decides
//! how to report an error and which exit status to use.

use std::path::PathBuf;

use crate::output::OutputError;
use crate::textures::ConversionMode;

/// Broad classification of a conversion failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing arguments; nothing was processed
    Usage,
    /// Input or target format does not meet the requirements of the conversion
    Precondition,
    /// The output writer failed part way through
    Write,
    /// The requested conversion mode is recognized but not implemented
    Unimplemented,
}

#[derive(Debug, thiserror::Error)]
pub enum MakeTxError {
    #[error("{0}")]
    Usage(String),

    #[error("\"{}\" does not exist", .0.display())]
    InputNotFound(PathBuf),

    #[error("Could not read \"{}\" : {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(
        "shadow maps require 1-channel images, \"{}\" is {channels} channels",
        path.display()
    )]
    ShadowChannels { path: PathBuf, channels: usize },

    #[error("Could not find an image output to write {0} files")]
    NoWriter(String),

    #[error("\"{}\" format does not support tiled images", .0.display())]
    NoTiles(PathBuf),

    #[error("\"{}\" format does not support multires images", .0.display())]
    NoMultiImage(PathBuf),

    #[error("Could not open \"{}\" : {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: OutputError,
    },

    #[error("Could not append \"{}\" : {source}", path.display())]
    Append {
        path: PathBuf,
        #[source]
        source: OutputError,
    },

    #[error("error writing \"{}\" : {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: OutputError,
    },

    #[error("Could not access timestamp of \"{}\" : {source}", path.display())]
    Timestamp {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}", .0.unsupported_message())]
    Unsupported(ConversionMode),
}

impl MakeTxError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MakeTxError::Usage(_) => ErrorKind::Usage,
            MakeTxError::InputNotFound(_)
            | MakeTxError::Decode { .. }
            | MakeTxError::ShadowChannels { .. }
            | MakeTxError::NoWriter(_)
            | MakeTxError::NoTiles(_)
            | MakeTxError::NoMultiImage(_) => ErrorKind::Precondition,
            MakeTxError::Open { .. }
            | MakeTxError::Append { .. }
            | MakeTxError::Write { .. }
            | MakeTxError::Timestamp { .. } => ErrorKind::Write,
            MakeTxError::Unsupported(_) => ErrorKind::Unimplemented,
        }
    }

    /// Whether the process should exit with a failure status
    pub fn is_fatal(&self) -> bool {
        self.kind() != ErrorKind::Unimplemented
    }
}

pub type Result<T> = std::result::Result<T, MakeTxError>;
