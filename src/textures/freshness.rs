//! Update-mode freshness check
//!
//! In update mode an output whose modification time equals its input's is
//! considered current. After writing, the output is stamped with the input's
//! modification time so a repeated run finds nothing to do.

use std::fs::{self, File};
use std::path::Path;
use std::time::SystemTime;

use crate::error::{MakeTxError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Proceed,
    Skip,
}

/// Last modification time of a file
pub fn modified_time(path: &Path) -> Result<SystemTime> {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|source| MakeTxError::Timestamp {
            path: path.to_path_buf(),
            source,
        })
}

/// Decide whether the conversion of `input` into `output` can be skipped.
///
/// A missing input is always an error, even outside update mode.
pub fn check_freshness(input: &Path, output: &Path, update_mode: bool) -> Result<Freshness> {
    if !input.exists() {
        return Err(MakeTxError::InputNotFound(input.to_path_buf()));
    }
    if !update_mode || !output.exists() {
        return Ok(Freshness::Proceed);
    }

    let in_time = modified_time(input)?;
    let out_time = modified_time(output)?;
    if in_time == out_time {
        Ok(Freshness::Skip)
    } else {
        Ok(Freshness::Proceed)
    }
}

/// Force the modification time of `path`
pub fn stamp_modified(path: &Path, time: SystemTime) -> Result<()> {
    File::options()
        .write(true)
        .open(path)
        .and_then(|file| file.set_modified(time))
        .map_err(|source| MakeTxError::Timestamp {
            path: path.to_path_buf(),
            source,
        })
}
