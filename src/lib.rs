//! texbake - bake images into renderer-ready textures
//!
//! Produces tiled, mip-mapped texture files with the metadata renderers
//! look for (wrap modes, camera/screen transforms, texture type).

pub mod config;
pub mod error;
pub mod output;
pub mod textures;

pub use config::{MakeTxConfig, WrapMode};
pub use error::{ErrorKind, MakeTxError};
