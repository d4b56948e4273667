//! Texture baking
//!
//! Converts a decoded image into a tiled, optionally mip-mapped texture:
//! output spec derivation, power-of-two resizing, mip chain generation and
//! the update-mode freshness check.

mod buffer;
pub mod freshness;
pub mod mipmap;
mod mode;
pub mod output_spec;
mod processor;
pub mod resize;
mod spec;
pub mod writer;

pub use buffer::ImageBuf;
pub use freshness::Freshness;
pub use mode::{ConversionMode, ModeFlags};
pub use output_spec::OutputPlan;
pub use processor::{process_texture, Outcome};
pub use spec::{default_channel_names, AttrValue, ImageSpec, Matrix44, PixelType};
