//! Image geometry, pixel storage types and metadata attributes

use std::collections::BTreeMap;
use std::fmt;

/// Storage type of a single channel sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelType {
    UInt8,
    Int8,
    UInt16,
    Int16,
    Half,
    Float,
    Double,
}

impl PixelType {
    /// Parse a `-d` data format name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "uint8" => Some(PixelType::UInt8),
            "sint8" | "int8" => Some(PixelType::Int8),
            "uint16" => Some(PixelType::UInt16),
            "sint16" | "int16" => Some(PixelType::Int16),
            "half" => Some(PixelType::Half),
            "float" => Some(PixelType::Float),
            "double" => Some(PixelType::Double),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PixelType::UInt8 => "uint8",
            PixelType::Int8 => "int8",
            PixelType::UInt16 => "uint16",
            PixelType::Int16 => "int16",
            PixelType::Half => "half",
            PixelType::Float => "float",
            PixelType::Double => "double",
        }
    }

    pub fn is_floating_point(self) -> bool {
        matches!(self, PixelType::Half | PixelType::Float | PixelType::Double)
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Row-major 4x4 transform
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Matrix44(pub [[f32; 4]; 4]);

impl Matrix44 {
    pub const ZERO: Matrix44 = Matrix44([[0.0; 4]; 4]);

    /// Build from 16 values in row-major order
    pub fn from_slice(values: &[f32]) -> Option<Self> {
        if values.len() != 16 {
            return None;
        }
        let mut m = [[0.0; 4]; 4];
        for (i, v) in values.iter().enumerate() {
            m[i / 4][i % 4] = *v;
        }
        Some(Matrix44(m))
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    pub fn to_flat(&self) -> [f32; 16] {
        let mut flat = [0.0; 16];
        for (i, v) in flat.iter_mut().enumerate() {
            *v = self.0[i / 4][i % 4];
        }
        flat
    }
}

/// Typed metadata value
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    String(String),
    Float(f32),
    Matrix(Matrix44),
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::String(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::String(s)
    }
}

impl From<f32> for AttrValue {
    fn from(v: f32) -> Self {
        AttrValue::Float(v)
    }
}

impl From<Matrix44> for AttrValue {
    fn from(m: Matrix44) -> Self {
        AttrValue::Matrix(m)
    }
}

/// Description of an image: geometry, tiling, channels, format and metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSpec {
    /// Origin of the pixel data window
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    /// Size of the display window; 0 means "same as the data window"
    pub full_width: u32,
    pub full_height: u32,
    pub full_depth: u32,
    /// Tile size; 0 means scanline storage
    pub tile_width: u32,
    pub tile_height: u32,
    pub tile_depth: u32,
    pub nchannels: usize,
    pub channel_names: Vec<String>,
    pub format: PixelType,
    attributes: BTreeMap<String, AttrValue>,
}

impl ImageSpec {
    /// Untiled 2D spec with default channel names
    pub fn new(width: u32, height: u32, nchannels: usize, format: PixelType) -> Self {
        Self {
            x: 0,
            y: 0,
            z: 0,
            width,
            height,
            depth: 1,
            full_width: width,
            full_height: height,
            full_depth: 1,
            tile_width: 0,
            tile_height: 0,
            tile_depth: 0,
            nchannels,
            channel_names: default_channel_names(nchannels),
            format,
            attributes: BTreeMap::new(),
        }
    }

    pub fn set_format(&mut self, format: PixelType) {
        self.format = format;
    }

    /// Copy of this spec with a different storage type
    pub fn with_format(&self, format: PixelType) -> Self {
        let mut spec = self.clone();
        spec.set_format(format);
        spec
    }

    pub fn is_tiled(&self) -> bool {
        self.tile_width > 0 && self.tile_height > 0
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize * self.depth.max(1) as usize
    }

    /// Number of f32 samples needed to hold the whole image
    pub fn sample_count(&self) -> usize {
        self.pixel_count() * self.nchannels
    }

    /// Set (or replace) a metadata attribute
    pub fn attribute(&mut self, name: &str, value: impl Into<AttrValue>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    pub fn get_attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    pub fn get_string_attribute(&self, name: &str) -> Option<&str> {
        match self.attributes.get(name) {
            Some(AttrValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<AttrValue> {
        self.attributes.remove(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Conventional channel names for a given channel count
pub fn default_channel_names(nchannels: usize) -> Vec<String> {
    let base: &[&str] = match nchannels {
        1 => &["Y"],
        2 => &["Y", "A"],
        3 => &["R", "G", "B"],
        _ => &["R", "G", "B", "A"],
    };
    (0..nchannels)
        .map(|i| match base.get(i) {
            Some(name) => name.to_string(),
            None => format!("channel{}", i),
        })
        .collect()
}
