use std::{io, path::PathBuf};

use thiserror::Error;

use crate::terrain::LabelKey;

#[derive(Debug, Error)]
pub enum Error {
    /// Query point outside latitude `[-90, 90)` / longitude `[0, 360)`.
    #[error("coordinate ({latitude}, {longitude}) is outside the valid range (latitude -90..90, longitude 0..360)")]
    InputDomain { latitude: f64, longitude: f64 },

    #[error(
        "extraction window of ±{half_width}° around ({latitude}, {longitude}) is not covered by the tile \
        (tile spans latitude {min_lat}..{max_lat}, longitude {min_lon}..{max_lon})"
    )]
    OutOfBounds {
        latitude: f64,
        longitude: f64,
        half_width: f64,
        min_lat: f64,
        max_lat: f64,
        min_lon: f64,
        max_lon: f64,
    },

    #[error("central angle {angle}° to ({latitude}, {longitude}) is at or beyond the {limit}° limit")]
    GeometryDomain {
        latitude: f64,
        longitude: f64,
        angle: f64,
        limit: f64,
    },

    #[error("label is missing required key {0}")]
    MetadataMissing(LabelKey),

    #[error("invalid label value {value} for {key}")]
    InvalidMetadata { key: LabelKey, value: f64 },

    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("raster {path:?} holds {actual} bytes, geometry requires {expected}")]
    RasterSize {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("tile data {path:?} not found locally (archive: {url})")]
    MissingTileData { path: PathBuf, url: String },

    #[error("invalid value for {name}: {value}")]
    InvalidArgument { name: &'static str, value: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("metadata encoding error: {0}")]
    Metadata(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
