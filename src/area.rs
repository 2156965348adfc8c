use std::ops::Range;

use serde_derive::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    terrain::{RasterTile, Sample, TileGeometry},
    utils::{GeodeticPoint, Grid},
    Error, Result,
};

/// Discrete window size around the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum RangeCode {
    /// ±0.1°, about 6000 m across.
    Wide,
    /// ±0.05°, about 3000 m across.
    Medium,
    /// ±0.01°, about 600 m across.
    Narrow,
    /// ±0.005°, about 300 m across.
    Close,
}

impl RangeCode {
    pub fn code(self) -> u8 {
        match self {
            RangeCode::Wide => 0,
            RangeCode::Medium => 1,
            RangeCode::Narrow => 2,
            RangeCode::Close => 3,
        }
    }

    /// Angular half-width of the window in degrees.
    pub fn half_width(self) -> f64 {
        match self {
            RangeCode::Wide => 0.1,
            RangeCode::Medium => 0.05,
            RangeCode::Narrow => 0.01,
            RangeCode::Close => 0.005,
        }
    }

    /// Nominal side length of the window in meters.
    pub fn footprint(self) -> f64 {
        match self {
            RangeCode::Wide => 6000.0,
            RangeCode::Medium => 3000.0,
            RangeCode::Narrow => 600.0,
            RangeCode::Close => 300.0,
        }
    }

    /// Default observer height above the surface for this window size, in meters.
    pub fn eye_height(self) -> f64 {
        match self {
            RangeCode::Wide => 36.0,
            RangeCode::Medium => 20.0,
            RangeCode::Narrow => 3.6,
            RangeCode::Close => 1.8,
        }
    }
}

impl From<u8> for RangeCode {
    fn from(code: u8) -> Self {
        match code {
            0 => RangeCode::Wide,
            1 => RangeCode::Medium,
            2 => RangeCode::Narrow,
            _ => RangeCode::Close,
        }
    }
}

impl From<RangeCode> for u8 {
    fn from(range: RangeCode) -> u8 {
        range.code()
    }
}

impl Default for RangeCode {
    fn default() -> Self {
        RangeCode::Wide
    }
}

/// Source rows and columns of a window. Both are contiguous since pixel
/// coordinates are monotonic along each axis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowSelection {
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

impl WindowSelection {
    pub(crate) fn from_indices<I, J>(rows: I, cols: J) -> Self
    where
        I: IntoIterator<Item = usize>,
        J: IntoIterator<Item = usize>,
    {
        WindowSelection {
            rows: span(rows),
            cols: span(cols),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.cols.is_empty()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.cols.len())
    }
}

fn span<I: IntoIterator<Item = usize>>(indices: I) -> Range<usize> {
    let mut iter = indices.into_iter();
    match iter.next() {
        Some(first) => {
            let last = iter.last().unwrap_or(first);
            first..last + 1
        }
        None => 0..0,
    }
}

/// Elevation samples around the target with per-sample coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtractionWindow<T> {
    elevation: Grid<T>,
    longitude: Grid<f64>,
    latitude: Grid<f64>,
    row_offset: usize,
    col_offset: usize,
}

impl<T> ExtractionWindow<T> {
    pub fn new(elevation: Grid<T>, longitude: Grid<f64>, latitude: Grid<f64>) -> Result<Self> {
        for coords in &[&longitude, &latitude] {
            if coords.shape() != elevation.shape() {
                return Err(Error::ShapeMismatch {
                    expected: elevation.shape(),
                    actual: coords.shape(),
                });
            }
        }
        Ok(Self {
            elevation,
            longitude,
            latitude,
            row_offset: 0,
            col_offset: 0,
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        self.elevation.shape()
    }

    pub fn elevation(&self) -> &Grid<T> {
        &self.elevation
    }

    pub fn longitude(&self) -> &Grid<f64> {
        &self.longitude
    }

    pub fn latitude(&self) -> &Grid<f64> {
        &self.latitude
    }

    /// Position of the window's first sample in the source raster.
    pub fn offset(&self) -> (usize, usize) {
        (self.row_offset, self.col_offset)
    }
}

impl<T: Sample> ExtractionWindow<T> {
    pub fn to_f64(&self) -> ExtractionWindow<f64> {
        ExtractionWindow {
            elevation: self.elevation.map(|v| v.to_f64()),
            longitude: self.longitude.clone(),
            latitude: self.latitude.clone(),
            row_offset: self.row_offset,
            col_offset: self.col_offset,
        }
    }
}

fn out_of_bounds(geometry: &TileGeometry, target: GeodeticPoint, half_width: f64) -> Error {
    let (min_lat, max_lon) = geometry.lower_right();
    Error::OutOfBounds {
        latitude: target.latitude(),
        longitude: target.longitude(),
        half_width,
        min_lat,
        max_lat: geometry.upper_left.latitude(),
        min_lon: geometry.upper_left.longitude(),
        max_lon,
    }
}

fn covers(geometry: &TileGeometry, target: GeodeticPoint, half_width: f64) -> bool {
    let (min_lat, max_lon) = geometry.lower_right();
    let max_lat = geometry.upper_left.latitude();
    let min_lon = geometry.upper_left.longitude();
    target.latitude() - half_width >= min_lat
        && target.latitude() + half_width <= max_lat
        && target.longitude() - half_width >= min_lon
        && target.longitude() + half_width <= max_lon
}

fn cut<T: Sample>(tile: &RasterTile<T>, selection: WindowSelection) -> ExtractionWindow<T> {
    let geometry = tile.geometry();
    let WindowSelection { rows, cols } = selection;
    let longitude = Grid::from_fn(rows.len(), cols.len(), |_, j| {
        geometry.longitude(cols.start + j)
    });
    let latitude = Grid::from_fn(rows.len(), cols.len(), |i, _| {
        geometry.latitude(rows.start + i)
    });
    ExtractionWindow {
        elevation: tile.elevation().window(rows.clone(), cols.clone()),
        longitude,
        latitude,
        row_offset: rows.start,
        col_offset: cols.start,
    }
}

/// Cuts the `range` window centered on `target`. The whole window has to lie
/// within the tile's sample coverage.
pub fn extract<T: Sample>(
    tile: &RasterTile<T>,
    target: GeodeticPoint,
    range: RangeCode,
) -> Result<ExtractionWindow<T>> {
    let half_width = range.half_width();
    if !covers(tile.geometry(), target, half_width) {
        return Err(out_of_bounds(tile.geometry(), target, half_width));
    }
    extract_clipped(tile, target, range)
}

/// Like [`extract`], but accepts a window clipped by the tile edges as long
/// as at least one row and one column remain.
pub fn extract_clipped<T: Sample>(
    tile: &RasterTile<T>,
    target: GeodeticPoint,
    range: RangeCode,
) -> Result<ExtractionWindow<T>> {
    let half_width = range.half_width();
    let selection = tile.geometry().select(target, half_width);
    if selection.is_empty() {
        return Err(out_of_bounds(tile.geometry(), target, half_width));
    }
    if !covers(tile.geometry(), target, half_width) {
        warn!(
            "Window of ±{}° around ({}, {}) is clipped by the tile edge",
            half_width,
            target.latitude(),
            target.longitude()
        );
    }
    debug!(
        "Selected rows {:?} and columns {:?} around ({}, {})",
        selection.rows,
        selection.cols,
        target.latitude(),
        target.longitude()
    );
    Ok(cut(tile, selection))
}
