//! Lunar topography seen from a rover's eye level.
//!
//! The crate maps a query point to the archive tile that holds it, cuts a
//! window of the tile's elevation raster around the point and corrects every
//! sample for the curvature of the Moon, so the result reads as the height of
//! the terrain relative to the observer's horizon plane.

pub mod area;
pub mod curvature;
mod error;
pub mod label_printer;
pub mod terrain;
pub mod tile_info;
pub mod utils;
pub mod view;

pub use area::{extract, extract_clipped, ExtractionWindow, RangeCode, WindowSelection};
pub use curvature::{correct, correct_with_radius, horizon_drop, MAX_CENTRAL_ANGLE};
pub use error::{Error, Result};
pub use terrain::{
    locate, DataFolder, Dataset, Label, LabelKey, RasterTile, Sample, SampleFormat, TileFiles,
    TileGeometry, TileIdentifier,
};
pub use utils::{BodyModel, GeodeticPoint, Grid, MOON_RADIUS};
