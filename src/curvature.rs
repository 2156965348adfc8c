use rayon::prelude::*;
use tracing::debug;

use crate::{
    area::ExtractionWindow,
    terrain::Sample,
    utils::{GeodeticPoint, Grid, MOON_RADIUS},
    Error, Result,
};

/// Central angle, in degrees, from which a sample is considered too far from
/// the observer to be corrected.
pub const MAX_CENTRAL_ANGLE: f64 = 89.9;

/// Drop of a sphere of radius `radius` below the tangent plane at central angle `theta` (radians).
pub fn horizon_drop(radius: f64, theta: f64) -> f64 {
    if theta == 0.0 {
        return 0.0;
    }
    radius / theta.cos() - radius
}

/// Apparent elevation of every window sample as seen from `target` on the Moon.
pub fn correct<T: Sample>(window: &ExtractionWindow<T>, target: GeodeticPoint) -> Result<Grid<f64>> {
    correct_with_radius(window, target, MOON_RADIUS)
}

pub fn correct_with_radius<T: Sample>(
    window: &ExtractionWindow<T>,
    target: GeodeticPoint,
    radius: f64,
) -> Result<Grid<f64>> {
    let (rows, cols) = window.shape();
    debug!(
        "Correcting {} x {} samples for curvature (R = {} m)",
        rows, cols, radius
    );

    let elevation = window.elevation().as_slice();
    let latitude = window.latitude().as_slice();
    let longitude = window.longitude().as_slice();

    let data = elevation
        .par_iter()
        .zip(latitude.par_iter())
        .zip(longitude.par_iter())
        .map(|((&elev, &lat), &lon)| {
            let theta = target.central_angle(&sample_point(lat, lon)?);
            let angle = theta.to_degrees();
            if !angle.is_finite() || angle >= MAX_CENTRAL_ANGLE {
                return Err(Error::GeometryDomain {
                    latitude: lat,
                    longitude: lon,
                    angle,
                    limit: MAX_CENTRAL_ANGLE,
                });
            }
            Ok(elev.to_f64() - horizon_drop(radius, theta))
        })
        .collect::<Result<Vec<f64>>>()?;

    Grid::from_vec(rows, cols, data)
}

// window coordinates come from raster corners, so they are not
// necessarily inside the query domain
fn sample_point(latitude: f64, longitude: f64) -> Result<GeodeticPoint> {
    GeodeticPoint::corner(latitude, longitude)
}
