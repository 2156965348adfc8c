mod body_model;
mod grid;

use serde::{de, Deserializer};
use serde_derive::{Deserialize, Serialize};

use crate::{Error, Result};

pub use body_model::{BodyModel, MOON_RADIUS};
pub use grid::Grid;

/// A point on the lunar surface, latitude in `[-90, 90)` and east longitude in `[0, 360)`.
///
/// Deserialized points are checked like [`GeodeticPoint::corner`], the
/// weaker of the two constructors.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GeodeticPoint {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawPoint {
    latitude: f64,
    longitude: f64,
}

impl<'de> serde::Deserialize<'de> for GeodeticPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = <RawPoint as serde::Deserialize>::deserialize(deserializer)?;
        GeodeticPoint::corner(raw.latitude, raw.longitude).map_err(de::Error::custom)
    }
}

impl GeodeticPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite()
            || !longitude.is_finite()
            || !(-90.0..90.0).contains(&latitude)
            || !(0.0..360.0).contains(&longitude)
        {
            return Err(Error::InputDomain {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Raster corner coordinates. Latitude may reach the north pole and
    /// longitude only has to be finite.
    pub fn corner(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !longitude.is_finite() || !(-90.0..=90.0).contains(&latitude)
        {
            return Err(Error::InputDomain {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle central angle to `other` in radians (spherical law of cosines).
    pub fn central_angle(&self, other: &GeodeticPoint) -> f64 {
        if self == other {
            return 0.0;
        }
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlon = (self.longitude - other.longitude).to_radians();

        let cos_theta = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * dlon.cos();
        cos_theta.max(-1.0).min(1.0).acos()
    }
}
