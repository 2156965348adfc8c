use serde_derive::{Deserialize, Serialize};

/// Mean lunar radius in meters.
pub const MOON_RADIUS: f64 = 1_737_400.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BodyModel {
    Moon,
    Spherical { radius: f64 },
}

impl Default for BodyModel {
    fn default() -> Self {
        BodyModel::Moon
    }
}

impl BodyModel {
    pub fn radius(&self) -> f64 {
        match *self {
            BodyModel::Moon => MOON_RADIUS,
            BodyModel::Spherical { radius } => radius,
        }
    }
}
