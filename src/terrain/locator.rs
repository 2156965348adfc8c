use std::str::FromStr;

use serde_derive::{Deserialize, Serialize};

use crate::utils::GeodeticPoint;

const DEGREE_INTERVAL: i32 = 3;
const MAX_LONGITUDE: f64 = 360.0;

const ARCHIVE_BASE_URL: &str = "https://data.darts.isas.jaxa.jp/pub/pds3";

/// Name of the 3°×3° archive tile holding a point.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileIdentifier {
    pub prefix: String,
    pub name: String,
}

/// Archive product stored per tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    Dtm,
    Ortho,
}

impl Dataset {
    fn directory(self) -> &'static str {
        match self {
            Dataset::Dtm => "sln-l-tc-5-dtm-map-seamless-v2.0",
            Dataset::Ortho => "sln-l-tc-5-ortho-map-seamless-v2.0",
        }
    }

    fn file_prefix(self) -> &'static str {
        match self {
            Dataset::Dtm => "DTM_MAPs02_",
            Dataset::Ortho => "TCO_MAPs02_",
        }
    }
}

impl FromStr for Dataset {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s.to_ascii_lowercase().as_str() {
            "dtm" => Ok(Dataset::Dtm),
            "ortho" => Ok(Dataset::Ortho),
            _ => Err(()),
        }
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Dataset::Dtm
    }
}

impl TileIdentifier {
    pub fn file_stem(&self, dataset: Dataset) -> String {
        format!("{}{}SC", dataset.file_prefix(), self.name)
    }

    pub fn image_file_name(&self, dataset: Dataset) -> String {
        format!("{}.img", self.file_stem(dataset))
    }

    pub fn label_file_name(&self, dataset: Dataset) -> String {
        format!("{}.lbl", self.file_stem(dataset))
    }

    fn base_url(&self, dataset: Dataset) -> String {
        format!(
            "{}/{}/{}/data",
            ARCHIVE_BASE_URL,
            dataset.directory(),
            self.prefix
        )
    }

    pub fn image_url(&self, dataset: Dataset) -> String {
        format!(
            "{}/{}",
            self.base_url(dataset),
            self.image_file_name(dataset)
        )
    }

    pub fn label_url(&self, dataset: Dataset) -> String {
        format!(
            "{}/{}",
            self.base_url(dataset),
            self.label_file_name(dataset)
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LatitudeBand {
    North { lat: i32 },
    South { lat: i32 },
    SouthNearEquator { lat: i32 },
}

impl LatitudeBand {
    fn from_latitude(latitude: f64) -> Self {
        let lat = floor_to_interval(latitude);
        if latitude >= 0.0 {
            LatitudeBand::North { lat }
        } else if latitude > -f64::from(DEGREE_INTERVAL) {
            LatitudeBand::SouthNearEquator { lat }
        } else {
            LatitudeBand::South { lat }
        }
    }

    fn tile_name(self, lon: i32) -> String {
        let lon_end = lon + DEGREE_INTERVAL;
        match self {
            LatitudeBand::North { lat } => format!(
                "N{:02}E{:03}N{:02}E{:03}",
                lat + DEGREE_INTERVAL,
                lon,
                lat,
                lon_end
            ),
            LatitudeBand::South { lat } => format!(
                "S{:02}E{:03}S{:02}E{:03}",
                lat.abs(),
                lon,
                (lat + DEGREE_INTERVAL).abs(),
                lon_end
            ),
            // the archive names this row as if its northern edge were the equator
            LatitudeBand::SouthNearEquator { lat } => {
                format!("N00E{:03}S{:02}E{:03}", lon, lat.abs(), lon_end)
            }
        }
    }
}

fn floor_to_interval(value: f64) -> i32 {
    (value / f64::from(DEGREE_INTERVAL)).floor() as i32 * DEGREE_INTERVAL
}

pub fn locate(point: GeodeticPoint) -> TileIdentifier {
    let lon = floor_to_interval(point.longitude().rem_euclid(MAX_LONGITUDE));
    let band = LatitudeBand::from_latitude(point.latitude());
    TileIdentifier {
        prefix: format!("lon{:03}", lon),
        name: band.tile_name(lon),
    }
}
