use std::{
    fs::File,
    io::{self, BufReader, Read},
    mem,
    path::Path,
    str::FromStr,
};

use serde_derive::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{label::LabelKey, Label};
use crate::{
    area::WindowSelection,
    utils::{GeodeticPoint, Grid},
    Error, Result,
};

/// A raw raster sample stored big-endian on disk.
pub trait Sample: Copy + Send + Sync + 'static {
    fn from_be_slice(bytes: &[u8]) -> Self;
    fn to_f64(self) -> f64;
}

impl Sample for i16 {
    fn from_be_slice(bytes: &[u8]) -> Self {
        i16::from_be_bytes([bytes[0], bytes[1]])
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Sample for u16 {
    fn from_be_slice(bytes: &[u8]) -> Self {
        u16::from_be_bytes([bytes[0], bytes[1]])
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Sample for f32 {
    fn from_be_slice(bytes: &[u8]) -> Self {
        f32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Sample for f64 {
    fn from_be_slice(bytes: &[u8]) -> Self {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&bytes[..8]);
        f64::from_be_bytes(buf)
    }

    fn to_f64(self) -> f64 {
        self
    }
}

/// On-disk sample layout of a raw raster file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleFormat {
    I16Be,
    U16Be,
    F32Be,
    F64Be,
}

impl SampleFormat {
    pub fn sample_size(self) -> usize {
        match self {
            SampleFormat::I16Be | SampleFormat::U16Be => 2,
            SampleFormat::F32Be => 4,
            SampleFormat::F64Be => 8,
        }
    }
}

impl FromStr for SampleFormat {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        match s.to_ascii_lowercase().as_str() {
            "i16" | "i16be" => Ok(SampleFormat::I16Be),
            "u16" | "u16be" => Ok(SampleFormat::U16Be),
            "f32" | "f32be" => Ok(SampleFormat::F32Be),
            "f64" | "f64be" => Ok(SampleFormat::F64Be),
            _ => Err(()),
        }
    }
}

/// Georeferencing of an equirectangular raster.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileGeometry {
    pub lines: usize,
    pub line_samples: usize,
    pub upper_left: GeodeticPoint,
    /// Pixels per degree.
    pub resolution: f64,
}

impl TileGeometry {
    pub fn new(
        lines: usize,
        line_samples: usize,
        upper_left: GeodeticPoint,
        resolution: f64,
    ) -> Result<Self> {
        if lines == 0 {
            return Err(Error::InvalidMetadata {
                key: LabelKey::Lines,
                value: 0.0,
            });
        }
        if line_samples == 0 {
            return Err(Error::InvalidMetadata {
                key: LabelKey::LineSamples,
                value: 0.0,
            });
        }
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(Error::InvalidMetadata {
                key: LabelKey::MapResolution,
                value: resolution,
            });
        }
        let geometry = Self {
            lines,
            line_samples,
            upper_left,
            resolution,
        };
        // the widest sample type must still be addressable
        geometry.raster_bytes(mem::size_of::<f64>())?;
        Ok(geometry)
    }

    /// Size of one raster line in bytes for samples of `sample_size` bytes.
    pub fn line_bytes(&self, sample_size: usize) -> Result<u64> {
        self.line_samples
            .checked_mul(sample_size)
            .map(|bytes| bytes as u64)
            .ok_or_else(|| self.too_large())
    }

    /// Size of the whole raster in bytes for samples of `sample_size` bytes.
    pub fn raster_bytes(&self, sample_size: usize) -> Result<u64> {
        self.lines
            .checked_mul(self.line_samples)
            .and_then(|count| count.checked_mul(sample_size))
            .map(|bytes| bytes as u64)
            .ok_or_else(|| self.too_large())
    }

    fn too_large(&self) -> Error {
        Error::InvalidMetadata {
            key: LabelKey::LineSamples,
            value: self.line_samples as f64,
        }
    }

    /// Builds the geometry from a parsed label. Every geometry key must be
    /// present and the raster must be single-band.
    pub fn from_label(label: &Label) -> Result<Self> {
        if let Some(bands) = label.get(LabelKey::Bands) {
            if bands != 1.0 {
                return Err(Error::InvalidMetadata {
                    key: LabelKey::Bands,
                    value: bands,
                });
            }
        }
        let lines = count(label, LabelKey::Lines)?;
        let line_samples = count(label, LabelKey::LineSamples)?;
        let upper_left = GeodeticPoint::corner(
            label.require(LabelKey::UpperLeftLatitude)?,
            label.require(LabelKey::UpperLeftLongitude)?,
        )?;
        let resolution = label.require(LabelKey::MapResolution)?;
        Self::new(lines, line_samples, upper_left, resolution)
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.lines, self.line_samples)
    }

    pub fn longitude(&self, col: usize) -> f64 {
        self.upper_left.longitude() + col as f64 / self.resolution
    }

    pub fn latitude(&self, row: usize) -> f64 {
        self.upper_left.latitude() - row as f64 / self.resolution
    }

    pub fn longitudes(&self) -> Vec<f64> {
        (0..self.line_samples).map(|j| self.longitude(j)).collect()
    }

    pub fn latitudes(&self) -> Vec<f64> {
        (0..self.lines).map(|i| self.latitude(i)).collect()
    }

    /// Latitude of the southernmost line and longitude of the easternmost sample.
    pub fn lower_right(&self) -> (f64, f64) {
        (
            self.latitude(self.lines - 1),
            self.longitude(self.line_samples - 1),
        )
    }

    /// Rows and columns whose coordinates fall inside `target ± half_width`
    /// (closed on both ends).
    pub fn select(&self, target: GeodeticPoint, half_width: f64) -> WindowSelection {
        let lon_min = target.longitude() - half_width;
        let lon_max = target.longitude() + half_width;
        let lat_min = target.latitude() - half_width;
        let lat_max = target.latitude() + half_width;

        let cols = self
            .longitudes()
            .into_iter()
            .enumerate()
            .filter(|&(_, lon)| lon >= lon_min && lon <= lon_max)
            .map(|(j, _)| j);
        let rows = self
            .latitudes()
            .into_iter()
            .enumerate()
            .filter(|&(_, lat)| lat >= lat_min && lat <= lat_max)
            .map(|(i, _)| i);

        WindowSelection::from_indices(rows, cols)
    }
}

fn count(label: &Label, key: LabelKey) -> Result<usize> {
    let value = label.require(key)?;
    if value < 1.0 || value.fract() != 0.0 || !value.is_finite() {
        return Err(Error::InvalidMetadata { key, value });
    }
    Ok(value as usize)
}

/// A full elevation (or orthoimage) raster with its georeferencing.
#[derive(Clone, Debug)]
pub struct RasterTile<T> {
    elevation: Grid<T>,
    geometry: TileGeometry,
}

impl<T: Sample> RasterTile<T> {
    pub fn new(elevation: Grid<T>, geometry: TileGeometry) -> Result<Self> {
        if elevation.shape() != geometry.shape() {
            return Err(Error::ShapeMismatch {
                expected: geometry.shape(),
                actual: elevation.shape(),
            });
        }
        Ok(Self {
            elevation,
            geometry,
        })
    }

    /// Decodes `lines × line_samples` big-endian samples, one line at a time.
    /// Buffers grow with the data actually read, so a short reader fails with
    /// an I/O error whatever the declared geometry.
    pub fn from_reader<R: Read>(mut reader: R, geometry: TileGeometry) -> Result<Self> {
        let sample_size = mem::size_of::<T>();
        geometry.raster_bytes(sample_size)?;
        let line_bytes = geometry.line_bytes(sample_size)?;
        let mut line = Vec::new();
        let mut data = Vec::new();

        for row in 0..geometry.lines {
            line.clear();
            let read = (&mut reader).take(line_bytes).read_to_end(&mut line)?;
            if (read as u64) < line_bytes {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("raster ends in line {} of {}", row, geometry.lines),
                )
                .into());
            }
            data.extend(line.chunks_exact(sample_size).map(T::from_be_slice));
        }

        let elevation = Grid::from_vec(geometry.lines, geometry.line_samples, data)?;
        Self::new(elevation, geometry)
    }

    pub fn from_file<P: AsRef<Path>>(path: P, geometry: TileGeometry) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;

        let expected = geometry.raster_bytes(mem::size_of::<T>())?;
        let actual = file.metadata()?.len();
        if actual != expected {
            return Err(Error::RasterSize {
                path: path.to_owned(),
                expected,
                actual,
            });
        }

        info!(
            "Loading raster {:?} ({} x {} samples)",
            path, geometry.lines, geometry.line_samples
        );
        let tile = Self::from_reader(BufReader::new(file), geometry)?;
        debug!(
            "Raster covers latitude {}..{}, longitude {}..{}",
            tile.geometry.lower_right().0,
            tile.geometry.upper_left.latitude(),
            tile.geometry.upper_left.longitude(),
            tile.geometry.lower_right().1
        );
        Ok(tile)
    }

    pub fn elevation(&self) -> &Grid<T> {
        &self.elevation
    }

    pub fn geometry(&self) -> &TileGeometry {
        &self.geometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    fn geometry(lines: usize, samples: usize) -> TileGeometry {
        TileGeometry::new(
            lines,
            samples,
            GeodeticPoint::corner(10.0, 20.0).unwrap(),
            100.0,
        )
        .unwrap()
    }

    #[test]
    fn test_geometry_from_label() {
        let label = Label::parse(
            "BANDS = 1\nLINES = 4\nLINE_SAMPLES = 5\nUPPER_LEFT_LATITUDE = -1.5\n\
             UPPER_LEFT_LONGITUDE = 300.25\nMAP_RESOLUTION = 4096\n",
        );
        let geometry = TileGeometry::from_label(&label).unwrap();
        assert_eq!(geometry.shape(), (4, 5));
        assert_eq!(geometry.upper_left.latitude(), -1.5);
        assert_eq!(geometry.upper_left.longitude(), 300.25);
        assert_eq!(geometry.resolution, 4096.0);
    }

    #[test]
    fn test_geometry_rejects_incomplete_label() {
        let label = Label::parse("LINES = 4\nLINE_SAMPLES = 5\nUPPER_LEFT_LATITUDE = 1.0\n");
        match TileGeometry::from_label(&label) {
            Err(Error::MetadataMissing(LabelKey::UpperLeftLongitude)) => (),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_geometry_rejects_bad_values() {
        let label = Label::parse(
            "BANDS = 3\nLINES = 4\nLINE_SAMPLES = 5\nUPPER_LEFT_LATITUDE = 1\n\
             UPPER_LEFT_LONGITUDE = 2\nMAP_RESOLUTION = 10\n",
        );
        assert!(matches!(
            TileGeometry::from_label(&label),
            Err(Error::InvalidMetadata {
                key: LabelKey::Bands,
                ..
            })
        ));

        let label = Label::parse(
            "LINES = 4.5\nLINE_SAMPLES = 5\nUPPER_LEFT_LATITUDE = 1\n\
             UPPER_LEFT_LONGITUDE = 2\nMAP_RESOLUTION = 10\n",
        );
        assert!(matches!(
            TileGeometry::from_label(&label),
            Err(Error::InvalidMetadata {
                key: LabelKey::Lines,
                ..
            })
        ));

        let upper_left = GeodeticPoint::corner(0.0, 0.0).unwrap();
        assert!(TileGeometry::new(2, 2, upper_left, 0.0).is_err());
        assert!(TileGeometry::new(0, 2, upper_left, 1.0).is_err());
    }

    #[test]
    fn test_pixel_coordinates() {
        let geometry = geometry(3, 4);
        assert_eq!(geometry.longitude(0), 20.0);
        assert_relative_eq!(geometry.longitude(2), 20.02, epsilon = 1e-12);
        assert_eq!(geometry.latitude(0), 10.0);
        assert_relative_eq!(geometry.latitude(1), 9.99, epsilon = 1e-12);
        let lats = geometry.latitudes();
        assert!(lats.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_tile_shape_checked() {
        let grid = Grid::from_vec(2, 2, vec![0i16; 4]).unwrap();
        match RasterTile::new(grid, geometry(3, 2)) {
            Err(Error::ShapeMismatch { expected, actual }) => {
                assert_eq!(expected, (3, 2));
                assert_eq!(actual, (2, 2));
            }
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_read_big_endian_i16() {
        let samples: [i16; 6] = [-2000, -1, 0, 1, 255, 12345];
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_be_bytes().to_vec()).collect();
        let tile = RasterTile::<i16>::from_reader(&bytes[..], geometry(2, 3)).unwrap();
        assert_eq!(tile.elevation().row(0), &[-2000, -1, 0]);
        assert_eq!(tile.elevation().row(1), &[1, 255, 12345]);
    }

    #[test]
    fn test_read_big_endian_f32() {
        let samples: [f32; 2] = [-1234.5, 0.25];
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_be_bytes().to_vec()).collect();
        let tile = RasterTile::<f32>::from_reader(&bytes[..], geometry(1, 2)).unwrap();
        assert_eq!(tile.elevation().as_slice(), &samples);
    }

    #[test]
    fn test_read_big_endian_f64() {
        let samples: [f64; 3] = [-9.75, 0.0, 1e-3];
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_be_bytes().to_vec()).collect();
        let format: SampleFormat = "f64".parse().unwrap();
        assert_eq!(format.sample_size(), mem::size_of::<f64>());
        let tile = RasterTile::<f64>::from_reader(&bytes[..], geometry(3, 1)).unwrap();
        assert_eq!(tile.elevation().as_slice(), &samples);
    }

    #[test]
    fn test_huge_label_dimensions_rejected() {
        let label = Label::parse(
            "LINES = 10000000000\nLINE_SAMPLES = 10000000000\nUPPER_LEFT_LATITUDE = 1\n\
             UPPER_LEFT_LONGITUDE = 2\nMAP_RESOLUTION = 10\n",
        );
        assert!(matches!(
            TileGeometry::from_label(&label),
            Err(Error::InvalidMetadata {
                key: LabelKey::LineSamples,
                ..
            })
        ));

        let geometry = geometry(4, 4);
        let wide = TileGeometry {
            line_samples: usize::MAX,
            ..geometry
        };
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 8]).unwrap();
        assert!(matches!(
            RasterTile::<i16>::from_file(file.path(), wide),
            Err(Error::InvalidMetadata { .. })
        ));
    }

    #[test]
    fn test_short_reader_with_large_geometry() {
        let bytes = [0u8; 4];
        let geometry = geometry(200_000, 200_000);
        match RasterTile::<i16>::from_reader(&bytes[..], geometry) {
            Err(Error::Io(err)) => assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_file_size_checked() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 10]).unwrap();
        match RasterTile::<u16>::from_file(file.path(), geometry(2, 3)) {
            Err(Error::RasterSize {
                expected, actual, ..
            }) => {
                assert_eq!(expected, 12);
                assert_eq!(actual, 10);
            }
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }
}
