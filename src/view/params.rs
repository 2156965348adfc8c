use std::{env, fs::File, io::Read, path::PathBuf, str::FromStr};

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use serde_derive::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    area::RangeCode,
    terrain::{locate, DataFolder, Dataset, Label, SampleFormat, TileGeometry},
    utils::{BodyModel, GeodeticPoint},
    Error, Result,
};

#[derive(Clone, Copy, Default, Serialize, Deserialize)]
pub struct ConfTarget {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

/// Georeferencing given by hand, for rasters shipped without a parsable label.
#[derive(Clone, Copy, Serialize, Deserialize)]
pub struct ConfGeometry {
    pub lines: usize,
    pub line_samples: usize,
    pub upper_left_latitude: f64,
    pub upper_left_longitude: f64,
    pub map_resolution: f64,
}

impl ConfGeometry {
    pub fn into_geometry(self) -> Result<TileGeometry> {
        TileGeometry::new(
            self.lines,
            self.line_samples,
            GeodeticPoint::corner(self.upper_left_latitude, self.upper_left_longitude)?,
            self.map_resolution,
        )
    }
}

/// An explicit raster file, bypassing the archive tile lookup.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConfRaster {
    pub image: String,
    pub label: Option<String>,
    pub geometry: Option<ConfGeometry>,
    #[serde(default = "default_format")]
    pub format: SampleFormat,
}

fn default_format() -> SampleFormat {
    SampleFormat::I16Be
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Output {
    /// TSV dump of the window; a directory gets a generated file name.
    pub file: Option<String>,
    /// Compressed binary dump of the window; a directory gets a generated file name.
    pub file_metadata: Option<String>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_data_folder")]
    data_folder: String,
    #[serde(default)]
    dataset: Dataset,
    #[serde(default)]
    target: ConfTarget,
    #[serde(default)]
    range: RangeCode,
    #[serde(default)]
    body: BodyModel,
    #[serde(default)]
    allow_clipped: bool,
    raster: Option<ConfRaster>,
    #[serde(default)]
    output: Output,
}

fn default_data_folder() -> String {
    "./data".to_owned()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_folder: default_data_folder(),
            dataset: Dataset::default(),
            target: ConfTarget::default(),
            range: RangeCode::default(),
            body: BodyModel::default(),
            allow_clipped: false,
            raster: None,
            output: Output::default(),
        }
    }
}

/// Where the raster georeferencing comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum GeometrySource {
    Label(PathBuf),
    Explicit(TileGeometry),
}

impl GeometrySource {
    pub fn load(&self) -> Result<TileGeometry> {
        match self {
            GeometrySource::Label(path) => TileGeometry::from_label(&Label::from_file(path)?),
            GeometrySource::Explicit(geometry) => Ok(*geometry),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RasterSource {
    pub image: PathBuf,
    pub geometry: GeometrySource,
    pub format: SampleFormat,
}

#[derive(Clone)]
pub struct Params {
    pub target: GeodeticPoint,
    pub range: RangeCode,
    pub body: BodyModel,
    pub allow_clipped: bool,
    pub raster: RasterSource,
    pub output: Output,
}

impl Config {
    pub fn into_params(self) -> Result<Params> {
        let target = GeodeticPoint::new(self.target.latitude, self.target.longitude)?;
        let raster = match self.raster {
            Some(raster) => {
                let geometry = match (raster.geometry, raster.label) {
                    (Some(geometry), _) => GeometrySource::Explicit(geometry.into_geometry()?),
                    (None, Some(label)) => GeometrySource::Label(PathBuf::from(label)),
                    (None, None) => {
                        return Err(Error::InvalidArgument {
                            name: "raster",
                            value: format!("{} has neither a label nor a geometry", raster.image),
                        })
                    }
                };
                RasterSource {
                    image: PathBuf::from(raster.image),
                    geometry,
                    format: raster.format,
                }
            }
            None => {
                let tile = locate(target);
                info!("Target lies in tile {} ({})", tile.name, tile.prefix);
                let folder = DataFolder::new(&self.data_folder);
                let files = folder.tile_files(&tile, self.dataset);
                files.ensure_present()?;
                RasterSource {
                    image: files.image,
                    geometry: GeometrySource::Label(files.label),
                    format: self.dataset.sample_format(),
                }
            }
        };
        debug!("Raster source: {:?}", raster);

        Ok(Params {
            target,
            range: self.range,
            body: self.body,
            allow_clipped: self.allow_clipped,
            raster,
            output: self.output,
        })
    }
}

pub fn subcommand_def() -> App<'static, 'static> {
    SubCommand::with_name(super::SUBCOMMAND)
        .about("Extract and curvature-correct the terrain around a point")
        .setting(AppSettings::AllowLeadingHyphen)
        .arg(
            Arg::with_name("latitude")
                .short("l")
                .long("lat")
                .value_name("DEG")
                .help("Target latitude in degrees, north positive (-90 <= lat < 90)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("longitude")
                .short("g")
                .long("lon")
                .value_name("DEG")
                .help("Target east longitude in degrees (0 <= lon < 360)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("range")
                .short("r")
                .long("range")
                .value_name("CODE")
                .help("Window size: 0 = 6000 m, 1 = 3000 m, 2 = 600 m, 3 = 300 m (default: 0)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("data")
                .short("d")
                .long("data")
                .value_name("PATH")
                .help("Folder with downloaded archive tiles (./data assumed if none)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("dataset")
                .long("dataset")
                .value_name("NAME")
                .help("Archive product to read: dtm or ortho (default: dtm)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("image")
                .long("image")
                .value_name("FILE")
                .requires("label")
                .help("Read this raw raster instead of the archive tile")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("label")
                .long("label")
                .value_name("FILE")
                .requires("image")
                .help("Label file describing the raster given with --image")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("format")
                .long("format")
                .value_name("TYPE")
                .help("Sample type of the raster given with --image: i16, u16, f32 or f64 (default: i16)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("radius")
                .short("R")
                .long("radius")
                .value_name("RADIUS")
                .help("Body radius in km (default: 1737.4)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("allow-clipped")
                .long("allow-clipped")
                .help("Accept windows partly outside the tile")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .value_name("FILE")
                .help("File (or folder) to write the corrected window to as TSV")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("output-meta")
                .long("output-meta")
                .value_name("FILE")
                .help("File (or folder) to save the window grids to")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("Path to a config file with alternative defaults")
                .takes_value(true),
        )
}

pub fn parse_config(filename: &str) -> Result<Config> {
    let mut config_abs_path = env::current_dir()?;
    config_abs_path.push(filename);
    let mut contents = String::new();
    let _ = File::open(&config_abs_path)?.read_to_string(&mut contents)?;
    Ok(serde_yaml::from_str::<Config>(&contents)?)
}

pub(crate) fn parse_arg<T: FromStr>(
    matches: &ArgMatches<'_>,
    name: &'static str,
) -> Result<Option<T>> {
    matches
        .value_of(name)
        .map(|value| {
            value.parse().map_err(|_| Error::InvalidArgument {
                name,
                value: value.to_owned(),
            })
        })
        .transpose()
}

pub fn read_config(matches: &ArgMatches<'_>) -> Result<Config> {
    let mut config = if let Some(config_path) = matches.value_of("config") {
        parse_config(config_path)?
    } else {
        Default::default()
    };

    if let Some(data) = matches.value_of("data") {
        config.data_folder = data.to_owned();
    }
    if let Some(dataset) = parse_arg(matches, "dataset")? {
        config.dataset = dataset;
    }
    if let Some(lat) = parse_arg(matches, "latitude")? {
        config.target.latitude = lat;
    }
    if let Some(lon) = parse_arg(matches, "longitude")? {
        config.target.longitude = lon;
    }
    if let Some(code) = parse_arg::<u8>(matches, "range")? {
        if code > 3 {
            return Err(Error::InvalidArgument {
                name: "range",
                value: code.to_string(),
            });
        }
        config.range = RangeCode::from(code);
    }
    if let Some(radius) = parse_arg::<f64>(matches, "radius")? {
        if !(radius > 0.0) {
            return Err(Error::InvalidArgument {
                name: "radius",
                value: radius.to_string(),
            });
        }
        config.body = BodyModel::Spherical {
            radius: radius * 1e3,
        };
    }
    if matches.is_present("allow-clipped") {
        config.allow_clipped = true;
    }

    if let (Some(image), Some(label)) = (matches.value_of("image"), matches.value_of("label")) {
        config.raster = Some(ConfRaster {
            image: image.to_owned(),
            label: Some(label.to_owned()),
            geometry: None,
            format: parse_arg(matches, "format")?.unwrap_or_else(default_format),
        });
    }

    if let Some(output) = matches.value_of("output") {
        config.output.file = Some(output.to_owned());
    }
    if let Some(output_metadata) = matches.value_of("output-meta") {
        config.output.file_metadata = Some(output_metadata.to_owned());
    }

    Ok(config)
}
