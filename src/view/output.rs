use std::{
    fs::File,
    io::{BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use libflate::gzip::{Decoder, Encoder};
use serde_derive::{Deserialize, Serialize};
use tracing::info;

use crate::{
    area::{ExtractionWindow, RangeCode},
    utils::{GeodeticPoint, Grid},
    Result,
};

/// Everything the view pipeline produces for one target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewData {
    pub target: GeodeticPoint,
    pub range: RangeCode,
    pub window: ExtractionWindow<f64>,
    pub apparent: Grid<f64>,
}

/// Deterministic file name stem for a target and window size, e.g.
/// `LV_60_N2017410E03056620`.
pub fn output_stem(target: GeodeticPoint, range: RangeCode) -> String {
    let hemisphere = if target.latitude() < 0.0 { 'S' } else { 'N' };
    format!(
        "LV_{:02}_{}{:07}E{:08}",
        (range.footprint() / 100.0) as u32,
        hemisphere,
        (target.latitude().abs() * 1e5).round() as u64,
        (target.longitude() * 1e5).round() as u64
    )
}

/// Turns a configured output path into a file path; existing directories get
/// a generated file name.
pub fn resolve_path(path: &str, stem: &str, extension: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_dir() {
        path.join(format!("{}.{}", stem, extension))
    } else {
        path.to_owned()
    }
}

pub fn print_summary(data: &ViewData) {
    let (rows, cols) = data.window.shape();
    let (row_offset, col_offset) = data.window.offset();
    println!(
        "Target: {:.6}° {:.6}°, range {} ({} m)",
        data.target.latitude(),
        data.target.longitude(),
        data.range.code(),
        data.range.footprint()
    );
    println!(
        "Window: {} x {} samples at raster offset ({}, {})",
        rows, cols, row_offset, col_offset
    );
    if let (Some((min_lat, max_lat)), Some((min_lon, max_lon))) = (
        data.window.latitude().min_max(),
        data.window.longitude().min_max(),
    ) {
        println!("Latitude: {:.6}° .. {:.6}°", min_lat, max_lat);
        println!("Longitude: {:.6}° .. {:.6}°", min_lon, max_lon);
    }
    if let (Some((raw_min, raw_max)), Some((app_min, app_max))) =
        (data.window.elevation().min_max(), data.apparent.min_max())
    {
        println!("Raw elevation: {:.2} m .. {:.2} m", raw_min, raw_max);
        println!("Apparent elevation: {:.2} m .. {:.2} m", app_min, app_max);
    }
    println!("Max curvature drop: {:.3} m", max_drop(data));
    println!("Eye height: {} m", data.range.eye_height());
}

fn max_drop(data: &ViewData) -> f64 {
    data.window
        .elevation()
        .as_slice()
        .iter()
        .zip(data.apparent.as_slice())
        .map(|(raw, apparent)| raw - apparent)
        .fold(0.0, f64::max)
}

/// Writes one `latitude longitude elevation apparent` line per sample.
pub fn write_tsv<P: AsRef<Path>>(path: P, data: &ViewData) -> Result<()> {
    let path = path.as_ref();
    info!("Writing window samples to {:?}", path);
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "latitude\tlongitude\televation\tapparent")?;
    let (rows, cols) = data.window.shape();
    for i in 0..rows {
        let lat = data.window.latitude().row(i);
        let lon = data.window.longitude().row(i);
        let elev = data.window.elevation().row(i);
        let apparent = data.apparent.row(i);
        for j in 0..cols {
            writeln!(
                writer,
                "{:.8}\t{:.8}\t{}\t{:.4}",
                lat[j], lon[j], elev[j], apparent[j]
            )?;
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn write_metadata<P: AsRef<Path>>(path: P, data: &ViewData) -> Result<()> {
    let path = path.as_ref();
    info!("Writing window metadata to {:?}", path);
    let bytes = bincode::serialize(data)?;
    let mut gzip_encoder = Encoder::new(Vec::new())?;
    gzip_encoder.write_all(&bytes)?;
    let zipped_data = gzip_encoder.finish().into_result()?;

    let mut file = File::create(path)?;
    file.write_all(&zipped_data)?;
    Ok(())
}

pub fn read_metadata<P: AsRef<Path>>(path: P) -> Result<ViewData> {
    let mut decoder = Decoder::new(File::open(path)?)?;
    let mut bytes = Vec::new();
    decoder.read_to_end(&mut bytes)?;
    Ok(bincode::deserialize(&bytes)?)
}
