mod output;
pub mod params;

use std::{path::Path, time::Instant};

use clap::ArgMatches;
use tracing::info;

use crate::{
    area::{extract, extract_clipped},
    curvature::correct_with_radius,
    terrain::{RasterTile, Sample, SampleFormat, TileGeometry},
    Result,
};

pub use output::{output_stem, read_metadata, write_metadata, write_tsv, ViewData};
pub use params::subcommand_def;
use params::Params;

pub const SUBCOMMAND: &str = "view";

/// Loads the raster, cuts the window around the target and corrects it for curvature.
pub fn process<T: Sample>(
    image: &Path,
    geometry: TileGeometry,
    params: &Params,
) -> Result<ViewData> {
    let start = Instant::now();

    let tile = RasterTile::<T>::from_file(image, geometry)?;
    info!(
        "{:.3}s: Loaded {} x {} samples",
        start.elapsed().as_secs_f64(),
        geometry.lines,
        geometry.line_samples
    );

    let window = if params.allow_clipped {
        extract_clipped(&tile, params.target, params.range)?
    } else {
        extract(&tile, params.target, params.range)?
    };
    let (rows, cols) = window.shape();
    info!(
        "{:.3}s: Extracted a {} x {} window",
        start.elapsed().as_secs_f64(),
        rows,
        cols
    );

    let apparent = correct_with_radius(&window, params.target, params.body.radius())?;
    info!(
        "{:.3}s: Applied curvature correction",
        start.elapsed().as_secs_f64()
    );

    Ok(ViewData {
        target: params.target,
        range: params.range,
        window: window.to_f64(),
        apparent,
    })
}

pub fn run(matches: &ArgMatches<'_>) -> Result<()> {
    let params = params::read_config(matches)?.into_params()?;
    let geometry = params.raster.geometry.load()?;
    let image = params.raster.image.as_path();
    info!(
        "Reading {:?} as {:?} ({} bytes per sample)",
        image,
        params.raster.format,
        params.raster.format.sample_size()
    );

    let data = match params.raster.format {
        SampleFormat::I16Be => process::<i16>(image, geometry, &params)?,
        SampleFormat::U16Be => process::<u16>(image, geometry, &params)?,
        SampleFormat::F32Be => process::<f32>(image, geometry, &params)?,
        SampleFormat::F64Be => process::<f64>(image, geometry, &params)?,
    };

    output::print_summary(&data);

    let stem = output_stem(params.target, params.range);
    if let Some(ref file) = params.output.file {
        write_tsv(output::resolve_path(file, &stem, "tsv"), &data)?;
    }
    if let Some(ref file) = params.output.file_metadata {
        write_metadata(output::resolve_path(file, &stem, "bin.gz"), &data)?;
    }

    Ok(())
}
